//! CLI output formatting.
//!
//! This module contains all output formatting functions for the CLI.
//! Kept apart from the handlers so output can be exercised in tests.

use std::path::Path;

use crate::correlation::CorrelationRow;
use crate::report::{ReportPaths, SimilarityPaths};
use crate::validation::ValidationReport;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

fn mark(ok: bool) -> &'static str {
    if ok {
        "✓"
    } else {
        "✗"
    }
}

/// Costs of one tour as reported by `cost`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TourCosts {
    /// Fitness declared by the record.
    pub declared: f64,
    /// Sum of Euclidean edge lengths.
    pub length: f64,
    /// Edge lengths plus both endpoint costs per edge.
    pub with_node_cost: f64,
    /// Optimizer objective: rounded lengths plus visited node costs.
    pub objective: f64,
}

/// Print the artifacts of a logged run.
pub fn print_log_result(paths: &ReportPaths) {
    println!("{RULE}");
    println!("Run logged");
    println!("{RULE}");
    println!("  Record:     {}", paths.record.display());
    println!("  Best plot:  {}", paths.best_plot.display());
    println!("  Worst plot: {}", paths.worst_plot.display());
}

/// Print the artifacts of a logged global-convexity run.
pub fn print_convexity_result(paths: &SimilarityPaths) {
    println!("{RULE}");
    println!("Convexity run logged");
    println!("{RULE}");
    println!("  Record: {}", paths.record.display());
    println!("  Plot:   {}", paths.plot.display());
}

/// Print the batch validation table and where it was exported.
pub fn print_validation_report(report: &ValidationReport, csv: &Path, tex: &Path) {
    println!("{RULE}");
    println!("Fitness Cross-Validation");
    println!("{RULE}\n");

    for row in &report.rows {
        let authoritative = row
            .authoritative_fitness
            .map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));
        println!(
            "  {} {:<32} {:<12} declared {:>12.2}  authority {:>12}",
            mark(row.matched),
            row.method,
            row.instance,
            row.calculated_fitness,
            authoritative
        );
    }

    if !report.skipped.is_empty() {
        println!("\nSkipped:");
        for (path, reason) in &report.skipped {
            println!("  ! {}: {reason}", path.display());
        }
    }

    println!("\nMatched: {}/{}", report.matched_count(), report.rows.len());
    println!("Table:   {}", csv.display());
    println!("LaTeX:   {}", tex.display());

    let ok = report.all_matched();
    println!("\n{RULE}");
    println!("{} Result: {}", mark(ok), if ok { "CONSISTENT" } else { "MISMATCH" });
    println!("{RULE}\n");
}

/// Print the rows of a correlation sweep.
pub fn print_correlation_rows(rows: &[CorrelationRow]) {
    println!("{RULE}");
    println!("Fitness / Similarity Correlation");
    println!("{RULE}\n");

    if rows.is_empty() {
        println!("  No usable records found.");
    }
    for row in rows {
        let excluded = if row.excluded_best { " (best excluded)" } else { "" };
        println!(
            "  {:<6} {:<22} r = {:>7.4}  p = {:.4e}{excluded}",
            row.dataset, row.method, row.result.r, row.result.p_value
        );
    }
    println!();
}

/// Print recomputed costs of a record's best and worst tours.
pub fn print_costs(best: &TourCosts, worst: &TourCosts) {
    println!("{RULE}");
    println!("Tour Costs");
    println!("{RULE}\n");

    for (label, costs) in [("Best", best), ("Worst", worst)] {
        println!("{label}:");
        println!("  Declared:       {}", costs.declared);
        println!("  Length:         {:.2}", costs.length);
        println!("  With node cost: {:.2}", costs.with_node_cost);
        println!(
            "  {} Objective:    {}",
            mark(costs_agree(costs)),
            costs.objective
        );
    }
    println!();
}

/// Whether the recomputed objective equals the declared fitness.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn costs_agree(costs: &TourCosts) -> bool {
    costs.declared == costs.objective
}

/// Print similarity between two best tours.
pub fn print_similarity(edges: f64, nodes: f64) {
    println!("Common edges: {edges:.4}");
    println!("Common nodes: {nodes:.4}");
}
