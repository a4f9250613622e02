//! CLI command handlers.
//!
//! This module contains the execution logic for each CLI command. Handlers
//! return `Ok(true)` on a clean outcome, `Ok(false)` when the command ran but
//! found problems, and `Err` when it could not run at all.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use tracing::{error, info};

use super::output::{
    print_convexity_result, print_correlation_rows, print_costs, print_log_result,
    print_similarity, print_validation_report, TourCosts,
};
use super::{Args, Command};
use crate::authority::{CommandAuthority, FitnessAuthority, ObjectiveAuthority};
use crate::config::Config;
use crate::correlation::correlate_tree;
use crate::error::{CheckError, CheckResult};
use crate::nodes::NodeTable;
use crate::record::{ResultRecord, SimilarityRecord};
use crate::report::{self, ReportWriter};
use crate::similarity::{common_edges, common_edges_per_step, common_nodes, SimilarityMeasure};
use crate::tour;
use crate::typeset::typeset_tree;
use crate::validation::{validate_tree, MatchRule};

/// Main CLI entry point.
///
/// Loads the configuration and dispatches to the command handler.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match execute(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Load the configuration named by `args` and run its command.
///
/// # Errors
///
/// Returns the first error that prevents the command from completing.
pub fn execute(args: &Args) -> CheckResult<bool> {
    let config = Config::load_or_default(args.config.as_deref())?;

    match &args.command {
        Command::Log {
            data,
            results,
            method,
        } => log_run(&config, data, results, method),
        Command::LogConvexity {
            data,
            results,
            method,
            measure,
            target,
        } => log_convexity(&config, data, results, method, *measure, target),
        Command::Latex { root } => latex(&config, root.as_deref()),
        Command::Check {
            root,
            authority_cmd,
            tolerance,
        } => check(&config, root.as_deref(), authority_cmd.as_deref(), *tolerance),
        Command::Correlate { base } => correlate(&config, base.as_deref()),
        Command::Cost { data, results } => cost(data, results),
        Command::Similarity { a, b, per_step } => similarity(a, b, *per_step),
    }
}

/// Stamp a record and log it with plots of both tours.
///
/// # Errors
///
/// Returns an error if the inputs cannot be loaded or the run cannot be
/// written.
pub fn log_run(config: &Config, data: &Path, results: &Path, method: &str) -> CheckResult<bool> {
    let nodes = NodeTable::load(data)?;
    let stamp = report::run_stamp(&Local::now());
    let record = ResultRecord::load(results)?.stamped(method, stamp.as_str());

    let destination = report::run_folder(&config.paths.logs_root, method, &stamp);
    let writer = ReportWriter::new(config.plot.clone(), &config.paths);
    let paths = writer.write(&nodes, &record, &destination)?;

    print_log_result(&paths);
    Ok(true)
}

/// Log a global-convexity run.
///
/// # Errors
///
/// Returns an error if the record cannot be loaded, its series are unusable
/// or the run cannot be written.
pub fn log_convexity(
    config: &Config,
    data: &Path,
    results: &Path,
    method: &str,
    measure: SimilarityMeasure,
    target: &str,
) -> CheckResult<bool> {
    let stamp = report::day_stamp(&Local::now());
    let mut record = SimilarityRecord::load(results)?;
    record.method = method.to_string();
    record.timestamp = stamp.clone();

    let destination =
        report::convexity_folder(&config.paths.logs_root, method, &stamp, data, measure, target);
    let title = report::convexity_title(method, measure, target);
    let writer = ReportWriter::new(config.plot.clone(), &config.paths);
    let paths = writer.write_similarity(&record, &title, &destination)?;

    print_convexity_result(&paths);
    Ok(true)
}

/// Typeset every record under `root`.
///
/// # Errors
///
/// Returns [`CheckError::InvalidInput`] if `root` is not a directory.
pub fn latex(config: &Config, root: Option<&Path>) -> CheckResult<bool> {
    let root = existing_dir(root.unwrap_or(&config.paths.logs_root))?;
    let written = typeset_tree(&root, &config.paths.record_file, &config.paths.typeset_file);
    info!(root = %root.display(), count = written.len(), "typesetting finished");
    println!("Generated {} LaTeX file(s) under {}", written.len(), root.display());
    Ok(true)
}

/// Cross-check every record under `root` and export the table there.
///
/// The command-line program and tolerance override the configured ones.
///
/// # Errors
///
/// Returns an error if the authority cannot be set up, the tolerance is
/// invalid or the table cannot be exported.
pub fn check(
    config: &Config,
    root: Option<&Path>,
    authority_cmd: Option<&str>,
    tolerance: Option<f64>,
) -> CheckResult<bool> {
    let root = existing_dir(root.unwrap_or(&config.paths.logs_root))?;

    let rule = match tolerance {
        Some(tol) if !tol.is_finite() || tol < 0.0 => {
            return Err(CheckError::invalid_input(format!(
                "tolerance must be a non-negative number, got {tol}"
            )));
        }
        Some(tol) => MatchRule::Tolerance(tol),
        None => config.validation.match_rule(),
    };

    let mut authority: Box<dyn FitnessAuthority> =
        match authority_cmd.or(config.authority.command.as_deref()) {
            Some(program) => Box::new(CommandAuthority::new(program, config.authority.clone())),
            None => Box::new(ObjectiveAuthority::from_config(&config.authority)?),
        };
    info!(authority = authority.name(), ?rule, "validating records");

    let report = validate_tree(&root, &config.paths.record_file, authority.as_mut(), rule);
    let (csv, tex) = report.export(&root, &config.paths.report_stem)?;

    print_validation_report(&report, &csv, &tex);
    Ok(report.all_matched())
}

/// Correlate fitness with similarity across the configured sweep.
///
/// # Errors
///
/// Returns [`CheckError::InvalidInput`] if `base` is not a directory.
pub fn correlate(config: &Config, base: Option<&Path>) -> CheckResult<bool> {
    let base = existing_dir(base.unwrap_or(&config.paths.convexity_base))?;
    let rows = correlate_tree(&base, &config.paths.record_file, &config.correlation);
    print_correlation_rows(&rows);
    Ok(true)
}

/// Recompute the costs of a record's best and worst tours.
///
/// # Errors
///
/// Returns an error if the inputs cannot be loaded or a tour indexes outside
/// the node table.
pub fn cost(data: &Path, results: &Path) -> CheckResult<bool> {
    let nodes = NodeTable::load(data)?;
    let record = ResultRecord::load(results)?;

    let best = tour_costs(&nodes, &record.best_solution, record.best_fitness)?;
    let worst = tour_costs(&nodes, &record.worst_solution, record.worst_fitness)?;

    print_costs(&best, &worst);
    Ok(true)
}

/// Costs of one tour against its declared fitness.
///
/// # Errors
///
/// Returns [`CheckError::InvalidTour`] for an out-of-range index.
pub fn tour_costs(nodes: &NodeTable, tour_nodes: &[usize], declared: f64) -> CheckResult<TourCosts> {
    Ok(TourCosts {
        declared,
        length: tour::tour_cost(nodes, tour_nodes, false)?,
        with_node_cost: tour::tour_cost(nodes, tour_nodes, true)?,
        objective: tour::objective(nodes, tour_nodes)?,
    })
}

/// Compare the best tours of two records.
///
/// With `per_step` the edge ratio uses the solvers' `len - 1` divisor.
///
/// # Errors
///
/// Returns an error if either record cannot be loaded.
pub fn similarity(a: &Path, b: &Path, per_step: bool) -> CheckResult<bool> {
    let a = ResultRecord::load(a)?;
    let b = ResultRecord::load(b)?;
    let (edges, nodes) = best_tour_similarity(&a, &b, per_step);
    print_similarity(edges, nodes);
    Ok(true)
}

/// Common-edges and common-nodes ratios between two records' best tours.
#[must_use]
pub fn best_tour_similarity(a: &ResultRecord, b: &ResultRecord, per_step: bool) -> (f64, f64) {
    let edges = if per_step {
        common_edges_per_step(&a.best_solution, &b.best_solution)
    } else {
        common_edges(&a.best_solution, &b.best_solution)
    };
    (edges, common_nodes(&a.best_solution, &b.best_solution))
}

fn existing_dir(path: &Path) -> CheckResult<PathBuf> {
    if path.is_dir() {
        Ok(path.to_path_buf())
    } else {
        Err(CheckError::invalid_input(format!(
            "'{}' is not a directory",
            path.display()
        )))
    }
}
