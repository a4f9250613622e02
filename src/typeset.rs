//! LaTeX output: a fragment per record and the validation table.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::authority::join_tour;
use crate::error::CheckResult;
use crate::record::{write_document, ResultRecord};
use crate::validation::{display_method, find_records, ValidationResult};

/// Escape characters LaTeX treats specially in running text.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '\\' => out.push_str("\\textbackslash{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Fragment summarizing one record.
///
/// Tours go into `lstlisting` blocks, comma-joined. The execution time line
/// appears only when the record carries timings (mean seconds per run).
#[must_use]
pub fn record_fragment(record: &ResultRecord) -> String {
    let method = escape(&display_method(&record.method));
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out);
    let _ = writeln!(out, "\\subsubsection{{Results for {method}}}");
    let _ = writeln!(out, "\\textbf{{Best Fitness: {}}}", record.best_fitness);
    let _ = writeln!(out);
    let _ = writeln!(out, "\\begin{{lstlisting}}");
    let _ = writeln!(out, "{}", join_tour(&record.best_solution, ", "));
    let _ = writeln!(out, "\\end{{lstlisting}}");
    let _ = writeln!(out);
    let _ = writeln!(out, "\\textbf{{Worst Fitness: {}}}", record.worst_fitness);
    let _ = writeln!(out);
    let _ = writeln!(out, "\\begin{{lstlisting}}");
    let _ = writeln!(out, "{}", join_tour(&record.worst_solution, ", "));
    let _ = writeln!(out, "\\end{{lstlisting}}");
    let _ = writeln!(out);

    match record.mean_execution_time() {
        Some(seconds) => {
            let _ = writeln!(out, "\\textbf{{Average Fitness: {}}} \\\\", record.average_fitness);
            let _ = writeln!(out, "\\textbf{{Execution Time: {seconds:.6} seconds}}");
        }
        None => {
            let _ = writeln!(out, "\\textbf{{Average Fitness: {}}}", record.average_fitness);
        }
    }

    out
}

/// Tabular of validation rows, column format `|l|l|r|r|c|`.
#[must_use]
pub fn validation_table(rows: &[ValidationResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\\begin{{tabular}}{{|l|l|r|r|c|}}");
    let _ = writeln!(out, "\\hline");
    let _ = writeln!(
        out,
        "method & instance & calculated fitness & authoritative fitness & match \\\\"
    );
    let _ = writeln!(out, "\\hline");
    for row in rows {
        let authoritative = row
            .authoritative_fitness
            .map_or_else(|| "--".to_string(), |v| format!("{v:.2}"));
        let _ = writeln!(
            out,
            "{} & {} & {:.2} & {} & {} \\\\",
            escape(&row.method),
            escape(&row.instance),
            row.calculated_fitness,
            authoritative,
            if row.matched { "True" } else { "False" }
        );
    }
    let _ = writeln!(out, "\\hline");
    let _ = writeln!(out, "\\end{{tabular}}");
    out
}

/// Write the fragment for `record_path` to `tex_path`.
///
/// # Errors
///
/// Returns an error if the record cannot be loaded or the fragment written.
pub fn typeset_record(record_path: &Path, tex_path: &Path) -> CheckResult<()> {
    let record = ResultRecord::load(record_path)?;
    write_document(tex_path, &record_fragment(&record))
}

/// Typeset every record under `root`, writing `typeset_file` beside each.
///
/// Returns the fragments written; failures are logged and skipped.
#[must_use]
pub fn typeset_tree(root: &Path, record_file: &str, typeset_file: &str) -> Vec<PathBuf> {
    let mut written = Vec::new();
    for record_path in find_records(root, record_file) {
        let tex_path = record_path.with_file_name(typeset_file);
        match typeset_record(&record_path, &tex_path) {
            Ok(()) => {
                info!(path = %tex_path.display(), "generated LaTeX file");
                written.push(tex_path);
            }
            Err(e) => error!(path = %record_path.display(), error = %e, "error processing file"),
        }
    }
    written
}
