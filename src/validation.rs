//! Cross-validation of declared fitness against an authority.
//!
//! The declared best fitness of a record is compared with what an
//! independent [`FitnessAuthority`] reports for the same tour. Exact equality
//! is the default contract; [`MatchRule::Tolerance`] is opt-in for values
//! that come from differently rounded computations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::authority::FitnessAuthority;
use crate::error::CheckResult;
use crate::record::{write_document, ResultRecord};
use crate::typeset;

/// How declared and authoritative fitness are compared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MatchRule {
    /// Bit-for-bit equal values.
    Exact,
    /// `|declared - authoritative| <= tolerance`.
    Tolerance(f64),
}

impl Default for MatchRule {
    fn default() -> Self {
        Self::Exact
    }
}

impl MatchRule {
    /// Whether `declared` matches `authoritative` under this rule.
    #[must_use]
    pub fn matches(self, declared: f64, authoritative: f64) -> bool {
        match self {
            #[allow(clippy::float_cmp)]
            Self::Exact => declared == authoritative,
            Self::Tolerance(tol) => (declared - authoritative).abs() <= tol,
        }
    }
}

/// Outcome of validating one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Method label (display form).
    pub method: String,
    /// Instance name.
    pub instance: String,
    /// Fitness declared by the record.
    pub calculated_fitness: f64,
    /// Fitness reported by the authority, if any.
    pub authoritative_fitness: Option<f64>,
    /// Whether the two agree.
    #[serde(rename = "match")]
    pub matched: bool,
}

/// Validate a record's best tour against `authority`.
///
/// An authority with no value yields `matched = false` and a warning, not an
/// error.
///
/// # Errors
///
/// Returns an error only if the authority itself fails.
pub fn validate(
    record: &ResultRecord,
    instance: &str,
    authority: &mut dyn FitnessAuthority,
    rule: MatchRule,
) -> CheckResult<ValidationResult> {
    let authoritative = authority.authoritative_fitness(instance, &record.best_solution)?;

    let matched = match authoritative {
        Some(value) => rule.matches(record.best_fitness, value),
        None => {
            warn!(
                authority = authority.name(),
                method = %record.method,
                instance,
                "authority returned no fitness"
            );
            false
        }
    };

    Ok(ValidationResult {
        method: display_method(&record.method),
        instance: instance.to_string(),
        calculated_fitness: record.best_fitness,
        authoritative_fitness: authoritative,
        matched,
    })
}

/// Title-case a method label: `large_LS` becomes `Large Ls`.
///
/// Underscores become spaces; a letter is upper-cased when it follows a
/// non-letter and lower-cased otherwise.
#[must_use]
pub fn display_method(method: &str) -> String {
    if method.is_empty() {
        return "Unknown".to_string();
    }
    let mut out = String::with_capacity(method.len());
    let mut prev_alpha = false;
    for c in method.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(if c == '_' { ' ' } else { c });
            prev_alpha = false;
        }
    }
    out
}

/// Validation results collected across a directory tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// One row per validated record.
    pub rows: Vec<ValidationResult>,
    /// Records that could not be validated, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

impl ValidationReport {
    /// Number of matching rows.
    #[must_use]
    pub fn matched_count(&self) -> usize {
        self.rows.iter().filter(|r| r.matched).count()
    }

    /// Whether every row matched and nothing was skipped.
    #[must_use]
    pub fn all_matched(&self) -> bool {
        self.skipped.is_empty() && self.rows.iter().all(|r| r.matched)
    }

    /// Write the rows as CSV.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> CheckResult<()> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record([
            "method",
            "instance",
            "calculated fitness",
            "authoritative fitness",
            "match",
        ])?;
        for row in &self.rows {
            wtr.write_record([
                row.method.clone(),
                row.instance.clone(),
                row.calculated_fitness.to_string(),
                row.authoritative_fitness.map_or_else(String::new, |v| v.to_string()),
                row.matched.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the rows as a LaTeX tabular.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_latex<P: AsRef<Path>>(&self, path: P) -> CheckResult<()> {
        write_document(path.as_ref(), &typeset::validation_table(&self.rows))
    }

    /// Write `<stem>.csv` and `<stem>.tex` under `dir`; returns both paths.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be written.
    pub fn export(&self, dir: &Path, stem: &str) -> CheckResult<(PathBuf, PathBuf)> {
        let csv_path = dir.join(format!("{stem}.csv"));
        let tex_path = dir.join(format!("{stem}.tex"));
        self.write_csv(&csv_path)?;
        self.write_latex(&tex_path)?;
        Ok((csv_path, tex_path))
    }
}

/// Every file named `file_name` under `root`, in sorted traversal order.
///
/// Unreadable directory entries are logged and skipped.
#[must_use]
pub fn find_records(root: &Path, file_name: &str) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && e.file_name() == file_name)
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Validate every record under `root`.
///
/// The instance name is the record's parent directory name. Records that
/// fail to load or validate are logged and listed in
/// [`ValidationReport::skipped`]; they never abort the sweep.
#[must_use]
pub fn validate_tree(
    root: &Path,
    record_file: &str,
    authority: &mut dyn FitnessAuthority,
    rule: MatchRule,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    for path in find_records(root, record_file) {
        let instance = path
            .parent()
            .and_then(Path::file_name)
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());

        match validate_file(&path, &instance, authority, rule) {
            Ok(row) => {
                info!(
                    path = %path.display(),
                    matched = row.matched,
                    "validated record"
                );
                report.rows.push(row);
            }
            Err(e) => {
                if e.is_data_error() {
                    warn!(path = %path.display(), error = %e, "skipping malformed record");
                } else {
                    error!(path = %path.display(), error = %e, "skipping record");
                }
                report.skipped.push((path, e.to_string()));
            }
        }
    }

    report
}

fn validate_file(
    path: &Path,
    instance: &str,
    authority: &mut dyn FitnessAuthority,
    rule: MatchRule,
) -> CheckResult<ValidationResult> {
    let record = ResultRecord::load(path)?;
    validate(&record, instance, authority, rule)
}
