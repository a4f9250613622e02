//! Persisting run artifacts.
//!
//! A run folder holds the stamped record plus a plot per best/worst tour.
//! Global-convexity runs get a similarity record and a scatter plot instead.
//! Every write replaces what a previous run left behind.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::config::{PathsConfig, PlotConfig};
use crate::error::CheckResult;
use crate::nodes::NodeTable;
use crate::record::{ResultRecord, SimilarityRecord};
use crate::render;
use crate::similarity::SimilarityMeasure;
use crate::tour;

/// Plot of the best tour.
pub const BEST_PLOT: &str = "best_solution.png";
/// Plot of the worst tour.
pub const WORST_PLOT: &str = "worst_solution.png";
/// Scatter plot of a global-convexity run.
pub const SIMILARITY_PLOT: &str = "similarity_vs_fitness.png";

/// Files written for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    /// Plot of the best tour.
    pub best_plot: PathBuf,
    /// Plot of the worst tour.
    pub worst_plot: PathBuf,
    /// Persisted record.
    pub record: PathBuf,
}

/// Files written for one global-convexity run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarityPaths {
    /// Scatter plot.
    pub plot: PathBuf,
    /// Persisted record.
    pub record: PathBuf,
}

/// Writes run artifacts into destination folders.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    plot: PlotConfig,
    record_file: String,
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new(PlotConfig::default(), &PathsConfig::default())
    }
}

impl ReportWriter {
    /// Writer using the given plot options and file names.
    #[must_use]
    pub fn new(plot: PlotConfig, paths: &PathsConfig) -> Self {
        Self {
            plot,
            record_file: paths.record_file.clone(),
        }
    }

    /// Persist `record` and plot both of its tours into `destination`.
    ///
    /// Tours are checked against `nodes` before anything touches disk.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CheckError::InvalidTour`] for an out-of-range index,
    /// or an I/O, JSON or render error from writing the artifacts.
    pub fn write(
        &self,
        nodes: &NodeTable,
        record: &ResultRecord,
        destination: &Path,
    ) -> CheckResult<ReportPaths> {
        tour::check_indices(nodes, &record.best_solution)?;
        tour::check_indices(nodes, &record.worst_solution)?;

        std::fs::create_dir_all(destination)?;
        let paths = ReportPaths {
            best_plot: destination.join(BEST_PLOT),
            worst_plot: destination.join(WORST_PLOT),
            record: destination.join(&self.record_file),
        };

        record.save(&paths.record)?;
        render::render_tour(
            &paths.best_plot,
            nodes,
            &record.best_solution,
            &format!("Best solution: {}", record.best_fitness),
            &self.plot,
        )?;
        render::render_tour(
            &paths.worst_plot,
            nodes,
            &record.worst_solution,
            &format!("Worst solution: {}", record.worst_fitness),
            &self.plot,
        )?;

        info!(destination = %destination.display(), method = %record.method, "run logged");
        Ok(paths)
    }

    /// Persist a similarity record and its scatter plot into `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CheckError::InvalidInput`] for misaligned series, or
    /// an I/O, JSON or render error from writing the artifacts.
    pub fn write_similarity(
        &self,
        record: &SimilarityRecord,
        title: &str,
        destination: &Path,
    ) -> CheckResult<SimilarityPaths> {
        record.check_series()?;

        std::fs::create_dir_all(destination)?;
        let paths = SimilarityPaths {
            plot: destination.join(SIMILARITY_PLOT),
            record: destination.join(&self.record_file),
        };

        record.save(&paths.record)?;
        render::render_similarity(
            &paths.plot,
            &record.fitnesses,
            &record.similarities,
            title,
            &self.plot,
        )?;

        info!(destination = %destination.display(), method = %record.method, "convexity run logged");
        Ok(paths)
    }
}

/// Timestamp stamped into a regular run, `MMDD_HHMM`.
#[must_use]
pub fn run_stamp(now: &DateTime<Local>) -> String {
    now.format("%m%d_%H%M").to_string()
}

/// Timestamp stamped into a global-convexity run, `MMDD`.
#[must_use]
pub fn day_stamp(now: &DateTime<Local>) -> String {
    now.format("%m%d").to_string()
}

/// `<logs_root>/<method>_<stamp>`.
#[must_use]
pub fn run_folder(logs_root: &Path, method: &str, stamp: &str) -> PathBuf {
    logs_root.join(format!("{method}_{stamp}"))
}

/// `<logs_root>/<method>_<stamp>/<data stem>/<measure>_<target>`.
#[must_use]
pub fn convexity_folder(
    logs_root: &Path,
    method: &str,
    stamp: &str,
    data: &Path,
    measure: SimilarityMeasure,
    target: &str,
) -> PathBuf {
    let stem = data
        .file_stem()
        .map_or_else(|| "data".to_string(), |s| s.to_string_lossy().into_owned());
    run_folder(logs_root, method, stamp)
        .join(stem)
        .join(format!("{measure}_{target}"))
}

/// Scatter plot title, e.g. `LS: common_edges to best`.
#[must_use]
pub fn convexity_title(method: &str, measure: SimilarityMeasure, target: &str) -> String {
    format!("{}: {measure} to {target}", method.to_uppercase())
}
