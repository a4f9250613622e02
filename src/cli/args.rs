//! CLI argument parsing.
//!
//! This module provides the argument parser for the tourcheck CLI.
//! Kept separate from the handlers so parsing can be tested on its own.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::similarity::SimilarityMeasure;

/// CLI arguments container.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "tourcheck", author, version, about)]
pub struct Args {
    /// YAML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Stamp a run's record and log it with plots of both tours
    Log {
        /// Node table (`x;y;cost` per line)
        data: PathBuf,
        /// Optimizer result document
        results: PathBuf,
        /// Method label
        method: String,
    },
    /// Log a global-convexity run with its similarity scatter plot
    LogConvexity {
        /// Node table the run used
        data: PathBuf,
        /// Result document carrying fitnesses and similarities
        results: PathBuf,
        /// Method label
        method: String,
        /// Similarity measure (`common_edges` or `common_nodes`)
        measure: SimilarityMeasure,
        /// What candidates were compared to, e.g. `best` or `average`
        target: String,
    },
    /// Typeset every record under a directory as LaTeX
    Latex {
        /// Directory to scan (default: logs root)
        root: Option<PathBuf>,
    },
    /// Cross-check declared best fitness against an authority
    Check {
        /// Directory to scan (default: logs root)
        root: Option<PathBuf>,
        /// External program computing authoritative fitness
        #[arg(long, value_name = "PROGRAM")]
        authority_cmd: Option<String>,
        /// Accept values within this absolute tolerance
        #[arg(long)]
        tolerance: Option<f64>,
    },
    /// Correlate fitness with similarity across convexity runs
    Correlate {
        /// Base directory (default: convexity base)
        base: Option<PathBuf>,
    },
    /// Recompute best/worst tour costs of a record
    Cost {
        /// Node table
        data: PathBuf,
        /// Result document
        results: PathBuf,
    },
    /// Compare the best tours of two records
    Similarity {
        /// First result document
        a: PathBuf,
        /// Second result document
        b: PathBuf,
        /// Divide common edges by tour length minus one, as the solvers do
        /// when they fill convexity records. Identical tours then score above 1.
        #[arg(long)]
        per_step: bool,
    },
}
