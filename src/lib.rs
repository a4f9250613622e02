//! # tourcheck
//!
//! Tour-cost evaluation, solution validation and reporting for
//! node-selection TSP experiments.
//!
//! An optimizer run produces a JSON record with best/worst tours over a node
//! table. This crate:
//! - recomputes tour costs from the node table
//! - persists stamped records with PNG plots of both tours
//! - cross-checks declared fitness against an independent authority
//! - typesets records and validation tables as LaTeX
//! - measures tour similarity and correlates it with fitness
//!
//! ## Example
//!
//! ```rust
//! use tourcheck::prelude::*;
//!
//! let nodes = NodeTable::from_csv_str("0;0;1\n3;0;2\n3;4;3\n").unwrap();
//! let cost = tour_cost(&nodes, &[0, 1, 2], false).unwrap();
//! assert!((cost - 12.0).abs() < 1e-9);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,
    clippy::needless_range_loop,
)]

pub mod authority;
pub mod cli;
pub mod config;
pub mod correlation;
pub mod error;
pub mod nodes;
pub mod record;
pub mod render;
pub mod report;
pub mod similarity;
pub mod tour;
pub mod typeset;
pub mod validation;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::authority::{CommandAuthority, FitnessAuthority, ObjectiveAuthority};
    pub use crate::config::{Config, ConfigBuilder};
    pub use crate::correlation::{correlate, CorrelationResult};
    pub use crate::error::{CheckError, CheckResult};
    pub use crate::nodes::{Node, NodeTable};
    pub use crate::record::{ResultRecord, SimilarityRecord};
    pub use crate::report::{ReportPaths, ReportWriter};
    pub use crate::similarity::{common_edges, common_nodes, SimilarityMeasure};
    pub use crate::tour::{objective, tour_cost};
    pub use crate::validation::{validate, MatchRule, ValidationReport, ValidationResult};
}

/// Re-export for public API
pub use error::{CheckError, CheckResult};
