//! Similarity between two tours.
//!
//! Both measures are ratios relative to the first tour, so
//! `similarity(a, a) == 1.0` for any non-empty `a`. [`common_edges_per_step`]
//! keeps the solvers' divisor for comparison with stored convexity series.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CheckError;
use crate::tour::cyclic_edges;

/// Available similarity measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMeasure {
    /// Share of undirected cyclic edges in common.
    CommonEdges,
    /// Share of selected nodes in common.
    CommonNodes,
}

impl SimilarityMeasure {
    /// Every measure, in display order.
    pub const ALL: [Self; 2] = [Self::CommonEdges, Self::CommonNodes];

    /// Apply the measure.
    #[must_use]
    pub fn measure(self, a: &[usize], b: &[usize]) -> f64 {
        match self {
            Self::CommonEdges => common_edges(a, b),
            Self::CommonNodes => common_nodes(a, b),
        }
    }

    /// Stable label used in directory names.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CommonEdges => "common_edges",
            Self::CommonNodes => "common_nodes",
        }
    }
}

impl fmt::Display for SimilarityMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SimilarityMeasure {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.label() == s)
            .ok_or_else(|| CheckError::invalid_input(format!("unknown similarity measure '{s}'")))
    }
}

fn undirected_edges(tour: &[usize]) -> HashSet<(usize, usize)> {
    cyclic_edges(tour)
        .map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
        .collect()
}

/// Fraction of `a`'s undirected cyclic edges that also appear in `b`.
///
/// Returns `0.0` when `a` has no edges.
#[must_use]
pub fn common_edges(a: &[usize], b: &[usize]) -> f64 {
    let edges_a = undirected_edges(a);
    if edges_a.is_empty() {
        return 0.0;
    }
    let edges_b = undirected_edges(b);
    let common = edges_a.intersection(&edges_b).count();
    common as f64 / edges_a.len() as f64
}

/// Common undirected edges divided by `a.len() - 1`.
///
/// This is the ratio the solvers store in convexity records. The divisor
/// counts one edge fewer than the closed tour has, so identical tours of `n`
/// nodes score `n / (n - 1)`. Returns `0.0` when `a` has fewer than two nodes.
#[must_use]
pub fn common_edges_per_step(a: &[usize], b: &[usize]) -> f64 {
    if a.len() < 2 {
        return 0.0;
    }
    let common = undirected_edges(a).intersection(&undirected_edges(b)).count();
    common as f64 / (a.len() - 1) as f64
}

/// Fraction of `a`'s nodes that also appear in `b`.
///
/// Returns `0.0` when `a` is empty.
#[must_use]
pub fn common_nodes(a: &[usize], b: &[usize]) -> f64 {
    let nodes_a: HashSet<usize> = a.iter().copied().collect();
    if nodes_a.is_empty() {
        return 0.0;
    }
    let nodes_b: HashSet<usize> = b.iter().copied().collect();
    let common = nodes_a.intersection(&nodes_b).count();
    common as f64 / nodes_a.len() as f64
}
