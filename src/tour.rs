//! Tour cost evaluation.
//!
//! A tour is an ordered slice of distinct node indices read as a cycle: the
//! last node connects back to the first. Tours shorter than two nodes have no
//! edges and cost `0.0`.

use std::collections::HashSet;

use crate::error::{CheckError, CheckResult};
use crate::nodes::{Node, NodeTable};

/// Check that every index is in range and no node repeats.
///
/// # Errors
///
/// Returns [`CheckError::InvalidTour`] for an out-of-range index or
/// [`CheckError::DuplicateNode`] for a repeated one.
pub fn check_tour(nodes: &NodeTable, tour: &[usize]) -> CheckResult<()> {
    check_indices(nodes, tour)?;
    let mut seen = HashSet::with_capacity(tour.len());
    for &index in tour {
        if !seen.insert(index) {
            return Err(CheckError::DuplicateNode { index });
        }
    }
    Ok(())
}

/// Check only that every index is in range.
///
/// # Errors
///
/// Returns [`CheckError::InvalidTour`] naming the first offending index.
pub fn check_indices(nodes: &NodeTable, tour: &[usize]) -> CheckResult<()> {
    let node_count = nodes.len();
    match tour.iter().find(|&&i| i >= node_count) {
        Some(&index) => Err(CheckError::InvalidTour { index, node_count }),
        None => Ok(()),
    }
}

/// Iterate the cyclic edges `(tour[i], tour[(i + 1) % len])`.
///
/// Yields nothing for tours shorter than two nodes.
pub fn cyclic_edges(tour: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    let len = if tour.len() < 2 { 0 } else { tour.len() };
    (0..len).map(move |i| (tour[i], tour[(i + 1) % len]))
}

fn edge_cost(a: &Node, b: &Node, include_node_cost: bool) -> f64 {
    let d = a.distance(b);
    if include_node_cost {
        d + a.cost + b.cost
    } else {
        d
    }
}

/// Per-edge costs of the tour, in tour order.
///
/// With `include_node_cost` each edge also carries the cost of both of its
/// endpoints.
///
/// # Errors
///
/// Returns [`CheckError::InvalidTour`] if an index is out of range.
pub fn edge_costs(nodes: &NodeTable, tour: &[usize], include_node_cost: bool) -> CheckResult<Vec<f64>> {
    check_indices(nodes, tour)?;
    let all = nodes.nodes();
    Ok(cyclic_edges(tour)
        .map(|(a, b)| edge_cost(&all[a], &all[b], include_node_cost))
        .collect())
}

/// Total cost of the tour: sum of its edge costs.
///
/// # Errors
///
/// Returns [`CheckError::InvalidTour`] if an index is out of range.
pub fn tour_cost(nodes: &NodeTable, tour: &[usize], include_node_cost: bool) -> CheckResult<f64> {
    Ok(edge_costs(nodes, tour, include_node_cost)?.iter().sum())
}

/// Objective value as the optimizer scores it.
///
/// Each cyclic edge contributes its Euclidean length rounded to the nearest
/// integer; each visited node contributes its cost once. A single-node tour
/// is just that node's cost.
///
/// # Errors
///
/// Returns [`CheckError::InvalidTour`] if an index is out of range.
pub fn objective(nodes: &NodeTable, tour: &[usize]) -> CheckResult<f64> {
    check_indices(nodes, tour)?;
    let all = nodes.nodes();
    let length: f64 = cyclic_edges(tour)
        .map(|(a, b)| all[a].distance(&all[b]).round())
        .sum();
    let visits: f64 = tour.iter().map(|&i| all[i].cost).sum();
    Ok(length + visits)
}

/// Node indices not present in the tour, ascending.
#[must_use]
pub fn absent_nodes(node_count: usize, tour: &[usize]) -> Vec<usize> {
    let present: HashSet<usize> = tour.iter().copied().collect();
    (0..node_count).filter(|i| !present.contains(i)).collect()
}
