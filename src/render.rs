//! PNG rendering of tours and similarity scatter plots.

use std::fmt::Display;
use std::ops::Range;
use std::path::Path;

use plotters::prelude::*;

use crate::config::PlotConfig;
use crate::error::{CheckError, CheckResult};
use crate::nodes::{min_max, NodeTable};
use crate::tour;

/// Anchor colors of the viridis scale at evenly spaced positions.
const VIRIDIS: [(u8, u8, u8); 9] = [
    (68, 1, 84),
    (72, 40, 120),
    (62, 73, 137),
    (49, 104, 142),
    (38, 130, 142),
    (31, 158, 137),
    (53, 183, 121),
    (110, 206, 88),
    (253, 231, 37),
];

const SCATTER_COLOR: RGBColor = RGBColor(219, 112, 147);

fn render_err<E: Display>(e: E) -> CheckError {
    CheckError::render(e.to_string())
}

/// Viridis color at `t`, clamped to `[0, 1]`.
#[must_use]
pub fn viridis(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - lower as f64;
    let (r0, g0, b0) = VIRIDIS[lower];
    let (r1, g1, b1) = VIRIDIS[lower + 1];
    let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * frac).round() as u8;
    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

/// Min-max normalize into `[0, 1]`. A constant series maps to all zeros.
#[must_use]
pub fn normalize(values: &[f64]) -> Vec<f64> {
    match min_max(values.iter().copied()) {
        Some((lo, hi)) if hi > lo => values.iter().map(|v| (v - lo) / (hi - lo)).collect(),
        _ => vec![0.0; values.len()],
    }
}

/// Marker radius for every node.
fn node_radii(nodes: &NodeTable, config: &PlotConfig) -> Vec<u32> {
    let lo = config.node_size_min.min(config.node_size_max);
    let hi = config.node_size_max.max(config.node_size_min);
    if !config.size_by_cost {
        return vec![lo; nodes.len()];
    }
    let costs: Vec<f64> = nodes.iter().map(|n| n.cost).collect();
    normalize(&costs)
        .into_iter()
        .map(|t| lo + (t * f64::from(hi - lo)).round() as u32)
        .collect()
}

/// Axis range covering `(lo, hi)` with a 5% margin.
fn padded(range: Option<(f64, f64)>) -> Range<f64> {
    let (lo, hi) = range.unwrap_or((0.0, 1.0));
    let span = hi - lo;
    let pad = if span > 0.0 { span * 0.05 } else { 1.0 };
    (lo - pad)..(hi + pad)
}

/// Render one tour over the full node table.
///
/// Tour nodes are drawn opaque and absent nodes at `absent_opacity`. Edges
/// are colored by their min-max normalized cost through [`viridis`].
///
/// # Errors
///
/// Returns [`CheckError::InvalidTour`] before drawing if an index is out of
/// range, or [`CheckError::Render`] if plotting fails.
pub fn render_tour(
    path: &Path,
    nodes: &NodeTable,
    tour: &[usize],
    title: &str,
    config: &PlotConfig,
) -> CheckResult<()> {
    let costs = tour::edge_costs(nodes, tour, config.edge_node_cost)?;
    let colors: Vec<RGBColor> = normalize(&costs).into_iter().map(viridis).collect();
    let radii = node_radii(nodes, config);
    let absent = tour::absent_nodes(nodes.len(), tour);
    let (x_range, y_range) = match nodes.bounds() {
        Some((xs, ys)) => (padded(Some(xs)), padded(Some(ys))),
        None => (padded(None), padded(None)),
    };

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if config.captions {
        builder
            .caption(title, ("sans-serif", 24))
            .x_label_area_size(40)
            .y_label_area_size(50);
    }
    let mut chart = builder
        .build_cartesian_2d(x_range, y_range)
        .map_err(render_err)?;
    if config.captions {
        chart
            .configure_mesh()
            .x_desc("x")
            .y_desc("y")
            .draw()
            .map_err(render_err)?;
    }

    let all = nodes.nodes();
    chart
        .draw_series(tour::cyclic_edges(tour).zip(colors).map(|((a, b), color)| {
            PathElement::new(
                vec![(all[a].x, all[a].y), (all[b].x, all[b].y)],
                color.stroke_width(config.stroke_width),
            )
        }))
        .map_err(render_err)?;

    chart
        .draw_series(absent.iter().map(|&i| {
            Circle::new(
                (all[i].x, all[i].y),
                radii[i],
                BLACK.mix(config.absent_opacity).filled(),
            )
        }))
        .map_err(render_err)?;
    chart
        .draw_series(
            tour.iter()
                .map(|&i| Circle::new((all[i].x, all[i].y), radii[i], BLACK.filled())),
        )
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Scatter plot of similarity (y) against fitness (x).
///
/// # Errors
///
/// Returns [`CheckError::InvalidInput`] for misaligned series or
/// [`CheckError::Render`] if plotting fails.
pub fn render_similarity(
    path: &Path,
    fitnesses: &[f64],
    similarities: &[f64],
    title: &str,
    config: &PlotConfig,
) -> CheckResult<()> {
    if fitnesses.len() != similarities.len() {
        return Err(CheckError::invalid_input(format!(
            "{} fitnesses but {} similarities",
            fitnesses.len(),
            similarities.len()
        )));
    }

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if config.captions {
        builder
            .caption(title, ("sans-serif", 24))
            .x_label_area_size(40)
            .y_label_area_size(60);
    }
    let mut chart = builder
        .build_cartesian_2d(
            padded(min_max(fitnesses.iter().copied())),
            padded(min_max(similarities.iter().copied())),
        )
        .map_err(render_err)?;
    if config.captions {
        chart
            .configure_mesh()
            .x_desc("Objective Function Value (Fitness)")
            .y_desc("Similarity")
            .draw()
            .map_err(render_err)?;
    }

    chart
        .draw_series(
            fitnesses
                .iter()
                .zip(similarities)
                .map(|(&f, &s)| Circle::new((f, s), 4, SCATTER_COLOR.mix(0.7).filled())),
        )
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::nodes::Node;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn quiet() -> PlotConfig {
        PlotConfig {
            width: 200,
            height: 160,
            captions: false,
            ..PlotConfig::default()
        }
    }

    fn table() -> NodeTable {
        NodeTable::new(vec![
            Node::new(0.0, 0.0, 5.0),
            Node::new(10.0, 0.0, 50.0),
            Node::new(10.0, 10.0, 500.0),
            Node::new(0.0, 10.0, 20.0),
            Node::new(5.0, 5.0, 1.0),
        ])
    }

    #[test]
    fn test_viridis_endpoints() {
        assert_eq!(viridis(0.0), RGBColor(68, 1, 84));
        assert_eq!(viridis(1.0), RGBColor(253, 231, 37));
        assert_eq!(viridis(0.5), RGBColor(38, 130, 142));
        assert_eq!(viridis(-3.0), viridis(0.0));
        assert_eq!(viridis(7.0), viridis(1.0));
        assert_eq!(viridis(f64::NAN), viridis(0.0));
    }

    #[test]
    fn test_viridis_interpolates() {
        let mid = viridis(0.0625);
        assert_eq!(mid, RGBColor(70, 21, 102));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(&[2.0, 4.0, 6.0]), vec![0.0, 0.5, 1.0]);
        assert_eq!(normalize(&[3.0, 3.0]), vec![0.0, 0.0]);
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_node_radii() {
        let config = quiet();
        let radii = node_radii(&table(), &config);
        assert_eq!(radii[4], config.node_size_min);
        assert_eq!(radii[2], config.node_size_max);

        let flat = PlotConfig {
            size_by_cost: false,
            ..quiet()
        };
        assert!(node_radii(&table(), &flat).iter().all(|&r| r == flat.node_size_min));
    }

    #[test]
    fn test_padded() {
        assert_eq!(padded(Some((0.0, 100.0))), -5.0..105.0);
        assert_eq!(padded(Some((2.0, 2.0))), 1.0..3.0);
        let fallback = padded(None);
        assert!(fallback.start < 0.0 && fallback.end > 1.0);
    }

    #[test]
    fn test_render_tour_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_solution.png");
        render_tour(&path, &table(), &[0, 1, 2, 3], "best", &quiet()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], &PNG_MAGIC);
    }

    #[test]
    fn test_render_tour_rejects_bad_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        let result = render_tour(&path, &table(), &[0, 9], "bad", &quiet());
        assert!(matches!(result, Err(CheckError::InvalidTour { index: 9, .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_render_similarity_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("similarity_vs_fitness.png");
        render_similarity(&path, &[100.0, 120.0, 90.0], &[0.4, 0.3, 0.5], "LS", &quiet()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], &PNG_MAGIC);
    }

    #[test]
    fn test_render_similarity_misaligned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.png");
        let result = render_similarity(&path, &[1.0], &[0.1, 0.2], "x", &quiet());
        assert!(matches!(result, Err(CheckError::InvalidInput(_))));
    }
}
