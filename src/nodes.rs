//! Node table loading.
//!
//! Instances are plain delimited text, one node per line:
//!
//! ```text
//! 1510;353;84
//! 3042;1500;1432
//! ```
//!
//! Fields are `x;y;cost`, no header. A node is identified by its 0-based
//! line position.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CheckError, CheckResult};

/// A single node of the instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Cost of visiting the node.
    pub cost: f64,
}

impl Node {
    /// Create a new node.
    #[must_use]
    pub const fn new(x: f64, y: f64, cost: f64) -> Self {
        Self { x, y, cost }
    }

    /// Euclidean distance to another node.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Ordered, immutable table of nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeTable {
    nodes: Vec<Node>,
}

impl NodeTable {
    /// Build a table from nodes in index order.
    #[must_use]
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Load a `x;y;cost` table from a file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened, or
    /// [`CheckError::NodeTable`] for malformed lines.
    pub fn load<P: AsRef<Path>>(path: P) -> CheckResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse a `x;y;cost` table from a string.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::NodeTable`] for malformed lines.
    pub fn from_csv_str(data: &str) -> CheckResult<Self> {
        Self::from_reader(data.as_bytes())
    }

    /// Parse a `x;y;cost` table from any reader.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::NodeTable`] for malformed lines or non-finite
    /// values, and [`CheckError::Csv`] if the reader itself fails.
    pub fn from_reader<R: Read>(reader: R) -> CheckResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b';')
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut nodes = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            let line = record.position().map_or(i + 1, |p| p.line() as usize);

            if record.len() != 3 {
                return Err(CheckError::NodeTable {
                    line,
                    message: format!("expected 3 fields (x;y;cost), got {}", record.len()),
                });
            }

            let field = |idx: usize, name: &str| -> CheckResult<f64> {
                let raw = &record[idx];
                let value = raw.parse::<f64>().map_err(|e| CheckError::NodeTable {
                    line,
                    message: format!("{name} '{raw}' is not a number: {e}"),
                })?;
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(CheckError::NodeTable {
                        line,
                        message: format!("{name} '{raw}' is not finite"),
                    })
                }
            };

            nodes.push(Node::new(field(0, "x")?, field(1, "y")?, field(2, "cost")?));
        }

        Ok(Self { nodes })
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// All nodes in index order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Iterate nodes in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    /// Inclusive `(min, max)` of node costs, `None` for an empty table.
    #[must_use]
    pub fn cost_range(&self) -> Option<(f64, f64)> {
        min_max(self.nodes.iter().map(|n| n.cost))
    }

    /// Bounding box `((min_x, max_x), (min_y, max_y))`, `None` when empty.
    #[must_use]
    pub fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let xs = min_max(self.nodes.iter().map(|n| n.x))?;
        let ys = min_max(self.nodes.iter().map(|n| n.y))?;
        Some((xs, ys))
    }
}

impl<'a> IntoIterator for &'a NodeTable {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Inclusive min/max of a sequence, `None` when empty.
pub(crate) fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
