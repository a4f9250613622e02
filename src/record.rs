//! Result documents produced by optimizer runs.
//!
//! The optimizer writes a JSON document per run. Raw output carries only the
//! fitness summary and the best/worst tours; the logging step stamps `method`
//! and `timestamp` and re-saves it. Field declaration order is the on-disk
//! order, with the tours (and candidate series) last.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CheckError, CheckResult};

/// Outcome of one optimizer run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Method label, e.g. `LS_candidates`.
    #[serde(default)]
    pub method: String,
    /// Run timestamp as stamped by the logger.
    #[serde(default)]
    pub timestamp: String,
    /// Lowest fitness among the runs.
    pub best_fitness: f64,
    /// Highest fitness among the runs.
    pub worst_fitness: f64,
    /// Mean fitness over the runs.
    pub average_fitness: f64,
    /// Per-run wall-clock seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<Vec<f64>>,
    /// Tour achieving `best_fitness`.
    pub best_solution: Vec<usize>,
    /// Tour achieving `worst_fitness`.
    pub worst_solution: Vec<usize>,
    /// Per-candidate fitness values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitnesses: Option<Vec<f64>>,
    /// Per-candidate similarity values, aligned with `fitnesses`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarities: Option<Vec<f64>>,
}

impl ResultRecord {
    /// Parse a record from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Json`] if the document is malformed.
    pub fn from_json(json: &str) -> CheckResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a record from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or
    /// [`CheckError::Json`] if it is malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> CheckResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize to 4-space indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Json`] if serialization fails.
    pub fn to_json(&self) -> CheckResult<String> {
        to_pretty_json(self)
    }

    /// Write the record, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> CheckResult<()> {
        write_document(path.as_ref(), &self.to_json()?)
    }

    /// Stamp the run's method label and timestamp.
    #[must_use]
    pub fn stamped(mut self, method: impl Into<String>, timestamp: impl Into<String>) -> Self {
        self.method = method.into();
        self.timestamp = timestamp.into();
        self
    }

    /// Mean execution time in seconds, if recorded.
    #[must_use]
    pub fn mean_execution_time(&self) -> Option<f64> {
        let times = self.execution_time.as_ref()?;
        if times.is_empty() {
            return None;
        }
        Some(times.iter().sum::<f64>() / times.len() as f64)
    }
}

/// Candidate series from a global-convexity run.
///
/// Only the two series are required, so full [`ResultRecord`] documents that
/// carry them load as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityRecord {
    /// Method label.
    #[serde(default)]
    pub method: String,
    /// Run timestamp.
    #[serde(default)]
    pub timestamp: String,
    /// Per-candidate fitness values.
    pub fitnesses: Vec<f64>,
    /// Per-candidate similarity values.
    pub similarities: Vec<f64>,
}

impl SimilarityRecord {
    /// Parse from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Json`] if the document is malformed.
    pub fn from_json(json: &str) -> CheckResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> CheckResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize to 4-space indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Json`] if serialization fails.
    pub fn to_json(&self) -> CheckResult<String> {
        to_pretty_json(self)
    }

    /// Write the record, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> CheckResult<()> {
        write_document(path.as_ref(), &self.to_json()?)
    }

    /// Check that both series are non-empty and aligned.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::InvalidInput`] describing the problem.
    pub fn check_series(&self) -> CheckResult<()> {
        if self.fitnesses.is_empty() || self.similarities.is_empty() {
            return Err(CheckError::invalid_input("fitnesses and similarities must be non-empty"));
        }
        if self.fitnesses.len() != self.similarities.len() {
            return Err(CheckError::invalid_input(format!(
                "{} fitnesses but {} similarities",
                self.fitnesses.len(),
                self.similarities.len()
            )));
        }
        Ok(())
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> CheckResult<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| CheckError::invalid_input(e.to_string()))
}

/// Write a whole document, truncating whatever was there.
pub(crate) fn write_document(path: &Path, contents: &str) -> CheckResult<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const RAW_OUTPUT: &str = r#"{
        "best_solution": [3, 1, 4],
        "best_fitness": 70123,
        "worst_solution": [4, 1, 3, 0],
        "worst_fitness": 76500,
        "average_fitness": 73001.5,
        "execution_time": [0.5, 1.5]
    }"#;

    fn sample() -> ResultRecord {
        ResultRecord::from_json(RAW_OUTPUT).unwrap()
    }

    #[test]
    fn test_parse_raw_optimizer_output() {
        let record = sample();
        assert_eq!(record.method, "");
        assert_eq!(record.timestamp, "");
        assert_eq!(record.best_solution, vec![3, 1, 4]);
        assert!((record.best_fitness - 70123.0).abs() < f64::EPSILON);
        assert!(record.fitnesses.is_none());
    }

    #[test]
    fn test_stamped() {
        let record = sample().stamped("greedy_cycle", "1018_1430");
        assert_eq!(record.method, "greedy_cycle");
        assert_eq!(record.timestamp, "1018_1430");
    }

    #[test]
    fn test_tours_written_last() {
        let json = sample().stamped("m", "t").to_json().unwrap();
        let best = json.find("\"best_solution\"").unwrap();
        let worst = json.find("\"worst_solution\"").unwrap();
        for key in ["method", "timestamp", "best_fitness", "worst_fitness", "average_fitness"] {
            let pos = json.find(&format!("\"{key}\"")).unwrap();
            assert!(pos < best, "{key} should precede best_solution");
        }
        assert!(best < worst);
    }

    #[test]
    fn test_four_space_indent() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\n    \"method\""));
    }

    #[test]
    fn test_optional_series_omitted() {
        let json = sample().to_json().unwrap();
        assert!(!json.contains("fitnesses"));
        assert!(!json.contains("similarities"));
    }

    #[test]
    fn test_save_and_reload_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let mut record = sample().stamped("LS_delta", "0101_0000");
        record.fitnesses = Some(vec![1.0, 2.5]);
        record.similarities = Some(vec![0.1, 0.2]);

        record.save(&path).unwrap();
        let reloaded = ResultRecord::load(&path).unwrap();
        assert_eq!(reloaded, record);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        sample().stamped("first", "t").save(&path).unwrap();
        sample().stamped("second", "t").save(&path).unwrap();
        assert_eq!(ResultRecord::load(&path).unwrap().method, "second");
    }

    #[test]
    fn test_mean_execution_time() {
        assert_eq!(sample().mean_execution_time(), Some(1.0));
        let mut record = sample();
        record.execution_time = Some(vec![]);
        assert_eq!(record.mean_execution_time(), None);
        record.execution_time = None;
        assert_eq!(record.mean_execution_time(), None);
    }

    #[test]
    fn test_missing_required_field() {
        let result = ResultRecord::from_json(r#"{"best_fitness": 1.0}"#);
        assert!(matches!(result, Err(CheckError::Json(_))));
    }

    #[test]
    fn test_similarity_record_from_full_record() {
        let json = r#"{
            "method": "global_convexity",
            "best_fitness": 1, "worst_fitness": 2, "average_fitness": 1.5,
            "best_solution": [0], "worst_solution": [1],
            "fitnesses": [5, 1, 3],
            "similarities": [0.2, 0.9, 0.5]
        }"#;
        let record = SimilarityRecord::from_json(json).unwrap();
        assert_eq!(record.fitnesses, vec![5.0, 1.0, 3.0]);
        assert!(record.check_series().is_ok());
    }

    #[test]
    fn test_similarity_record_series_checks() {
        let mut record = SimilarityRecord {
            method: "m".to_string(),
            timestamp: String::new(),
            fitnesses: vec![1.0, 2.0],
            similarities: vec![0.5],
        };
        assert!(matches!(record.check_series(), Err(CheckError::InvalidInput(_))));
        record.similarities.clear();
        record.fitnesses.clear();
        assert!(matches!(record.check_series(), Err(CheckError::InvalidInput(_))));
    }

    #[test]
    fn test_similarity_record_order() {
        let record = SimilarityRecord {
            method: "global_convexity".to_string(),
            timestamp: "1213".to_string(),
            fitnesses: vec![1.0],
            similarities: vec![0.5],
        };
        let json = record.to_json().unwrap();
        assert!(json.find("\"timestamp\"").unwrap() < json.find("\"fitnesses\"").unwrap());
        assert!(json.find("\"fitnesses\"").unwrap() < json.find("\"similarities\"").unwrap());
    }
}
