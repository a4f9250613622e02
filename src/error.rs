//! Error types for tourcheck.
//!
//! Every fallible operation returns `Result<T, CheckError>`; nothing in the
//! library panics on bad input.

use thiserror::Error;

/// Result type alias for tourcheck operations.
pub type CheckResult<T> = Result<T, CheckError>;

/// Unified error type for all tourcheck operations.
///
/// Data-integrity and statistical variants come first; they describe a bad
/// record rather than a broken environment, and batch drivers use
/// [`CheckError::is_data_error`] to decide whether to skip an item.
#[derive(Debug, Error)]
pub enum CheckError {
    // ===== Data integrity =====
    /// A tour references a node outside the node table.
    #[error("Invalid tour: node index {index} out of range for {node_count} nodes")]
    InvalidTour {
        /// Offending node index.
        index: usize,
        /// Number of nodes in the table.
        node_count: usize,
    },

    /// A tour visits the same node twice.
    #[error("Invalid tour: node {index} appears more than once")]
    DuplicateNode {
        /// Repeated node index.
        index: usize,
    },

    /// Malformed or mismatched input series.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Correlation is undefined for the given series.
    #[error("Undefined correlation: {0}")]
    UndefinedCorrelation(String),

    /// A node table line could not be parsed.
    #[error("Node table line {line}: {message}")]
    NodeTable {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    // ===== Authority =====
    /// The authority produced no value for an instance.
    #[error("Authority could not produce a fitness for instance '{instance}'")]
    AuthorityUnavailable {
        /// Instance name passed to the authority.
        instance: String,
    },

    /// The authority failed while computing a value.
    #[error("Authority error: {0}")]
    Authority(String),

    // ===== Configuration =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O and formats =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read/write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Directory traversal error.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Plot rendering error.
    #[error("Render error: {0}")]
    Render(String),
}

impl CheckError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid-input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an undefined-correlation error.
    #[must_use]
    pub fn undefined_correlation(message: impl Into<String>) -> Self {
        Self::UndefinedCorrelation(message.into())
    }

    /// Create an authority error.
    #[must_use]
    pub fn authority(message: impl Into<String>) -> Self {
        Self::Authority(message.into())
    }

    /// Create a render error.
    #[must_use]
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Check if this error describes bad data rather than a broken environment.
    #[must_use]
    pub const fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTour { .. }
                | Self::DuplicateNode { .. }
                | Self::InvalidInput(_)
                | Self::UndefinedCorrelation(_)
                | Self::NodeTable { .. }
                | Self::Json(_)
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_detection() {
        let tour = CheckError::InvalidTour {
            index: 7,
            node_count: 5,
        };
        assert!(tour.is_data_error());

        let dup = CheckError::DuplicateNode { index: 2 };
        assert!(dup.is_data_error());

        assert!(CheckError::invalid_input("length mismatch").is_data_error());
        assert!(CheckError::undefined_correlation("zero variance").is_data_error());

        assert!(!CheckError::config("bad").is_data_error());
        assert!(!CheckError::authority("exit 1").is_data_error());
        assert!(!CheckError::render("backend").is_data_error());
    }

    #[test]
    fn test_error_display_invalid_tour() {
        let err = CheckError::InvalidTour {
            index: 12,
            node_count: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("Invalid tour"));
        assert!(msg.contains("12"));
        assert!(msg.contains("10 nodes"));
    }

    #[test]
    fn test_error_display_duplicate() {
        let msg = CheckError::DuplicateNode { index: 3 }.to_string();
        assert!(msg.contains("node 3"));
        assert!(msg.contains("more than once"));
    }

    #[test]
    fn test_error_display_node_table() {
        let err = CheckError::NodeTable {
            line: 4,
            message: "expected 3 fields".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 4"));
        assert!(msg.contains("expected 3 fields"));
    }

    #[test]
    fn test_error_config() {
        let err = CheckError::config("invalid parameter");
        let msg = err.to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("invalid parameter"));
    }

    #[test]
    fn test_error_authority_unavailable() {
        let err = CheckError::AuthorityUnavailable {
            instance: "tspA".to_string(),
        };
        assert!(!err.is_data_error());
        assert!(err.to_string().contains("tspA"));
    }

    #[test]
    fn test_error_from_io() {
        let err: CheckError = std::io::Error::other("disk full").into();
        assert!(err.to_string().contains("I/O error"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
        let err: CheckError = json_err.into();
        assert!(err.is_data_error());
        assert!(err.to_string().contains("JSON error"));
    }

    #[test]
    fn test_error_debug() {
        let err = CheckError::config("test");
        let debug = format!("{err:?}");
        assert!(debug.contains("Config"));
    }
}
