//! Configuration with YAML schema and validation.
//!
//! Every entry point takes a [`Config`] instead of reading fixed paths. A
//! config file only needs the sections it changes; everything else falls
//! back to defaults.
//!
//! ```yaml
//! paths:
//!   logs_root: "logs"
//! plot:
//!   absent_opacity: 0.15
//! validation:
//!   tolerance: 0.5
//! authority:
//!   instances:
//!     - { key: "TSPA", pattern: "tspA", data: "data/TSPA.csv" }
//!     - { key: "TSPB", pattern: "tspB", data: "data/TSPB.csv" }
//!   fallback: "TSPB"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::{CheckError, CheckResult};
use crate::validation::MatchRule;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Artifact locations and file names.
    #[validate(nested)]
    #[serde(default)]
    pub paths: PathsConfig,

    /// Tour plot rendering.
    #[validate(nested)]
    #[serde(default)]
    pub plot: PlotConfig,

    /// Cross-validation behavior.
    #[validate(nested)]
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Authority instances.
    #[validate(nested)]
    #[serde(default)]
    pub authority: AuthorityConfig,

    /// Batch correlation sweep.
    #[validate(nested)]
    #[serde(default)]
    pub correlation: CorrelationConfig,
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> CheckResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> CheckResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        config.validate_semantic()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults.
    ///
    /// # Errors
    ///
    /// Propagates [`Config::load`] errors.
    pub fn load_or_default(path: Option<&Path>) -> CheckResult<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> CheckResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Constraints that span fields.
    fn validate_semantic(&self) -> CheckResult<()> {
        if self.plot.node_size_min > self.plot.node_size_max {
            return Err(CheckError::config(format!(
                "plot.node_size_min ({}) exceeds plot.node_size_max ({})",
                self.plot.node_size_min, self.plot.node_size_max
            )));
        }

        if let Some(tol) = self.validation.tolerance {
            if !tol.is_finite() || tol < 0.0 {
                return Err(CheckError::config(format!(
                    "validation.tolerance must be a non-negative number, got {tol}"
                )));
            }
        }

        let keys = &self.authority.instances;
        for (i, a) in keys.iter().enumerate() {
            if keys[i + 1..].iter().any(|b| b.key == a.key) {
                return Err(CheckError::config(format!(
                    "authority instance key '{}' is declared twice",
                    a.key
                )));
            }
        }
        if !keys.is_empty() && !keys.iter().any(|k| k.key == self.authority.fallback) {
            return Err(CheckError::config(format!(
                "authority.fallback '{}' is not a declared instance key",
                self.authority.fallback
            )));
        }

        Ok(())
    }
}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    logs_root: Option<PathBuf>,
    tolerance: Option<f64>,
    captions: Option<bool>,
    authority_command: Option<String>,
}

impl ConfigBuilder {
    /// Set the logs root directory.
    #[must_use]
    pub fn logs_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.logs_root = Some(root.into());
        self
    }

    /// Compare fitness values within `tolerance` instead of exactly.
    #[must_use]
    pub const fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Enable or disable plot captions.
    #[must_use]
    pub const fn captions(mut self, captions: bool) -> Self {
        self.captions = Some(captions);
        self
    }

    /// Use an external program as the fitness authority.
    #[must_use]
    pub fn authority_command(mut self, program: impl Into<String>) -> Self {
        self.authority_command = Some(program.into());
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        let mut config = Config::default();

        if let Some(root) = self.logs_root {
            config.paths.logs_root = root;
        }
        if let Some(tol) = self.tolerance {
            config.validation.tolerance = Some(tol);
        }
        if let Some(captions) = self.captions {
            config.plot.captions = captions;
        }
        if let Some(cmd) = self.authority_command {
            config.authority.command = Some(cmd);
        }

        config
    }
}

/// Artifact locations and file names.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Root under which run folders are created and scanned.
    #[serde(default = "default_logs_root")]
    pub logs_root: PathBuf,
    /// Base directory of the global-convexity sweep.
    #[serde(default = "default_convexity_base")]
    pub convexity_base: PathBuf,
    /// File name of a persisted record.
    #[validate(length(min = 1))]
    #[serde(default = "default_record_file")]
    pub record_file: String,
    /// File name of the typeset fragment written beside a record.
    #[validate(length(min = 1))]
    #[serde(default = "default_typeset_file")]
    pub typeset_file: String,
    /// Stem of the batch validation table (`.csv` and `.tex` are appended).
    #[validate(length(min = 1))]
    #[serde(default = "default_report_stem")]
    pub report_stem: String,
}

fn default_logs_root() -> PathBuf {
    PathBuf::from("logs")
}

fn default_convexity_base() -> PathBuf {
    PathBuf::from("logs/global_convexity")
}

fn default_record_file() -> String {
    "results.json".to_string()
}

fn default_typeset_file() -> String {
    "results.tex".to_string()
}

fn default_report_stem() -> String {
    "fitness_comparison_table".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            logs_root: default_logs_root(),
            convexity_base: default_convexity_base(),
            record_file: default_record_file(),
            typeset_file: default_typeset_file(),
            report_stem: default_report_stem(),
        }
    }
}

/// Tour plot rendering options.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PlotConfig {
    /// Image width in pixels.
    #[validate(range(min = 100, max = 10_000))]
    #[serde(default = "default_width")]
    pub width: u32,
    /// Image height in pixels.
    #[validate(range(min = 100, max = 10_000))]
    #[serde(default = "default_height")]
    pub height: u32,
    /// Opacity of nodes not in the tour.
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_absent_opacity")]
    pub absent_opacity: f64,
    /// Scale node markers by node cost.
    #[serde(default = "default_true")]
    pub size_by_cost: bool,
    /// Smallest marker radius.
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_node_size_min")]
    pub node_size_min: u32,
    /// Largest marker radius.
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_node_size_max")]
    pub node_size_max: u32,
    /// Edge stroke width.
    #[validate(range(min = 1, max = 20))]
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
    /// Color edges by length plus endpoint costs rather than length alone.
    #[serde(default = "default_true")]
    pub edge_node_cost: bool,
    /// Draw captions and axis labels (needs system fonts).
    #[serde(default = "default_true")]
    pub captions: bool,
}

fn default_width() -> u32 {
    1000
}

fn default_height() -> u32 {
    800
}

fn default_absent_opacity() -> f64 {
    0.2
}

fn default_true() -> bool {
    true
}

fn default_node_size_min() -> u32 {
    2
}

fn default_node_size_max() -> u32 {
    10
}

fn default_stroke_width() -> u32 {
    2
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            absent_opacity: default_absent_opacity(),
            size_by_cost: true,
            node_size_min: default_node_size_min(),
            node_size_max: default_node_size_max(),
            stroke_width: default_stroke_width(),
            edge_node_cost: true,
            captions: true,
        }
    }
}

/// Cross-validation behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    /// Absolute tolerance; `None` compares fitness values exactly.
    #[serde(default)]
    pub tolerance: Option<f64>,
}

impl ValidationConfig {
    /// Match rule selected by this configuration.
    #[must_use]
    pub fn match_rule(&self) -> MatchRule {
        self.tolerance.map_or(MatchRule::Exact, MatchRule::Tolerance)
    }
}

/// One authority instance: a key, the substring selecting it and its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct InstanceConfig {
    /// Instance key passed to the authority, e.g. `TSPA`.
    #[validate(length(min = 1))]
    pub key: String,
    /// Case-insensitive substring of an instance name selecting this key.
    #[validate(length(min = 1))]
    pub pattern: String,
    /// Node table for the in-process authority.
    pub data: PathBuf,
}

/// Authority configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AuthorityConfig {
    /// Known instances, matched in order.
    #[validate(nested)]
    #[serde(default = "default_instances")]
    pub instances: Vec<InstanceConfig>,
    /// Key used when no pattern matches.
    #[validate(length(min = 1))]
    #[serde(default = "default_fallback")]
    pub fallback: String,
    /// External program computing the fitness; in-process when absent.
    #[serde(default)]
    pub command: Option<String>,
}

fn default_instances() -> Vec<InstanceConfig> {
    vec![
        InstanceConfig {
            key: "TSPA".to_string(),
            pattern: "tspA".to_string(),
            data: PathBuf::from("data/TSPA.csv"),
        },
        InstanceConfig {
            key: "TSPB".to_string(),
            pattern: "tspB".to_string(),
            data: PathBuf::from("data/TSPB.csv"),
        },
    ]
}

fn default_fallback() -> String {
    "TSPB".to_string()
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            instances: default_instances(),
            fallback: default_fallback(),
            command: None,
        }
    }
}

impl AuthorityConfig {
    /// Resolve an instance name to a key: first case-insensitive pattern
    /// match wins, otherwise the fallback.
    #[must_use]
    pub fn resolve(&self, instance_name: &str) -> &str {
        let name = instance_name.to_lowercase();
        self.instances
            .iter()
            .find(|i| name.contains(&i.pattern.to_lowercase()))
            .map_or(self.fallback.as_str(), |i| i.key.as_str())
    }
}

/// Batch correlation sweep.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CorrelationConfig {
    /// Dataset directories under the base.
    #[validate(length(min = 1))]
    #[serde(default = "default_datasets")]
    pub datasets: Vec<String>,
    /// Method directories under each dataset.
    #[validate(length(min = 1))]
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,
}

fn default_datasets() -> Vec<String> {
    vec!["TSPA".to_string(), "TSPB".to_string()]
}

fn default_methods() -> Vec<String> {
    [
        "common_edges_best",
        "common_edges_average",
        "common_nodes_best",
        "common_nodes_average",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            datasets: default_datasets(),
            methods: default_methods(),
        }
    }
}
