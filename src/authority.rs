//! Independent fitness authorities.
//!
//! An authority is ground truth for a tour's objective value. It may be an
//! external program, a spreadsheet session or an in-process recomputation;
//! the validator only sees [`FitnessAuthority`]. Authorities hold session
//! state, so the trait takes `&mut self` and one value serves one caller at a
//! time.

use std::collections::HashMap;
use std::process::Command;

use tracing::debug;

use crate::config::AuthorityConfig;
use crate::error::{CheckError, CheckResult};
use crate::nodes::NodeTable;
use crate::tour;

/// Capability computing an authoritative fitness for a tour.
pub trait FitnessAuthority {
    /// Authoritative fitness of `tour` on the named instance.
    ///
    /// `Ok(None)` means the authority is reachable but produced no value.
    ///
    /// # Errors
    ///
    /// Returns an error if the authority itself fails.
    fn authoritative_fitness(&mut self, instance: &str, tour: &[usize]) -> CheckResult<Option<f64>>;

    /// Short human-readable name.
    fn name(&self) -> &str;
}

/// Recomputes the objective from the instance's node table.
///
/// Instance names are mapped to keys through [`AuthorityConfig::resolve`];
/// a key without a loaded table yields `None`.
#[derive(Debug, Clone)]
pub struct ObjectiveAuthority {
    selector: AuthorityConfig,
    tables: HashMap<String, NodeTable>,
}

impl ObjectiveAuthority {
    /// Authority with no tables loaded.
    #[must_use]
    pub fn new(selector: AuthorityConfig) -> Self {
        Self {
            selector,
            tables: HashMap::new(),
        }
    }

    /// Load every configured instance's node table.
    ///
    /// # Errors
    ///
    /// Returns the first table that fails to load.
    pub fn from_config(config: &AuthorityConfig) -> CheckResult<Self> {
        let mut authority = Self::new(config.clone());
        for instance in &config.instances {
            let table = NodeTable::load(&instance.data)?;
            debug!(key = %instance.key, nodes = table.len(), "loaded authority table");
            authority.tables.insert(instance.key.clone(), table);
        }
        Ok(authority)
    }

    /// Register (or replace) the table for a key.
    #[must_use]
    pub fn with_table(mut self, key: impl Into<String>, table: NodeTable) -> Self {
        self.tables.insert(key.into(), table);
        self
    }
}

impl FitnessAuthority for ObjectiveAuthority {
    fn authoritative_fitness(&mut self, instance: &str, tour: &[usize]) -> CheckResult<Option<f64>> {
        let key = self.selector.resolve(instance);
        let Some(table) = self.tables.get(key) else {
            debug!(instance, key, "no table for instance key");
            return Ok(None);
        };
        tour::objective(table, tour).map(Some)
    }

    fn name(&self) -> &str {
        "objective"
    }
}

/// Runs an external program per query.
///
/// The program is called as `<program> <key> <i0,i1,...>` and must print the
/// fitness on stdout. Blank output means "no value"; a non-zero exit status
/// is an error.
#[derive(Debug, Clone)]
pub struct CommandAuthority {
    program: String,
    selector: AuthorityConfig,
}

impl CommandAuthority {
    /// Authority backed by `program`.
    #[must_use]
    pub fn new(program: impl Into<String>, selector: AuthorityConfig) -> Self {
        Self {
            program: program.into(),
            selector,
        }
    }

    /// Parse the program's stdout.
    fn parse_output(stdout: &str) -> CheckResult<Option<f64>> {
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse::<f64>()
            .map(Some)
            .map_err(|e| CheckError::authority(format!("unparseable fitness '{trimmed}': {e}")))
    }
}

impl FitnessAuthority for CommandAuthority {
    fn authoritative_fitness(&mut self, instance: &str, tour: &[usize]) -> CheckResult<Option<f64>> {
        let key = self.selector.resolve(instance);
        let joined = join_tour(tour, ",");
        debug!(program = %self.program, key, "querying external authority");

        let output = Command::new(&self.program)
            .arg(key)
            .arg(&joined)
            .output()
            .map_err(|e| CheckError::authority(format!("failed to run '{}': {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CheckError::authority(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Self::parse_output(&String::from_utf8_lossy(&output.stdout))
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Authoritative fitness, treating "no value" as an error.
///
/// # Errors
///
/// Returns [`CheckError::AuthorityUnavailable`] when the authority has no
/// value, or whatever the authority itself fails with.
pub fn require_fitness(
    authority: &mut dyn FitnessAuthority,
    instance: &str,
    tour: &[usize],
) -> CheckResult<f64> {
    authority
        .authoritative_fitness(instance, tour)?
        .ok_or_else(|| CheckError::AuthorityUnavailable {
            instance: instance.to_string(),
        })
}

/// Join tour indices with a separator.
#[must_use]
pub fn join_tour(tour: &[usize], sep: &str) -> String {
    tour.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}
