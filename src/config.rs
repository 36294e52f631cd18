//! Engine configuration, loaded from `qforge.toml`.
//!
//! ```toml
//! dialect = "SQLite"
//! parameter_prefix = "P"
//! max_batch_statements = 50
//! in_parameter_mode = "Split"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, ForgeResult};
use crate::transpiler::contract::DEFAULT_PARAMETER_PREFIX;
use crate::transpiler::{Dialect, InParameterMode};

pub const CONFIG_FILE_NAME: &str = "qforge.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub dialect: Dialect,
    /// Prefix of generated parameter names. Shared with the execution
    /// layer, so it must match what the row mapper expects.
    pub parameter_prefix: String,
    /// Statements per batched round trip.
    pub max_batch_statements: usize,
    /// Parameters per batched round trip; the dialect limit still caps it.
    pub max_batch_parameters: usize,
    /// Overrides the dialect's In/NotIn binding mode.
    pub in_parameter_mode: Option<InParameterMode>,
    /// Maximum nesting of subqueries, groups and join targets.
    pub max_depth: usize,
    /// Run statements with an identity read-back in their own round trip.
    pub isolate_read_back: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            parameter_prefix: DEFAULT_PARAMETER_PREFIX.to_string(),
            max_batch_statements: 50,
            max_batch_parameters: 2000,
            in_parameter_mode: None,
            max_depth: 64,
            isolate_read_back: true,
        }
    }
}

impl EngineConfig {
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> ForgeResult<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| ForgeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ForgeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Explicit path, then `./qforge.toml`, then the user config directory,
    /// else defaults.
    pub fn discover(explicit: Option<&Path>) -> ForgeResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::candidate_paths().into_iter().find(|p| p.exists()) {
            Some(path) => {
                tracing::debug!("loading config from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("qforge").join(CONFIG_FILE_NAME));
        }
        paths
    }

    fn validate(&self) -> ForgeResult<()> {
        if self.parameter_prefix.is_empty()
            || !self
                .parameter_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ForgeError::Config(format!(
                "parameter_prefix must be a non-empty identifier, got '{}'",
                self.parameter_prefix
            )));
        }
        if self.max_batch_statements == 0 || self.max_batch_parameters == 0 {
            return Err(ForgeError::Config(
                "batch limits must be greater than zero".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(ForgeError::Config("max_depth must be greater than zero".to_string()));
        }
        Ok(())
    }
}
