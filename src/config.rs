use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KessaiConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Prefix of edge ids generated by `connect`.
    #[serde(default = "default_edge_id_prefix")]
    pub edge_id_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            edge_id_prefix: default_edge_id_prefix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Report nodes unreachable from START as errors instead of warnings.
    #[serde(default)]
    pub unreachable_is_error: bool,
    /// Warn when a CONDITION node has no default edge.
    #[serde(default = "default_true")]
    pub warn_missing_default: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            unreachable_is_error: false,
            warn_missing_default: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Automatic transitions allowed per advance before the instance fails.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

fn default_edge_id_prefix() -> String {
    "edge".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_steps() -> usize {
    1000
}

impl KessaiConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::NotFound(path.display().to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
