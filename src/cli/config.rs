use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matching::engine::ReconcileConfig;
use crate::parsing::checklist::ChecklistOptions;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Settings read from an optional JSON config file.
///
/// Both parts are optional in the file; missing fields take their defaults.
///
/// ```json
/// {
///   "reconcile": { "match_mode": "strict", "hint_limit": 5, "suggest_threshold": 0.5 },
///   "checklist": { "header_rows": 2, "preamble": "collect" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub reconcile: ReconcileConfig,
    pub checklist: ChecklistOptions,
}

impl RunConfig {
    /// Load config from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse config from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load_from_file)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.checklist.header_rows == 0 {
            return Err(ConfigError::Invalid(
                "checklist.header_rows must be at least 1".to_string(),
            ));
        }
        if self.reconcile.hint_prefix_len == 0 {
            return Err(ConfigError::Invalid(
                "reconcile.hint_prefix_len must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.reconcile.suggest_threshold) {
            return Err(ConfigError::Invalid(
                "reconcile.suggest_threshold must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}
