//! Symbol extraction and diffing configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_rename_threshold() -> f64 {
    0.6
}

const fn default_max_file_bytes() -> u64 {
    1024 * 1024
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SymbolConfig {
    /// Minimum signature similarity for a removed/added pair to count as a rename.
    #[serde(default = "default_rename_threshold")]
    pub rename_threshold: f64,

    /// Files larger than this are classified by path only.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

impl SymbolConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.rename_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "symbols.rename_threshold".to_string(),
                reason: format!("{} is outside [0, 1]", self.rename_threshold),
            });
        }
        Ok(())
    }
}

impl Default for SymbolConfig {
    fn default() -> Self {
        Self {
            rename_threshold: default_rename_threshold(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}
