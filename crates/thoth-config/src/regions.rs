//! Region marker configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_begin_marker() -> String {
    "THOTH:BEGIN".to_string()
}

fn default_end_marker() -> String {
    "THOTH:END".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegionConfig {
    /// Allow nested regions (strict LIFO close order).
    #[serde(default)]
    pub allow_nesting: bool,

    #[serde(default = "default_begin_marker")]
    pub begin_marker: String,

    #[serde(default = "default_end_marker")]
    pub end_marker: String,
}

impl RegionConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("regions.begin_marker", &self.begin_marker),
            ("regions.end_marker", &self.end_marker),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "marker must not be empty".to_string(),
                });
            }
        }
        if self.begin_marker.contains(&self.end_marker)
            || self.end_marker.contains(&self.begin_marker)
        {
            return Err(ConfigError::InvalidValue {
                field: "regions.end_marker".to_string(),
                reason: "begin and end markers must differ and neither may contain the other"
                    .to_string(),
            });
        }
        Ok(())
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            allow_nesting: false,
            begin_marker: default_begin_marker(),
            end_marker: default_end_marker(),
        }
    }
}
