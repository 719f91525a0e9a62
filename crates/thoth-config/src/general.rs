//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default result limit.
const fn default_limit() -> u32 {
    20
}

fn default_manifest_path() -> String {
    ".thoth/manifest.toml".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Default result limit for `find` and `history`.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Manifest location, relative to the project root.
    #[serde(default = "default_manifest_path")]
    pub manifest_path: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            manifest_path: default_manifest_path(),
        }
    }
}
