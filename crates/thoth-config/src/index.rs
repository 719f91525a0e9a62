//! Graph index storage configuration.

use serde::{Deserialize, Serialize};

fn default_db_path() -> String {
    ".thoth/index.db".to_string()
}

const fn default_busy_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// libSQL database file, relative to the project root.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// How long a connection waits on a locked database.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}
