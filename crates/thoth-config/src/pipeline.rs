//! Classification pipeline configuration.

use serde::{Deserialize, Serialize};

const fn default_file_timeout_ms() -> u64 {
    2_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Worker threads for per-file work. `0` uses the rayon default.
    #[serde(default)]
    pub workers: usize,

    /// Budget for one file's symbol extraction before it degrades.
    #[serde(default = "default_file_timeout_ms")]
    pub file_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            file_timeout_ms: default_file_timeout_ms(),
        }
    }
}
