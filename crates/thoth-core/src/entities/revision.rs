use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Metadata for one revision, as reported by the VCS adapter.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RevisionInfo {
    pub rev_id: String,
    pub committed_at: DateTime<Utc>,
    pub summary: String,
}
