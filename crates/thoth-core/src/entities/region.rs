use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A begin/end tagged span in a file.
///
/// Lines are 1-based and refer to the marker lines themselves; the hashed
/// content is strictly between them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Region {
    pub region_id: String,
    pub resource_id: String,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    /// Hex SHA-256 of the canonicalized interior.
    pub canonical_hash: String,
    pub canonical_len: u64,
}
