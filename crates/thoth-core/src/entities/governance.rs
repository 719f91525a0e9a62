use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A must-hold property attached to resources.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Invariant {
    pub id: String,
    pub statement: String,
    pub scope: Option<String>,
    /// Verification pointers (check ids, test names, doc anchors).
    pub verify: Vec<String>,
    pub doc_path: Option<String>,
}

/// Short rationale summary pointing at the full decision record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AdrCapsule {
    pub id: String,
    pub capsule: String,
    pub capsule_path: Option<String>,
    pub full_path: Option<String>,
}

/// Named executable validator. Execution happens downstream.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CheckDef {
    pub id: String,
    pub cmd: String,
    pub timeout_seconds: u64,
    pub cacheable: bool,
}
