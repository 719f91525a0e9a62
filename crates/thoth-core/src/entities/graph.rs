use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Typed, directed relation between two resources.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    pub src: String,
    pub dst: String,
    pub edge_type: String,
}
