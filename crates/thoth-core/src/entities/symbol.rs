use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::SymbolKind;

/// An extracted structural unit.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Symbol {
    pub fqname: String,
    /// Bare name, matched by pattern bindings.
    pub name: String,
    pub lang: String,
    pub kind: SymbolKind,
    /// Enclosing container names, outermost first.
    pub scope: Vec<String>,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub signature_text: String,
    /// Hex SHA-256 of the body (or whole node) text with per-line trailing
    /// whitespace trimmed.
    pub body_hash: String,
    /// Custom query that produced this symbol, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}
