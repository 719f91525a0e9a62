//! Deserialized manifest source shape.
//!
//! Everything here is unvalidated: enums are kept as strings so that a bad
//! value becomes a collected [`crate::Violation`] instead of aborting the
//! parse at the first error.

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawManifest {
    #[serde(default)]
    pub resources: Vec<RawResource>,
    #[serde(default)]
    pub invariants: Vec<RawInvariant>,
    #[serde(default)]
    pub adrs: Vec<RawAdr>,
    #[serde(default)]
    pub checks: Vec<RawCheck>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

impl RawManifest {
    /// Parse the TOML source form.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] on malformed TOML or wrong field types.
    pub fn from_toml_str(source: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(source)?)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawResource {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub owners: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub deps: Vec<String>,
    #[serde(default)]
    pub checks: Vec<String>,
    #[serde(default)]
    pub invariants: Vec<String>,
    #[serde(default)]
    pub adrs: Vec<String>,
    #[serde(default)]
    pub lease: Option<RawLease>,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub symbols: Vec<RawSymbolBinding>,
    #[serde(default)]
    pub regions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLease {
    pub mode: String,
    #[serde(default)]
    pub ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSymbolBinding {
    pub lang: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub fqname: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawInvariant {
    pub id: String,
    pub statement: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub verify: Vec<String>,
    #[serde(default)]
    pub doc_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAdr {
    pub id: String,
    #[serde(default)]
    pub capsule: String,
    #[serde(default)]
    pub capsule_path: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCheck {
    pub id: String,
    pub cmd: String,
    #[serde(default = "default_check_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub cacheable: bool,
}

const fn default_check_timeout() -> u64 {
    300
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEdge {
    pub src: String,
    pub dst: String,
    #[serde(rename = "type")]
    pub edge_type: String,
}
