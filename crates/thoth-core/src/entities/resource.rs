use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{LeaseMode, Severity, SymbolKind};

/// A governed architectural surface.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Resource {
    pub id: String,
    pub description: String,
    pub severity: Severity,
    pub owners: Vec<String>,
    pub tags: Vec<String>,
    /// Resource ids this resource depends on (`depends-on` edges).
    pub deps: Vec<String>,
    /// Check ids required before review.
    pub checks: Vec<String>,
    pub invariants: Vec<String>,
    pub adrs: Vec<String>,
    pub lease: Option<LeaseSpec>,
}

/// Lease requirements consumed by the lease service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LeaseSpec {
    pub mode: LeaseMode,
    pub ttl_seconds: Option<u64>,
}

/// Glob rule binding files to a resource.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PathBinding {
    pub resource_id: String,
    pub glob: String,
}

/// Exactly one way of selecting symbols.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SymbolSelector {
    /// Exact fully-qualified name.
    Fqname(String),
    /// Regular expression over the symbol's bare name.
    Pattern(String),
    /// Custom structural query; matches only symbols captured by this query.
    Query(String),
}

impl SymbolSelector {
    /// Column name used in `binding_symbol`.
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Fqname(_) => "fqname",
            Self::Pattern(_) => "pattern",
            Self::Query(_) => "query",
        }
    }

    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Fqname(v) | Self::Pattern(v) | Self::Query(v) => v,
        }
    }
}

/// Rule binding a language symbol to a resource.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SymbolBinding {
    pub resource_id: String,
    pub lang: String,
    pub kind: Option<SymbolKind>,
    pub selector: SymbolSelector,
}

/// Rule binding a tagged region to a resource.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RegionBinding {
    pub resource_id: String,
    pub region_id: String,
}
