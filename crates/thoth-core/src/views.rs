//! Read-side views returned by the graph index.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{
    AdrCapsule, CheckDef, Edge, FileDiagnostic, Invariant, Region, Resource, SymbolBinding,
};
use crate::enums::Severity;

/// Resources matching a map filter plus their declared edges.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MapView {
    pub resources: Vec<Resource>,
    pub edges: Vec<Edge>,
}

/// Match tier of a `find` hit. Lower tiers rank first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum FindTier {
    ExactId,
    Tag,
    Binding,
    Text,
}

impl FindTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExactId => "exact_id",
            Self::Tag => "tag",
            Self::Binding => "binding",
            Self::Text => "text",
        }
    }
}

/// One ranked `find` result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FindHit {
    pub resource_id: String,
    pub severity: Severity,
    pub tier: FindTier,
    /// What matched, e.g. `tag:storage` or `invariant:INV-7`.
    pub matched: String,
}

/// Capsule view of a single resource.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ResourceDetail {
    pub resource: Resource,
    pub paths: Vec<String>,
    pub symbols: Vec<SymbolBinding>,
    pub region_bindings: Vec<String>,
    pub regions: Vec<Region>,
    pub invariants: Vec<Invariant>,
    pub adrs: Vec<AdrCapsule>,
    pub checks: Vec<CheckDef>,
    /// Resources that declare a dependency on this one.
    pub dependents: Vec<String>,
}

/// A node reached by `walk`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct WalkNode {
    pub id: String,
    pub depth: u32,
    pub severity: Severity,
}

/// Bounded subgraph reached from a starting node.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct WalkResult {
    pub root: String,
    pub depth: u32,
    pub edge_types: Vec<String>,
    /// Breadth-first order; each node appears once.
    pub nodes: Vec<WalkNode>,
    /// Edges traversed, in traversal order.
    pub edges: Vec<Edge>,
}

/// Summary of a full index rebuild.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BuildReport {
    pub rev: String,
    pub resources: u32,
    pub edges: u32,
    pub regions: u32,
    pub symbols: u32,
    pub files_scanned: u32,
    /// Files whose regions or symbols could not be indexed.
    pub degraded: Vec<FileDiagnostic>,
}
