//! CLI response envelopes returned as JSON by `thoth` commands.
//!
//! Every envelope carries `version` ([`crate::OUTPUT_VERSION`]); the shapes
//! are stable and published through `thoth schema`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Edge, Resource, RevisionInfo, Symbol, TouchResult};
use crate::views::{BuildReport, FindHit, ResourceDetail, WalkResult};

/// VCS coordinates of a touch run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct VcsInfo {
    pub backend: String,
    pub base: String,
    /// `None` when the working tree was classified.
    pub target: Option<String>,
}

/// Inputs of a touch run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TouchInputs {
    pub files: Vec<String>,
}

/// Response from `thoth touch`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TouchResponse {
    pub version: u32,
    pub vcs: VcsInfo,
    pub inputs: TouchInputs,
    #[serde(flatten)]
    pub result: TouchResult,
    /// Revision the result was recorded against, with `--record`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded: Option<String>,
}

/// Response from `thoth map`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MapResponse {
    pub version: u32,
    pub resources: Vec<Resource>,
    pub edges: Vec<Edge>,
}

/// Response from `thoth find`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FindResponse {
    pub version: u32,
    pub handle: String,
    pub results: Vec<FindHit>,
}

/// Response from `thoth show`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ShowResponse {
    pub version: u32,
    #[serde(flatten)]
    pub detail: ResourceDetail,
}

/// Response from `thoth walk`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct WalkResponse {
    pub version: u32,
    #[serde(flatten)]
    pub walk: WalkResult,
}

/// Response from `thoth history`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HistoryResponse {
    pub version: u32,
    pub resource_id: String,
    pub revisions: Vec<RevisionInfo>,
}

/// Response from `thoth index build`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct IndexBuildResponse {
    pub version: u32,
    #[serde(flatten)]
    pub report: BuildReport,
}

/// Response from `thoth index symbols`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SymbolsResponse {
    pub version: u32,
    pub symbols: Vec<Symbol>,
}
