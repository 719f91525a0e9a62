use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::LeaseSpec;
use crate::enums::{ChangeKind, DiagnosticStage, ModifiedPart, ReasonType, Severity};

/// Why a resource was classified as touched.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TouchReason {
    #[serde(rename = "type")]
    pub reason_type: ReasonType,
    /// Path, region id, or symbol fqname depending on `reason_type`.
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<ChangeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<ModifiedPart>,
    /// Previous fqname for renamed symbols.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renamed_from: Option<String>,
}

impl TouchReason {
    #[must_use]
    pub fn path(path: &str) -> Self {
        Self {
            reason_type: ReasonType::Path,
            value: path.to_string(),
            change: None,
            part: None,
            renamed_from: None,
        }
    }

    #[must_use]
    pub fn region(region_id: &str, change: ChangeKind) -> Self {
        Self {
            reason_type: ReasonType::Region,
            value: region_id.to_string(),
            change: Some(change),
            part: None,
            renamed_from: None,
        }
    }
}

/// One resource in a touch result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TouchedResource {
    pub resource_id: String,
    pub severity: Severity,
    pub reasons: Vec<TouchReason>,
    pub required_checks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease: Option<LeaseSpec>,
}

/// A changed path no binding claims, or a file that degraded.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UnknownPath {
    pub path: String,
    pub note: String,
}

/// Per-file structural error reported as data.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FileDiagnostic {
    pub path: String,
    pub stage: DiagnosticStage,
    pub message: String,
}

/// Outcome of one classification run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TouchResult {
    /// Ordered by resource id ascending.
    pub touched: Vec<TouchedResource>,
    /// Ordered by path ascending.
    pub unknown: Vec<UnknownPath>,
    pub diagnostics: Vec<FileDiagnostic>,
    /// True when any file degraded and the result may under-report.
    pub incomplete: bool,
}

impl TouchResult {
    /// Ids of every touched resource, in output order.
    #[must_use]
    pub fn resource_ids(&self) -> Vec<&str> {
        self.touched.iter().map(|t| t.resource_id.as_str()).collect()
    }
}
