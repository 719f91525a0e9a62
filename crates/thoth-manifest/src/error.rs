//! Manifest error types.

use thiserror::Error;

/// A single validation failure. All of them are collected per load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("{entity} id must not be empty")]
    EmptyId { entity: &'static str },

    #[error("duplicate {entity} id '{id}'")]
    Duplicate { entity: &'static str, id: String },

    #[error("resource '{resource}' references unknown check '{check}'")]
    UnknownCheck { resource: String, check: String },

    #[error("resource '{resource}' references unknown invariant '{invariant}'")]
    UnknownInvariant { resource: String, invariant: String },

    #[error("resource '{resource}' references unknown adr '{adr}'")]
    UnknownAdr { resource: String, adr: String },

    #[error("resource '{resource}' depends on unknown resource '{dep}'")]
    UnknownDependency { resource: String, dep: String },

    #[error("edge {src} -[{edge_type}]-> {dst} references unknown resource '{missing}'")]
    UnknownEdgeEndpoint {
        src: String,
        dst: String,
        edge_type: String,
        missing: String,
    },

    #[error("resource '{resource}' has severity '{value}' (expected advisory, gated, or serialized)")]
    UnknownSeverity { resource: String, value: String },

    #[error("resource '{resource}' declares an exclusive lease without a positive ttl_seconds")]
    MissingLeaseTtl { resource: String },

    #[error("resource '{resource}' has lease mode '{value}' (expected shared or exclusive)")]
    UnknownLeaseMode { resource: String, value: String },

    #[error(
        "resource '{resource}' symbol binding #{index} sets {count} of fqname/pattern/query (exactly one required)"
    )]
    SymbolSelectorCount {
        resource: String,
        index: usize,
        count: usize,
    },

    #[error("resource '{resource}' symbol binding #{index} has unknown kind '{value}'")]
    UnknownSymbolKind {
        resource: String,
        index: usize,
        value: String,
    },

    #[error("region id '{region}' is bound by both '{first}' and '{second}'")]
    DuplicateRegion {
        region: String,
        first: String,
        second: String,
    },

    #[error("resource '{resource}' has invalid glob '{glob}': {reason}")]
    InvalidGlob {
        resource: String,
        glob: String,
        reason: String,
    },

    #[error("resource '{resource}' has invalid symbol pattern '{pattern}': {reason}")]
    InvalidPattern {
        resource: String,
        pattern: String,
        reason: String,
    },
}

/// Errors from loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The source could not be parsed into a [`crate::RawManifest`].
    #[error("manifest parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The manifest parsed but violates one or more constraints.
    #[error("manifest validation failed with {} violation(s): {}", violations.len(), join(violations))]
    Invalid { violations: Vec<Violation> },
}

impl ManifestError {
    /// Violations carried by an `Invalid` error, empty otherwise.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Invalid { violations } => violations,
            Self::Parse(_) => &[],
        }
    }
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
