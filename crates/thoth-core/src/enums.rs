//! Severity tiers, lease modes, symbol kinds, and change classification enums.
//!
//! All enums use `snake_case` serialization and expose `as_str()` for SQL
//! storage. Variant declaration order is significant where `Ord` is derived:
//! it defines the deterministic ordering used in every output list.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Governance tier of a resource.
///
/// Ordering is `advisory < gated < serialized`, so sorting by
/// `Reverse(severity)` puts the strictest tier first.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational only.
    #[default]
    Advisory,
    /// Checks required before review.
    Gated,
    /// Checks plus an exclusive lease required.
    Serialized,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Advisory => "advisory",
            Self::Gated => "gated",
            Self::Serialized => "serialized",
        }
    }

    /// Rank used by ranked queries: lower ranks sort first.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Serialized => 0,
            Self::Gated => 1,
            Self::Advisory => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "advisory" => Ok(Self::Advisory),
            "gated" => Ok(Self::Gated),
            "serialized" => Ok(Self::Serialized),
            other => Err(format!(
                "unknown severity '{other}' (expected advisory, gated, or serialized)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// LeaseMode
// ---------------------------------------------------------------------------

/// How a lease on a resource is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeaseMode {
    Shared,
    Exclusive,
}

impl LeaseMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::Exclusive => "exclusive",
        }
    }
}

impl fmt::Display for LeaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LeaseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shared" => Ok(Self::Shared),
            "exclusive" => Ok(Self::Exclusive),
            other => Err(format!("unknown lease mode '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// SymbolKind
// ---------------------------------------------------------------------------

/// The kind of extracted symbol.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Struct,
    Enum,
    Trait,
    Interface,
    Class,
    TypeAlias,
    Const,
    Static,
    Macro,
    Module,
    Union,
}

impl SymbolKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Trait => "trait",
            Self::Interface => "interface",
            Self::Class => "class",
            Self::TypeAlias => "type_alias",
            Self::Const => "const",
            Self::Static => "static",
            Self::Macro => "macro",
            Self::Module => "module",
            Self::Union => "union",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SymbolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "function" => Self::Function,
            "method" => Self::Method,
            "struct" => Self::Struct,
            "enum" => Self::Enum,
            "trait" => Self::Trait,
            "interface" => Self::Interface,
            "class" => Self::Class,
            "type_alias" => Self::TypeAlias,
            "const" => Self::Const,
            "static" => Self::Static,
            "macro" => Self::Macro,
            "module" => Self::Module,
            "union" => Self::Union,
            other => return Err(format!("unknown symbol kind '{other}'")),
        })
    }
}

// ---------------------------------------------------------------------------
// ReasonType
// ---------------------------------------------------------------------------

/// Why a resource was classified as touched.
///
/// Declaration order is the output order of a resource's reason list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ReasonType {
    Path,
    Region,
    Symbol,
}

impl ReasonType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Region => "region",
            Self::Symbol => "symbol",
        }
    }
}

impl fmt::Display for ReasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ChangeKind
// ---------------------------------------------------------------------------

/// How a region or symbol changed between two revisions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
    Renamed,
}

impl ChangeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
            Self::Renamed => "renamed",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ModifiedPart
// ---------------------------------------------------------------------------

/// Which part of a modified symbol changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ModifiedPart {
    Signature,
    Body,
    Both,
}

impl ModifiedPart {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signature => "signature",
            Self::Body => "body",
            Self::Both => "both",
        }
    }
}

// ---------------------------------------------------------------------------
// DiagnosticStage
// ---------------------------------------------------------------------------

/// Pipeline stage that reported a problem with a file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticStage {
    RegionScan,
    SymbolParse,
    SymbolResolution,
    /// A region marker names a different resource than the manifest binding.
    /// Classification still follows the manifest.
    RegionOwner,
}

impl DiagnosticStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RegionScan => "region_scan",
            Self::SymbolParse => "symbol_parse",
            Self::SymbolResolution => "symbol_resolution",
            Self::RegionOwner => "region_owner",
        }
    }

    /// Whether facts of the file were dropped, making the result incomplete.
    #[must_use]
    pub const fn degrades(self) -> bool {
        !matches!(self, Self::RegionOwner)
    }
}

impl fmt::Display for DiagnosticStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
