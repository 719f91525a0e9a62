//! # thoth-core
//!
//! Core types shared by every Thoth crate.
//!
//! - Entity structs for governance declarations (resources, bindings,
//!   invariants, ADR capsules, checks, edges)
//! - Structural facts extracted from source (regions, symbols)
//! - Classification output (`TouchResult` and its reasons)
//! - Read-side views returned by the graph index
//! - CLI response envelopes with stable JSON schemas
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod responses;
pub mod views;

/// Version stamped into every JSON envelope. Bump on breaking schema changes.
pub const OUTPUT_VERSION: u32 = 1;

/// Edge type produced from a resource's declared `deps`.
pub const EDGE_DEPENDS_ON: &str = "depends-on";
