//! Entity structs for Thoth.
//!
//! Governance declarations (resources and their bindings, invariants, ADR
//! capsules, checks, edges), structural facts extracted from source (regions,
//! symbols), classification input and output, and revision metadata.

mod diff;
mod governance;
mod graph;
mod region;
mod resource;
mod revision;
mod symbol;
mod touch;

pub use diff::{Diff, FileChange, SourceFile};
pub use governance::{AdrCapsule, CheckDef, Invariant};
pub use graph::Edge;
pub use region::Region;
pub use resource::{LeaseSpec, PathBinding, RegionBinding, Resource, SymbolBinding, SymbolSelector};
pub use revision::RevisionInfo;
pub use symbol::Symbol;
pub use touch::{FileDiagnostic, TouchReason, TouchResult, TouchedResource, UnknownPath};
