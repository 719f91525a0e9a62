//! # thoth-manifest
//!
//! The validated, immutable in-memory form of Thoth governance declarations.
//!
//! A [`RawManifest`] is the deserialized source shape (TOML on disk). It is
//! turned into a [`ManifestModel`] by [`ManifestModel::load`], which checks
//! every cross-reference and collects *all* violations before failing. There
//! is no partial load and no incremental mutation: when the source changes,
//! load a new model and swap it in.

pub mod error;
pub mod glob;
mod model;
mod raw;
mod validate;

pub use error::{ManifestError, Violation};
pub use model::ManifestModel;
pub use raw::{
    RawAdr, RawCheck, RawEdge, RawInvariant, RawLease, RawManifest, RawResource, RawSymbolBinding,
};
