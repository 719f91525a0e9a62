//! # thoth-touch
//!
//! Classifies a diff against the manifest's bindings.
//!
//! [`ClassificationPipeline::classify`] runs region scanning, symbol
//! extraction and symbol diffing per file in parallel, then hands the merged
//! facts to the pure [`matcher`] functions. Output ordering is fixed by
//! explicit sorts, so identical input yields byte-identical JSON.
//!
//! The same pipeline collects full-tree [`Snapshot`]s for index builds.

pub mod error;
pub mod matcher;
mod pipeline;
mod snapshot;

pub use error::TouchError;
pub use pipeline::{ClassificationPipeline, PipelineOptions};
pub use snapshot::Snapshot;
