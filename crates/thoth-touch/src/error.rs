//! Classification error types.

/// Errors from setting up the classification pipeline.
///
/// Per-file failures are never errors here; they are reported as
/// diagnostics in the result.
#[derive(Debug, thiserror::Error)]
pub enum TouchError {
    #[error("Failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("Invalid pipeline option: {0}")]
    InvalidOption(String),
}
