//! Cross-cutting error types for Thoth.
//!
//! Domain-specific errors (`ManifestError`, `ParserError`, `IndexError`, ...)
//! live in their crates; the binary converges them through `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any Thoth crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced resource is not declared.
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
