//! Error types for the graph index.

use thiserror::Error;

/// Errors from index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A SQL query failed or returned malformed data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Another build holds the writer.
    #[error("An index build is already in progress")]
    BuildInProgress,

    /// The build transaction failed; the previous index is untouched.
    #[error("Index build failed: {0}")]
    Build(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// The index has never been built.
    #[error("Index is empty; run `thoth index build` first")]
    NotBuilt,

    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}
