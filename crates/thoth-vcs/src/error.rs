use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a git repository: {0}")]
    NotRepository(PathBuf),

    #[error("repository has no commits yet")]
    Unborn,

    #[error("cannot resolve revision '{rev}': {message}")]
    Revision { rev: String, message: String },

    #[error("invalid revset '{0}'")]
    InvalidRevset(String),

    #[error("path '{path}' does not exist at {rev}")]
    PathNotFound { path: String, rev: String },

    #[error("git error: {0}")]
    Git(String),

    #[error("walk error: {0}")]
    Walk(#[from] ignore::Error),
}
