//! The adapter seam between Thoth and a version control backend.

use std::fmt;
use std::str::FromStr;

use thoth_core::entities::{Diff, RevisionInfo, SourceFile};

use crate::error::VcsError;

/// A set of revisions for [`VcsAdapter::log`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revset {
    /// A revision and all of its ancestors.
    Ancestors(String),
    /// Revisions reachable from `to` but not from `from` (`A..B`).
    Range { from: String, to: String },
}

impl FromStr for Revset {
    type Err = VcsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once("..") {
            Some((from, to)) => {
                let to = if to.is_empty() { "HEAD" } else { to };
                if from.is_empty() || to.contains("..") {
                    return Err(VcsError::InvalidRevset(s.to_string()));
                }
                Ok(Self::Range {
                    from: from.to_string(),
                    to: to.to_string(),
                })
            }
            None if s.is_empty() => Err(VcsError::InvalidRevset(s.to_string())),
            None => Ok(Self::Ancestors(s.to_string())),
        }
    }
}

impl fmt::Display for Revset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ancestors(rev) => f.write_str(rev),
            Self::Range { from, to } => write!(f, "{from}..{to}"),
        }
    }
}

/// Read access to a repository's history and working tree.
///
/// A `None` base means the current revision; a `None` target means the
/// working tree. Paths are repository-relative with `/` separators.
pub trait VcsAdapter: Send + Sync {
    /// Backend name reported in touch output (`git`, ...).
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// Fails on an unborn repository.
    fn current_rev(&self) -> Result<String, VcsError>;

    /// Full id of the commit `rev` names.
    ///
    /// # Errors
    ///
    /// [`VcsError::Revision`] when `rev` does not resolve to a commit.
    fn resolve_rev(&self, rev: &str) -> Result<String, VcsError>;

    /// Per-file old and new content between two revisions, ordered by path.
    ///
    /// # Errors
    ///
    /// Fails when a revision cannot be resolved or an object cannot be read.
    fn diff(&self, base: Option<&str>, target: Option<&str>) -> Result<Diff, VcsError>;

    /// Raw bytes of `path` at `rev`.
    ///
    /// # Errors
    ///
    /// [`VcsError::PathNotFound`] when the path is absent at that revision.
    fn file_at_rev(&self, path: &str, rev: &str) -> Result<Vec<u8>, VcsError>;

    /// Revisions in `revset`, newest first, at most `limit` of them.
    ///
    /// # Errors
    ///
    /// Fails when a revision of the set cannot be resolved.
    fn log(&self, revset: &Revset, limit: Option<usize>) -> Result<Vec<RevisionInfo>, VcsError>;

    /// Sorted paths that differ between two revisions.
    ///
    /// # Errors
    ///
    /// Same as [`VcsAdapter::diff`].
    fn changed_paths(&self, base: Option<&str>, target: Option<&str>)
    -> Result<Vec<String>, VcsError>;

    /// Every tracked file at `rev` (`None`: the working tree), ordered by path.
    ///
    /// # Errors
    ///
    /// Fails when the revision cannot be resolved or the tree cannot be read.
    fn list_files(&self, rev: Option<&str>) -> Result<Vec<SourceFile>, VcsError>;
}
