//! # thoth-vcs
//!
//! The version control adapter consumed by classification and index builds.
//!
//! [`VcsAdapter`] is the seam; [`GitAdapter`] implements it with `gix` (pure
//! Rust git), so the rest of the workspace never links against git directly.
//! Working-tree reads go through the `ignore` walker and honor `.gitignore`.

pub mod adapter;
pub mod error;
mod git;
mod worktree;

pub use adapter::{Revset, VcsAdapter};
pub use error::VcsError;
pub use git::GitAdapter;
