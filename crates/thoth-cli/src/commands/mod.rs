pub mod dispatch;
pub mod find;
pub mod history;
pub mod index;
pub mod map;
pub mod schema;
pub mod show;
pub mod touch;
pub mod walk;

use anyhow::Context;
use thoth_core::entities::RevisionInfo;
use thoth_vcs::{Revset, VcsAdapter};

/// Commit metadata for an already-resolved revision id.
pub(crate) fn revision_info(vcs: &dyn VcsAdapter, rev_id: &str) -> anyhow::Result<RevisionInfo> {
    vcs.log(&Revset::Ancestors(rev_id.to_string()), None)?
        .into_iter()
        .find(|r| r.rev_id == rev_id)
        .with_context(|| format!("revision {rev_id} not found in its own history"))
}
