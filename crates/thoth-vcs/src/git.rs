use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thoth_core::entities::{Diff, FileChange, RevisionInfo, SourceFile};

use crate::adapter::{Revset, VcsAdapter};
use crate::error::VcsError;
use crate::worktree;

/// Git backend over `gix`.
#[derive(Clone)]
pub struct GitAdapter {
    repo: gix::ThreadSafeRepository,
    root: PathBuf,
}

impl std::fmt::Debug for GitAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitAdapter")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// One side of a diff: blob ids of a commit, or working-tree bytes.
enum Side {
    Commit(BTreeMap<String, gix::ObjectId>),
    Worktree(BTreeMap<String, Vec<u8>>),
}

impl GitAdapter {
    /// Find the repository containing `path`.
    ///
    /// # Errors
    ///
    /// [`VcsError::NotRepository`] when no repository encloses `path`.
    pub fn discover(path: &Path) -> Result<Self, VcsError> {
        let repo =
            gix::discover(path).map_err(|_| VcsError::NotRepository(path.to_path_buf()))?;
        let root = repo
            .work_dir()
            .map_or_else(|| path.to_path_buf(), Path::to_path_buf);
        tracing::debug!(root = %root.display(), "opened git repository");
        Ok(Self {
            repo: repo.into_sync(),
            root,
        })
    }

    /// Working tree root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn local(&self) -> gix::Repository {
        self.repo.to_thread_local()
    }

    fn side(&self, repo: &gix::Repository, rev: Option<&str>) -> Result<Side, VcsError> {
        match rev {
            Some(rev) => Ok(Side::Commit(tree_blobs(repo, rev)?)),
            None => Ok(Side::Worktree(worktree::read_tree(&self.root)?)),
        }
    }
}

fn resolve(repo: &gix::Repository, rev: &str) -> Result<gix::ObjectId, VcsError> {
    let commit = repo
        .rev_parse_single(rev)
        .map_err(|e| VcsError::Revision {
            rev: rev.to_string(),
            message: e.to_string(),
        })?
        .object()
        .map_err(|e| VcsError::Git(format!("load object for {rev}: {e}")))?
        .peel_to_commit()
        .map_err(|e| VcsError::Revision {
            rev: rev.to_string(),
            message: e.to_string(),
        })?;
    Ok(commit.id)
}

/// Blob ids of every file in the tree of `rev`, keyed by path.
fn tree_blobs(
    repo: &gix::Repository,
    rev: &str,
) -> Result<BTreeMap<String, gix::ObjectId>, VcsError> {
    let id = resolve(repo, rev)?;
    let tree = repo
        .find_commit(id)
        .map_err(|e| VcsError::Git(format!("find commit {id}: {e}")))?
        .tree()
        .map_err(|e| VcsError::Git(format!("load tree of {id}: {e}")))?;

    let mut recorder = gix::traverse::tree::Recorder::default();
    tree.traverse()
        .breadthfirst(&mut recorder)
        .map_err(|e| VcsError::Git(format!("traverse tree of {id}: {e}")))?;

    Ok(recorder
        .records
        .into_iter()
        .filter(|e| !e.mode.is_tree() && !e.mode.is_commit())
        .map(|e| (e.filepath.to_string(), e.oid))
        .collect())
}

fn read_blob(repo: &gix::Repository, id: gix::ObjectId) -> Result<Vec<u8>, VcsError> {
    Ok(repo
        .find_object(id)
        .map_err(|e| VcsError::Git(format!("read blob {id}: {e}")))?
        .detach()
        .data)
}

impl Side {
    fn paths(&self) -> BTreeSet<&str> {
        match self {
            Self::Commit(m) => m.keys().map(String::as_str).collect(),
            Self::Worktree(m) => m.keys().map(String::as_str).collect(),
        }
    }

    fn contains(&self, path: &str) -> bool {
        match self {
            Self::Commit(m) => m.contains_key(path),
            Self::Worktree(m) => m.contains_key(path),
        }
    }

    fn bytes(&self, repo: &gix::Repository, path: &str) -> Result<Option<Vec<u8>>, VcsError> {
        match self {
            Self::Commit(m) => m.get(path).map(|id| read_blob(repo, *id)).transpose(),
            Self::Worktree(m) => Ok(m.get(path).cloned()),
        }
    }
}

/// Paths whose content differs between two sides, sorted.
fn differing_paths(
    repo: &gix::Repository,
    base: &Side,
    target: &Side,
) -> Result<Vec<String>, VcsError> {
    let mut out = Vec::new();
    for path in base.paths().union(&target.paths()) {
        let changed = match (base, target) {
            (Side::Commit(a), Side::Commit(b)) => a.get(*path) != b.get(*path),
            _ if !base.contains(path) || !target.contains(path) => true,
            _ => base.bytes(repo, path)? != target.bytes(repo, path)?,
        };
        if changed {
            out.push((*path).to_string());
        }
    }
    Ok(out)
}

fn file_change(path: String, old: Option<Vec<u8>>, new: Option<Vec<u8>>) -> FileChange {
    let binary_old = old.as_ref().is_some_and(|b| looks_binary(b));
    let binary_new = new.as_ref().is_some_and(|b| looks_binary(b));
    let binary = binary_old || binary_new;
    let lang = thoth_parser::detect_language(&path).map(str::to_string);
    FileChange {
        lang,
        old: old.filter(|_| !binary).and_then(worktree::decode),
        new: new.filter(|_| !binary).and_then(worktree::decode),
        binary,
        path,
    }
}

fn looks_binary(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(8000)].contains(&0) || std::str::from_utf8(bytes).is_err()
}

fn revision_info(repo: &gix::Repository, id: gix::ObjectId) -> Result<RevisionInfo, VcsError> {
    let commit = repo
        .find_commit(id)
        .map_err(|e| VcsError::Git(format!("find commit {id}: {e}")))?;
    let seconds = commit
        .time()
        .map_err(|e| VcsError::Git(format!("read time of {id}: {e}")))?
        .seconds;
    let committed_at = DateTime::<Utc>::from_timestamp(seconds, 0).unwrap_or_default();
    let summary = commit
        .message_raw_sloppy()
        .to_string()
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    Ok(RevisionInfo {
        rev_id: id.to_string(),
        committed_at,
        summary,
    })
}

fn ancestors(repo: &gix::Repository, tip: gix::ObjectId) -> Result<Vec<gix::ObjectId>, VcsError> {
    let walk = repo
        .rev_walk([tip])
        .all()
        .map_err(|e| VcsError::Git(format!("rev-walk from {tip}: {e}")))?;
    let mut ids = Vec::new();
    for info in walk {
        let info = info.map_err(|e| VcsError::Git(format!("rev-walk from {tip}: {e}")))?;
        ids.push(info.id);
    }
    Ok(ids)
}

impl VcsAdapter for GitAdapter {
    fn name(&self) -> &'static str {
        "git"
    }

    fn current_rev(&self) -> Result<String, VcsError> {
        let repo = self.local();
        let head = repo.head_id().map_err(|_| VcsError::Unborn)?;
        Ok(head.to_string())
    }

    fn resolve_rev(&self, rev: &str) -> Result<String, VcsError> {
        Ok(resolve(&self.local(), rev)?.to_string())
    }

    fn diff(&self, base: Option<&str>, target: Option<&str>) -> Result<Diff, VcsError> {
        let repo = self.local();
        let base_rev = resolve(&repo, base.unwrap_or("HEAD"))?.to_string();
        let target_rev = target.map(|t| resolve(&repo, t)).transpose()?;
        let target_rev = target_rev.map(|id| id.to_string());

        let old = self.side(&repo, Some(&base_rev))?;
        let new = self.side(&repo, target_rev.as_deref())?;

        let mut files = Vec::new();
        for path in differing_paths(&repo, &old, &new)? {
            let before = old.bytes(&repo, &path)?;
            let after = new.bytes(&repo, &path)?;
            files.push(file_change(path, before, after));
        }
        tracing::info!(
            base = %base_rev,
            target = target_rev.as_deref().unwrap_or("worktree"),
            files = files.len(),
            "computed diff"
        );
        Ok(Diff {
            base: base_rev,
            target: target_rev,
            files,
        })
    }

    fn file_at_rev(&self, path: &str, rev: &str) -> Result<Vec<u8>, VcsError> {
        let repo = self.local();
        let blobs = tree_blobs(&repo, rev)?;
        let id = blobs.get(path).ok_or_else(|| VcsError::PathNotFound {
            path: path.to_string(),
            rev: rev.to_string(),
        })?;
        read_blob(&repo, *id)
    }

    fn log(&self, revset: &Revset, limit: Option<usize>) -> Result<Vec<RevisionInfo>, VcsError> {
        let repo = self.local();
        let (tip, excluded): (gix::ObjectId, HashSet<gix::ObjectId>) = match revset {
            Revset::Ancestors(rev) => (resolve(&repo, rev)?, HashSet::new()),
            Revset::Range { from, to } => {
                let from = resolve(&repo, from)?;
                (resolve(&repo, to)?, ancestors(&repo, from)?.into_iter().collect())
            }
        };

        let mut revisions = Vec::new();
        for id in ancestors(&repo, tip)? {
            if !excluded.contains(&id) {
                revisions.push(revision_info(&repo, id)?);
            }
        }
        revisions.sort_by(|a, b| {
            b.committed_at
                .cmp(&a.committed_at)
                .then_with(|| a.rev_id.cmp(&b.rev_id))
        });
        if let Some(limit) = limit {
            revisions.truncate(limit);
        }
        Ok(revisions)
    }

    fn changed_paths(
        &self,
        base: Option<&str>,
        target: Option<&str>,
    ) -> Result<Vec<String>, VcsError> {
        let repo = self.local();
        let old = self.side(&repo, Some(base.unwrap_or("HEAD")))?;
        let new = self.side(&repo, target)?;
        differing_paths(&repo, &old, &new)
    }

    fn list_files(&self, rev: Option<&str>) -> Result<Vec<SourceFile>, VcsError> {
        let repo = self.local();
        let side = self.side(&repo, rev)?;
        let mut files = Vec::new();
        for path in side.paths() {
            let bytes = side.bytes(&repo, path)?.unwrap_or_default();
            files.push(SourceFile {
                path: path.to_string(),
                lang: thoth_parser::detect_language(path).map(str::to_string),
                content: worktree::decode(bytes),
            });
        }
        Ok(files)
    }
}
