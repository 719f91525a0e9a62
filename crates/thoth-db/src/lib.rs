//! # thoth-db
//!
//! The persisted architecture graph: resources, bindings, invariants, ADR
//! capsules, checks, edges, regions, symbols and revision history in a local
//! libSQL database.
//!
//! [`GraphIndex::build`] replaces every declaration and structure table in one
//! transaction; [`GraphIndex::record_touch`] appends revision linkage. Each
//! read runs inside one read transaction over a WAL database and therefore
//! sees either the previous or the next committed build, never a mix.

pub mod error;
pub mod helpers;
mod build;
mod find;
mod history;
mod migrations;
mod read;
mod walk;

use std::path::{Path, PathBuf};

use error::IndexError;
use libsql::Builder;

pub use find::FindOptions;
pub use history::HistoryFilter;
pub use read::MapFilter;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Handle to the graph index database.
pub struct GraphIndex {
    db: libsql::Database,
    path: PathBuf,
    /// Single writer: builds fail fast on it, touch records wait.
    writer: tokio::sync::Mutex<()>,
    busy_timeout_ms: u64,
}

impl std::fmt::Debug for GraphIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphIndex")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl GraphIndex {
    /// Open (creating if needed) the index at `path`.
    ///
    /// Switches the database to WAL mode and runs migrations.
    ///
    /// # Errors
    ///
    /// Returns `IndexError` if the database cannot be opened or migrations
    /// fail.
    pub async fn open(path: &Path) -> Result<Self, IndexError> {
        let db = Builder::new_local(path).build().await?;
        let index = Self {
            db,
            path: path.to_path_buf(),
            writer: tokio::sync::Mutex::new(()),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        };

        let conn = index.db.connect()?;
        let mut rows = conn
            .query("PRAGMA journal_mode = WAL", ())
            .await
            .map_err(|e| IndexError::Migration(format!("PRAGMA journal_mode: {e}")))?;
        while rows.next().await?.is_some() {}
        index.run_migrations(&conn).await?;

        tracing::debug!(path = %path.display(), "opened graph index");
        Ok(index)
    }

    /// How long a connection waits on a locked database before failing.
    #[must_use]
    pub fn with_busy_timeout(mut self, millis: u64) -> Self {
        self.busy_timeout_ms = millis;
        self
    }

    /// Location of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A fresh connection with foreign keys and a busy timeout.
    pub(crate) async fn connect(&self) -> Result<libsql::Connection, IndexError> {
        let conn = self.db.connect()?;
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| IndexError::Query(format!("PRAGMA foreign_keys: {e}")))?;
        let mut rows = conn
            .query(&format!("PRAGMA busy_timeout = {}", self.busy_timeout_ms), ())
            .await
            .map_err(|e| IndexError::Query(format!("PRAGMA busy_timeout: {e}")))?;
        while rows.next().await?.is_some() {}
        Ok(conn)
    }

    /// A deferred read transaction; every query through it sees the same
    /// committed state.
    pub(crate) async fn read_snapshot(&self) -> Result<libsql::Transaction, IndexError> {
        let conn = self.connect().await?;
        Ok(conn
            .transaction_with_behavior(libsql::TransactionBehavior::Deferred)
            .await?)
    }

    /// Value stored in `build_meta`, e.g. `rev` or `manifest_digest`.
    ///
    /// # Errors
    ///
    /// Returns `IndexError` if the lookup fails.
    pub async fn meta(&self, key: &str) -> Result<Option<String>, IndexError> {
        let conn = self.connect().await?;
        let mut rows = conn
            .query("SELECT value FROM build_meta WHERE key = ?1", [key])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<String>(0)?)),
            None => Ok(None),
        }
    }

    /// Revision of the last successful build.
    ///
    /// # Errors
    ///
    /// [`IndexError::NotBuilt`] when no build has completed yet.
    pub async fn indexed_rev(&self) -> Result<String, IndexError> {
        self.meta(build::META_REV).await?.ok_or(IndexError::NotBuilt)
    }
}
