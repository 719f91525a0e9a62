//! Embedded schema migrations. Every statement is `IF NOT EXISTS`, so the
//! runner is safe to repeat on each open.

use crate::GraphIndex;
use crate::error::IndexError;

const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");

impl GraphIndex {
    pub(crate) async fn run_migrations(&self, conn: &libsql::Connection) -> Result<(), IndexError> {
        conn.execute_batch(MIGRATION_001)
            .await
            .map_err(|e| IndexError::Migration(format!("001_initial: {e}")))?;
        Ok(())
    }
}
