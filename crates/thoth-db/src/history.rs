//! Revision linkage: which revisions touched which resources.

use chrono::{DateTime, Utc};
use thoth_core::entities::{RevisionInfo, TouchResult};

use crate::GraphIndex;
use crate::error::IndexError;
use crate::helpers::{format_datetime, parse_datetime, to_json};

/// Filter for [`GraphIndex::history`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// Only revisions committed at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Only these revision ids, when set.
    pub revs: Option<Vec<String>>,
    pub limit: Option<usize>,
}

impl GraphIndex {
    /// Record that `revision` touched every resource in `result`.
    ///
    /// Re-recording a revision replaces its reasons. Waits for any build in
    /// flight.
    ///
    /// # Errors
    ///
    /// Returns `IndexError` if a write fails; nothing is recorded then.
    pub async fn record_touch(
        &self,
        result: &TouchResult,
        revision: &RevisionInfo,
    ) -> Result<usize, IndexError> {
        let _writer = self.writer.lock().await;
        let conn = self.connect().await?;
        let tx = conn.transaction().await?;
        if let Err(e) = write_touch(&tx, result, revision).await {
            tx.rollback().await?;
            return Err(e);
        }
        tx.commit().await?;
        tracing::debug!(
            rev = %revision.rev_id,
            resources = result.touched.len(),
            "recorded touch"
        );
        Ok(result.touched.len())
    }

    /// Revisions that touched `resource_id`, newest first.
    ///
    /// # Errors
    ///
    /// [`IndexError::UnknownResource`] when the resource is neither indexed
    /// nor present in any recorded revision.
    pub async fn history(
        &self,
        resource_id: &str,
        filter: &HistoryFilter,
    ) -> Result<Vec<RevisionInfo>, IndexError> {
        let conn = self.read_snapshot().await?;
        let since = filter.since.as_ref().map(format_datetime);
        let mut rows = conn
            .query(
                "SELECT r.rev_id, r.committed_at, r.summary
                 FROM resource_revision rr JOIN revision r ON r.rev_id = rr.rev_id
                 WHERE rr.resource_id = ?1 AND (?2 IS NULL OR r.committed_at >= ?2)
                 ORDER BY r.committed_at DESC, r.rev_id",
                libsql::params![resource_id, since.as_deref()],
            )
            .await?;

        let mut revisions = Vec::new();
        while let Some(row) = rows.next().await? {
            let rev_id = row.get::<String>(0)?;
            if filter
                .revs
                .as_ref()
                .is_some_and(|revs| !revs.contains(&rev_id))
            {
                continue;
            }
            revisions.push(RevisionInfo {
                rev_id,
                committed_at: parse_datetime(&row.get::<String>(1)?)?,
                summary: row.get::<String>(2)?,
            });
        }

        if revisions.is_empty() && !is_known(&conn, resource_id).await? {
            return Err(IndexError::UnknownResource(resource_id.to_string()));
        }
        if let Some(limit) = filter.limit {
            revisions.truncate(limit);
        }
        Ok(revisions)
    }
}

async fn is_known(conn: &libsql::Connection, resource_id: &str) -> Result<bool, IndexError> {
    let mut rows = conn
        .query(
            "SELECT 1 FROM resource WHERE resource_id = ?1
             UNION SELECT 1 FROM resource_revision WHERE resource_id = ?1",
            [resource_id],
        )
        .await?;
    Ok(rows.next().await?.is_some())
}

async fn write_touch(
    conn: &libsql::Connection,
    result: &TouchResult,
    revision: &RevisionInfo,
) -> Result<(), IndexError> {
    conn.execute(
        "INSERT INTO revision (rev_id, committed_at, summary) VALUES (?1, ?2, ?3)
         ON CONFLICT(rev_id) DO UPDATE SET committed_at = excluded.committed_at,
                                           summary = excluded.summary",
        libsql::params![
            revision.rev_id.as_str(),
            format_datetime(&revision.committed_at),
            revision.summary.as_str()
        ],
    )
    .await?;
    for touched in &result.touched {
        conn.execute(
            "INSERT OR REPLACE INTO resource_revision (resource_id, rev_id, reasons)
             VALUES (?1, ?2, ?3)",
            libsql::params![
                touched.resource_id.as_str(),
                revision.rev_id.as_str(),
                to_json(&touched.reasons)?
            ],
        )
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use thoth_core::entities::{TouchReason, TouchedResource};
    use thoth_core::enums::Severity;
    use thoth_manifest::ManifestModel;
    use thoth_touch::Snapshot;

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn record_touch_waits_for_the_writer() {
        let dir = tempfile::TempDir::new().unwrap();
        let index = Arc::new(GraphIndex::open(&dir.path().join("index.db")).await.unwrap());
        let model = ManifestModel::from_toml_str("[[resources]]\nid = \"wal\"\n").unwrap();
        index.build(&model, &Snapshot::default(), "rev-1").await.unwrap();

        let result = TouchResult {
            touched: vec![TouchedResource {
                resource_id: "wal".to_string(),
                severity: Severity::Gated,
                reasons: vec![TouchReason::path("pkg/storage/wal/flush.go")],
                required_checks: vec![],
                lease: None,
            }],
            ..TouchResult::default()
        };
        let revision = RevisionInfo {
            rev_id: "c1".to_string(),
            committed_at: "2026-03-01T10:00:00Z".parse().unwrap(),
            summary: "flush".to_string(),
        };

        let held = index.writer.lock().await;
        let pending = {
            let index = Arc::clone(&index);
            tokio::spawn(async move { index.record_touch(&result, &revision).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!pending.is_finished());

        drop(held);
        assert_eq!(pending.await.unwrap().unwrap(), 1);
        let history = index.history("wal", &HistoryFilter::default()).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].rev_id, "c1");
    }
}
