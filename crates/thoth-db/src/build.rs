//! Full index rebuild.

use thoth_core::entities::SymbolSelector;
use thoth_core::views::BuildReport;
use thoth_manifest::ManifestModel;
use thoth_touch::Snapshot;

use crate::GraphIndex;
use crate::error::IndexError;
use crate::helpers::to_json;

pub(crate) const META_REV: &str = "rev";
pub(crate) const META_DIGEST: &str = "manifest_digest";

/// Replaced by every build, children before parents.
const DERIVED_TABLES: &[&str] = &[
    "binding_path",
    "binding_symbol",
    "binding_region",
    "resource_invariant",
    "resource_adr",
    "resource_check",
    "edge",
    "region",
    "symbol",
    "resource",
    "invariant",
    "adr",
    "check_def",
    "build_meta",
];

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl GraphIndex {
    /// Replace the whole index with `model` plus the structural facts of
    /// `snapshot`, taken at `rev`.
    ///
    /// All writes happen in one transaction. On failure it is rolled back and
    /// readers keep seeing the previous build.
    ///
    /// # Errors
    ///
    /// [`IndexError::BuildInProgress`] when another build holds the writer,
    /// [`IndexError::Build`] when any write fails.
    pub async fn build(
        &self,
        model: &ManifestModel,
        snapshot: &Snapshot,
        rev: &str,
    ) -> Result<BuildReport, IndexError> {
        let _writer = self
            .writer
            .try_lock()
            .map_err(|_| IndexError::BuildInProgress)?;

        let conn = self.connect().await?;
        let tx = conn.transaction().await?;
        if let Err(e) = write_all(&tx, model, snapshot, rev).await {
            tx.rollback().await?;
            tracing::warn!(rev, error = %e, "index build rolled back");
            return Err(IndexError::Build(e.to_string()));
        }
        tx.commit().await?;

        let report = BuildReport {
            rev: rev.to_string(),
            resources: count(model.resources().count()),
            edges: count(model.edges().len()),
            regions: count(snapshot.regions.len()),
            symbols: count(snapshot.symbols.len()),
            files_scanned: count(snapshot.files_scanned),
            degraded: snapshot.degraded.clone(),
        };
        tracing::info!(
            rev,
            resources = report.resources,
            regions = report.regions,
            symbols = report.symbols,
            degraded = report.degraded.len(),
            "index built"
        );
        Ok(report)
    }
}

async fn write_all(
    conn: &libsql::Connection,
    model: &ManifestModel,
    snapshot: &Snapshot,
    rev: &str,
) -> Result<(), IndexError> {
    for table in DERIVED_TABLES {
        conn.execute(&format!("DELETE FROM {table}"), ()).await?;
    }

    for inv in model.invariants() {
        conn.execute(
            "INSERT INTO invariant (invariant_id, statement, scope, verify, doc_path)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            libsql::params![
                inv.id.as_str(),
                inv.statement.as_str(),
                inv.scope.as_deref(),
                to_json(&inv.verify)?,
                inv.doc_path.as_deref()
            ],
        )
        .await?;
    }

    for adr in model.adrs() {
        conn.execute(
            "INSERT INTO adr (adr_id, capsule, capsule_path, full_path) VALUES (?1, ?2, ?3, ?4)",
            libsql::params![
                adr.id.as_str(),
                adr.capsule.as_str(),
                adr.capsule_path.as_deref(),
                adr.full_path.as_deref()
            ],
        )
        .await?;
    }

    for check in model.checks() {
        conn.execute(
            "INSERT INTO check_def (check_id, cmd, timeout_seconds, cacheable) VALUES (?1, ?2, ?3, ?4)",
            libsql::params![
                check.id.as_str(),
                check.cmd.as_str(),
                i64::try_from(check.timeout_seconds).unwrap_or(i64::MAX),
                i64::from(check.cacheable)
            ],
        )
        .await?;
    }

    for r in model.resources() {
        let (lease_mode, lease_ttl) = match r.lease {
            Some(lease) => (
                Some(lease.mode.as_str()),
                lease.ttl_seconds.map(|t| i64::try_from(t).unwrap_or(i64::MAX)),
            ),
            None => (None, None),
        };
        conn.execute(
            "INSERT INTO resource
             (resource_id, description, severity, owners, tags, deps, lease_mode, lease_ttl_seconds)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            libsql::params![
                r.id.as_str(),
                r.description.as_str(),
                r.severity.as_str(),
                to_json(&r.owners)?,
                to_json(&r.tags)?,
                to_json(&r.deps)?,
                lease_mode,
                lease_ttl
            ],
        )
        .await?;

        for (position, check_id) in (0_i64..).zip(&r.checks) {
            conn.execute(
                "INSERT OR IGNORE INTO resource_check (resource_id, check_id, position) VALUES (?1, ?2, ?3)",
                libsql::params![r.id.as_str(), check_id.as_str(), position],
            )
            .await?;
        }
        for (position, invariant_id) in (0_i64..).zip(&r.invariants) {
            conn.execute(
                "INSERT OR IGNORE INTO resource_invariant (resource_id, invariant_id, position) VALUES (?1, ?2, ?3)",
                libsql::params![r.id.as_str(), invariant_id.as_str(), position],
            )
            .await?;
        }
        for (position, adr_id) in (0_i64..).zip(&r.adrs) {
            conn.execute(
                "INSERT OR IGNORE INTO resource_adr (resource_id, adr_id, position) VALUES (?1, ?2, ?3)",
                libsql::params![r.id.as_str(), adr_id.as_str(), position],
            )
            .await?;
        }
    }

    for b in model.path_bindings() {
        conn.execute(
            "INSERT OR IGNORE INTO binding_path (resource_id, glob) VALUES (?1, ?2)",
            libsql::params![b.resource_id.as_str(), b.glob.as_str()],
        )
        .await?;
    }

    for (position, b) in (0_i64..).zip(model.symbol_bindings()) {
        let (fqname, pattern, query) = match &b.selector {
            SymbolSelector::Fqname(v) => (Some(v.as_str()), None, None),
            SymbolSelector::Pattern(v) => (None, Some(v.as_str()), None),
            SymbolSelector::Query(v) => (None, None, Some(v.as_str())),
        };
        conn.execute(
            "INSERT INTO binding_symbol (resource_id, position, lang, kind, fqname, pattern, query)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            libsql::params![
                b.resource_id.as_str(),
                position,
                b.lang.as_str(),
                b.kind.map(|k| k.as_str()),
                fqname,
                pattern,
                query
            ],
        )
        .await?;
    }

    for b in model.region_bindings() {
        conn.execute(
            "INSERT INTO binding_region (region_id, resource_id) VALUES (?1, ?2)",
            libsql::params![b.region_id.as_str(), b.resource_id.as_str()],
        )
        .await?;
    }

    for e in model.edges() {
        conn.execute(
            "INSERT OR IGNORE INTO edge (src, dst, edge_type) VALUES (?1, ?2, ?3)",
            libsql::params![e.src.as_str(), e.dst.as_str(), e.edge_type.as_str()],
        )
        .await?;
    }

    for region in &snapshot.regions {
        conn.execute(
            "INSERT INTO region (region_id, resource_id, file_path, start_line, end_line)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            libsql::params![
                region.region_id.as_str(),
                region.resource_id.as_str(),
                region.file_path.as_str(),
                i64::from(region.start_line),
                i64::from(region.end_line)
            ],
        )
        .await?;
        conn.execute(
            "INSERT OR REPLACE INTO region_snapshot (region_id, rev_id, content_hash, canonical_len)
             VALUES (?1, ?2, ?3, ?4)",
            libsql::params![
                region.region_id.as_str(),
                rev,
                region.canonical_hash.as_str(),
                i64::try_from(region.canonical_len).unwrap_or(i64::MAX)
            ],
        )
        .await?;
    }

    for (id, s) in (1_i64..).zip(&snapshot.symbols) {
        conn.execute(
            "INSERT INTO symbol
             (id, fqname, name, lang, kind, scope, file_path, start_line, end_line, signature_text, body_hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            libsql::params![
                id,
                s.fqname.as_str(),
                s.name.as_str(),
                s.lang.as_str(),
                s.kind.as_str(),
                to_json(&s.scope)?,
                s.file_path.as_str(),
                i64::from(s.start_line),
                i64::from(s.end_line),
                s.signature_text.as_str(),
                s.body_hash.as_str()
            ],
        )
        .await?;
    }

    for (key, value) in [(META_REV, rev), (META_DIGEST, model.digest())] {
        conn.execute(
            "INSERT INTO build_meta (key, value) VALUES (?1, ?2)",
            libsql::params![key, value],
        )
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn concurrent_build_fails_fast() {
        let dir = tempfile::TempDir::new().unwrap();
        let index = GraphIndex::open(&dir.path().join("index.db")).await.unwrap();
        let model = ManifestModel::from_toml_str("[[resources]]\nid = \"wal\"\n").unwrap();

        let held = index.writer.lock().await;
        let err = index
            .build(&model, &Snapshot::default(), "rev-1")
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::BuildInProgress));

        drop(held);
        index.build(&model, &Snapshot::default(), "rev-1").await.unwrap();
        assert_eq!(index.indexed_rev().await.unwrap(), "rev-1");
    }
}
