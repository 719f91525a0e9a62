//! Direct lookups: map, show, symbols.

use std::collections::{BTreeMap, BTreeSet};

use thoth_core::entities::{
    AdrCapsule, CheckDef, Edge, Invariant, LeaseSpec, Region, Resource, Symbol, SymbolBinding,
    SymbolSelector,
};
use thoth_core::enums::Severity;
use thoth_core::views::{MapView, ResourceDetail};
use thoth_manifest::glob::globs_intersect;

use crate::GraphIndex;
use crate::error::IndexError;
use crate::helpers::{from_json, get_opt_string, get_u32, parse_enum};

/// Filter for [`GraphIndex::map`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapFilter {
    pub tag: Option<String>,
    pub severity: Option<Severity>,
    /// Glob that must intersect one of the resource's path bindings.
    pub path: Option<String>,
}

/// All resources keyed by id, with their link lists in declared order.
pub(crate) async fn load_resources(
    conn: &libsql::Connection,
) -> Result<BTreeMap<String, Resource>, IndexError> {
    let mut resources = BTreeMap::new();
    let mut rows = conn
        .query(
            "SELECT resource_id, description, severity, owners, tags, deps, lease_mode, lease_ttl_seconds
             FROM resource ORDER BY resource_id",
            (),
        )
        .await?;
    while let Some(row) = rows.next().await? {
        let lease = match get_opt_string(&row, 6)? {
            Some(mode) => Some(LeaseSpec {
                mode: parse_enum(&mode)?,
                ttl_seconds: row
                    .get::<Option<i64>>(7)?
                    .and_then(|t| u64::try_from(t).ok()),
            }),
            None => None,
        };
        let id = row.get::<String>(0)?;
        resources.insert(
            id.clone(),
            Resource {
                id,
                description: row.get::<String>(1)?,
                severity: parse_enum(&row.get::<String>(2)?)?,
                owners: from_json(&row.get::<String>(3)?)?,
                tags: from_json(&row.get::<String>(4)?)?,
                deps: from_json(&row.get::<String>(5)?)?,
                checks: Vec::new(),
                invariants: Vec::new(),
                adrs: Vec::new(),
                lease,
            },
        );
    }

    for (table, column) in [
        ("resource_check", "check_id"),
        ("resource_invariant", "invariant_id"),
        ("resource_adr", "adr_id"),
    ] {
        let mut rows = conn
            .query(
                &format!("SELECT resource_id, {column} FROM {table} ORDER BY resource_id, position"),
                (),
            )
            .await?;
        while let Some(row) = rows.next().await? {
            let Some(resource) = resources.get_mut(&row.get::<String>(0)?) else {
                continue;
            };
            let value = row.get::<String>(1)?;
            match table {
                "resource_check" => resource.checks.push(value),
                "resource_invariant" => resource.invariants.push(value),
                _ => resource.adrs.push(value),
            }
        }
    }
    Ok(resources)
}

/// Edges ordered by `(src, dst, edge_type)`.
pub(crate) async fn load_edges(conn: &libsql::Connection) -> Result<Vec<Edge>, IndexError> {
    let mut rows = conn
        .query(
            "SELECT src, dst, edge_type FROM edge ORDER BY src, dst, edge_type",
            (),
        )
        .await?;
    let mut edges = Vec::new();
    while let Some(row) = rows.next().await? {
        edges.push(Edge {
            src: row.get::<String>(0)?,
            dst: row.get::<String>(1)?,
            edge_type: row.get::<String>(2)?,
        });
    }
    Ok(edges)
}

/// `(resource_id, glob)` in declared order.
pub(crate) async fn load_path_bindings(
    conn: &libsql::Connection,
) -> Result<Vec<(String, String)>, IndexError> {
    let mut rows = conn
        .query("SELECT resource_id, glob FROM binding_path ORDER BY rowid", ())
        .await?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push((row.get::<String>(0)?, row.get::<String>(1)?));
    }
    Ok(out)
}

pub(crate) async fn load_symbol_bindings(
    conn: &libsql::Connection,
    resource_id: Option<&str>,
) -> Result<Vec<SymbolBinding>, IndexError> {
    let mut rows = conn
        .query(
            "SELECT resource_id, lang, kind, fqname, pattern, query FROM binding_symbol
             WHERE ?1 IS NULL OR resource_id = ?1
             ORDER BY resource_id, position",
            libsql::params![resource_id],
        )
        .await?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        let selector = match (
            get_opt_string(&row, 3)?,
            get_opt_string(&row, 4)?,
            get_opt_string(&row, 5)?,
        ) {
            (Some(v), _, _) => SymbolSelector::Fqname(v),
            (_, Some(v), _) => SymbolSelector::Pattern(v),
            (_, _, Some(v)) => SymbolSelector::Query(v),
            _ => return Err(IndexError::Query("symbol binding without selector".into())),
        };
        out.push(SymbolBinding {
            resource_id: row.get::<String>(0)?,
            lang: row.get::<String>(1)?,
            kind: get_opt_string(&row, 2)?.map(|k| parse_enum(&k)).transpose()?,
            selector,
        });
    }
    Ok(out)
}

/// `(resource_id, region_id)` ordered by region id.
pub(crate) async fn load_region_bindings(
    conn: &libsql::Connection,
) -> Result<Vec<(String, String)>, IndexError> {
    let mut rows = conn
        .query(
            "SELECT resource_id, region_id FROM binding_region ORDER BY region_id",
            (),
        )
        .await?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push((row.get::<String>(0)?, row.get::<String>(1)?));
    }
    Ok(out)
}

fn row_to_symbol(row: &libsql::Row) -> Result<Symbol, IndexError> {
    Ok(Symbol {
        fqname: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        lang: row.get::<String>(2)?,
        kind: parse_enum(&row.get::<String>(3)?)?,
        scope: from_json(&row.get::<String>(4)?)?,
        file_path: row.get::<String>(5)?,
        start_line: get_u32(row, 6)?,
        end_line: get_u32(row, 7)?,
        signature_text: row.get::<String>(8)?,
        body_hash: row.get::<String>(9)?,
        query: None,
    })
}

impl GraphIndex {
    /// Resources matching `filter` plus every edge leaving them.
    ///
    /// Reads only declaration tables; no file content is touched.
    ///
    /// # Errors
    ///
    /// Returns `IndexError` if a query fails.
    pub async fn map(&self, filter: &MapFilter) -> Result<MapView, IndexError> {
        let conn = self.read_snapshot().await?;
        let resources = load_resources(&conn).await?;

        let path_owners: BTreeSet<String> = match &filter.path {
            Some(glob) => load_path_bindings(&conn)
                .await?
                .into_iter()
                .filter(|(_, bound)| globs_intersect(bound, glob))
                .map(|(id, _)| id)
                .collect(),
            None => BTreeSet::new(),
        };

        let selected: Vec<Resource> = resources
            .into_values()
            .filter(|r| filter.tag.as_ref().is_none_or(|t| r.tags.contains(t)))
            .filter(|r| filter.severity.is_none_or(|s| r.severity == s))
            .filter(|r| filter.path.is_none() || path_owners.contains(&r.id))
            .collect();
        let ids: BTreeSet<&str> = selected.iter().map(|r| r.id.as_str()).collect();
        let edges = load_edges(&conn)
            .await?
            .into_iter()
            .filter(|e| ids.contains(e.src.as_str()))
            .collect();

        Ok(MapView {
            resources: selected,
            edges,
        })
    }

    /// Everything the index knows about one resource.
    ///
    /// # Errors
    ///
    /// [`IndexError::UnknownResource`] when no such resource is indexed.
    pub async fn show(&self, resource_id: &str) -> Result<ResourceDetail, IndexError> {
        let conn = self.read_snapshot().await?;
        let mut resources = load_resources(&conn).await?;
        let resource = resources
            .remove(resource_id)
            .ok_or_else(|| IndexError::UnknownResource(resource_id.to_string()))?;

        let paths = load_path_bindings(&conn)
            .await?
            .into_iter()
            .filter(|(id, _)| id == resource_id)
            .map(|(_, glob)| glob)
            .collect();
        let symbols = load_symbol_bindings(&conn, Some(resource_id)).await?;
        let region_bindings = load_region_bindings(&conn)
            .await?
            .into_iter()
            .filter(|(id, _)| id == resource_id)
            .map(|(_, region)| region)
            .collect();

        let mut regions = Vec::new();
        let mut rows = conn
            .query(
                "SELECT r.region_id, r.resource_id, r.file_path, r.start_line, r.end_line,
                        s.content_hash, s.canonical_len
                 FROM region r
                 JOIN binding_region b ON b.region_id = r.region_id
                 LEFT JOIN region_snapshot s ON s.region_id = r.region_id
                      AND s.rev_id = (SELECT value FROM build_meta WHERE key = 'rev')
                 WHERE b.resource_id = ?1
                 ORDER BY r.file_path, r.start_line",
                [resource_id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            regions.push(Region {
                region_id: row.get::<String>(0)?,
                resource_id: row.get::<String>(1)?,
                file_path: row.get::<String>(2)?,
                start_line: get_u32(&row, 3)?,
                end_line: get_u32(&row, 4)?,
                canonical_hash: get_opt_string(&row, 5)?.unwrap_or_default(),
                canonical_len: row
                    .get::<Option<i64>>(6)?
                    .and_then(|n| u64::try_from(n).ok())
                    .unwrap_or_default(),
            });
        }

        let mut invariants = Vec::new();
        let mut rows = conn
            .query(
                "SELECT i.invariant_id, i.statement, i.scope, i.verify, i.doc_path
                 FROM invariant i JOIN resource_invariant ri ON ri.invariant_id = i.invariant_id
                 WHERE ri.resource_id = ?1 ORDER BY ri.position",
                [resource_id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            invariants.push(Invariant {
                id: row.get::<String>(0)?,
                statement: row.get::<String>(1)?,
                scope: get_opt_string(&row, 2)?,
                verify: from_json(&row.get::<String>(3)?)?,
                doc_path: get_opt_string(&row, 4)?,
            });
        }

        let mut adrs = Vec::new();
        let mut rows = conn
            .query(
                "SELECT a.adr_id, a.capsule, a.capsule_path, a.full_path
                 FROM adr a JOIN resource_adr ra ON ra.adr_id = a.adr_id
                 WHERE ra.resource_id = ?1 ORDER BY ra.position",
                [resource_id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            adrs.push(AdrCapsule {
                id: row.get::<String>(0)?,
                capsule: row.get::<String>(1)?,
                capsule_path: get_opt_string(&row, 2)?,
                full_path: get_opt_string(&row, 3)?,
            });
        }

        let mut checks = Vec::new();
        let mut rows = conn
            .query(
                "SELECT c.check_id, c.cmd, c.timeout_seconds, c.cacheable
                 FROM check_def c JOIN resource_check rc ON rc.check_id = c.check_id
                 WHERE rc.resource_id = ?1 ORDER BY rc.position",
                [resource_id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            checks.push(CheckDef {
                id: row.get::<String>(0)?,
                cmd: row.get::<String>(1)?,
                timeout_seconds: u64::try_from(row.get::<i64>(2)?).unwrap_or_default(),
                cacheable: row.get::<i64>(3)? != 0,
            });
        }

        let dependents = resources
            .values()
            .filter(|r| r.deps.iter().any(|d| d == resource_id))
            .map(|r| r.id.clone())
            .collect();

        Ok(ResourceDetail {
            resource,
            paths,
            symbols,
            region_bindings,
            regions,
            invariants,
            adrs,
            checks,
            dependents,
        })
    }

    /// Indexed symbols, optionally narrowed by language and path prefix,
    /// ordered by `(file_path, start_line, fqname)`.
    ///
    /// # Errors
    ///
    /// Returns `IndexError` if the query fails.
    pub async fn symbols(
        &self,
        lang: Option<&str>,
        path_prefix: Option<&str>,
    ) -> Result<Vec<Symbol>, IndexError> {
        let conn = self.connect().await?;
        let mut rows = conn
            .query(
                "SELECT fqname, name, lang, kind, scope, file_path, start_line, end_line,
                        signature_text, body_hash
                 FROM symbol
                 WHERE (?1 IS NULL OR lang = ?1)
                   AND (?2 IS NULL OR substr(file_path, 1, length(?2)) = ?2)
                 ORDER BY file_path, start_line, fqname",
                libsql::params![lang, path_prefix],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_symbol(&row)?);
        }
        Ok(out)
    }
}
