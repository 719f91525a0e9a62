//! Ranked resource search.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use thoth_core::entities::{Resource, SymbolSelector};
use thoth_core::views::{FindHit, FindTier};
use thoth_manifest::glob::compile_glob;

use crate::GraphIndex;
use crate::error::IndexError;
use crate::read::{load_path_bindings, load_region_bindings, load_resources, load_symbol_bindings};

/// Options for [`GraphIndex::find`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Treat the handle as a case-insensitive regular expression for the
    /// text tier instead of a substring.
    pub regex: bool,
    pub limit: Option<usize>,
}

/// The search term inside a handle: `kw:` and surrounding quotes removed.
fn search_term(handle: &str) -> &str {
    let term = handle.trim();
    let term = term.strip_prefix("kw:").unwrap_or(term).trim();
    term.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(term)
}

enum TextMatcher {
    Substring(String),
    Pattern(Regex),
}

impl TextMatcher {
    fn new(term: &str, regex: bool) -> Result<Self, IndexError> {
        if regex {
            Ok(Self::Pattern(
                RegexBuilder::new(term).case_insensitive(true).build()?,
            ))
        } else {
            Ok(Self::Substring(term.to_lowercase()))
        }
    }

    fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Substring(needle) => text.to_lowercase().contains(needle),
            Self::Pattern(re) => re.is_match(text),
        }
    }
}

/// Best match per resource; earlier tiers replace later ones.
#[derive(Default)]
struct Candidates(BTreeMap<String, (FindTier, String)>);

impl Candidates {
    fn offer(&mut self, resource_id: &str, tier: FindTier, matched: String) {
        match self.0.get(resource_id) {
            Some((best, _)) if *best <= tier => {}
            _ => {
                self.0.insert(resource_id.to_string(), (tier, matched));
            }
        }
    }
}

impl GraphIndex {
    /// Search resources by `handle`.
    ///
    /// Tiers, best first: exact id, tag, binding (path glob, symbol fqname or
    /// pattern, region id), then text over description, linked invariant
    /// statements and ADR capsules. Hits sort by `(tier, severity rank, id)`.
    ///
    /// # Errors
    ///
    /// [`IndexError::Pattern`] for an invalid regex in regex mode.
    pub async fn find(
        &self,
        handle: &str,
        options: FindOptions,
    ) -> Result<Vec<FindHit>, IndexError> {
        let term = search_term(handle);
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let matcher = TextMatcher::new(term, options.regex)?;
        let lowered = term.to_lowercase();

        let conn = self.read_snapshot().await?;
        let resources = load_resources(&conn).await?;
        let mut candidates = Candidates::default();

        for r in resources.values() {
            if r.id == term {
                candidates.offer(&r.id, FindTier::ExactId, "id".to_string());
            }
            if let Some(tag) = r.tags.iter().find(|t| t.to_lowercase() == lowered) {
                candidates.offer(&r.id, FindTier::Tag, format!("tag:{tag}"));
            }
        }

        for (resource_id, glob) in load_path_bindings(&conn).await? {
            let hit = glob == term || compile_glob(&glob).is_ok_and(|m| m.is_match(term));
            if hit {
                candidates.offer(&resource_id, FindTier::Binding, format!("path:{glob}"));
            }
        }
        for binding in load_symbol_bindings(&conn, None).await? {
            let hit = match &binding.selector {
                SymbolSelector::Fqname(fq) => fq == term,
                SymbolSelector::Pattern(p) => Regex::new(p).is_ok_and(|re| re.is_match(term)),
                SymbolSelector::Query(_) => false,
            };
            if hit {
                candidates.offer(
                    &binding.resource_id,
                    FindTier::Binding,
                    format!("symbol:{}", binding.selector.value()),
                );
            }
        }
        for (resource_id, region_id) in load_region_bindings(&conn).await? {
            if region_id == term {
                candidates.offer(&resource_id, FindTier::Binding, format!("region:{region_id}"));
            }
        }

        let statements = linked_texts(
            &conn,
            "SELECT ri.resource_id, i.invariant_id, i.statement
             FROM resource_invariant ri JOIN invariant i ON i.invariant_id = ri.invariant_id
             ORDER BY ri.resource_id, ri.position",
        )
        .await?;
        let capsules = linked_texts(
            &conn,
            "SELECT ra.resource_id, a.adr_id, a.capsule
             FROM resource_adr ra JOIN adr a ON a.adr_id = ra.adr_id
             ORDER BY ra.resource_id, ra.position",
        )
        .await?;
        for r in resources.values() {
            if let Some(matched) = text_match(r, &matcher, &statements, &capsules) {
                candidates.offer(&r.id, FindTier::Text, matched);
            }
        }

        let mut hits: Vec<FindHit> = candidates
            .0
            .into_iter()
            .filter_map(|(id, (tier, matched))| {
                resources.get(&id).map(|r| FindHit {
                    resource_id: id,
                    severity: r.severity,
                    tier,
                    matched,
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            a.tier
                .cmp(&b.tier)
                .then_with(|| a.severity.rank().cmp(&b.severity.rank()))
                .then_with(|| a.resource_id.cmp(&b.resource_id))
        });
        if let Some(limit) = options.limit {
            hits.truncate(limit);
        }
        tracing::debug!(term, hits = hits.len(), "find");
        Ok(hits)
    }
}

type LinkedTexts = BTreeMap<String, Vec<(String, String)>>;

/// `(linked id, text)` per resource, in declared link order.
async fn linked_texts(conn: &libsql::Connection, sql: &str) -> Result<LinkedTexts, IndexError> {
    let mut out: LinkedTexts = BTreeMap::new();
    let mut rows = conn.query(sql, ()).await?;
    while let Some(row) = rows.next().await? {
        out.entry(row.get::<String>(0)?)
            .or_default()
            .push((row.get::<String>(1)?, row.get::<String>(2)?));
    }
    Ok(out)
}

fn text_match(
    r: &Resource,
    matcher: &TextMatcher,
    statements: &LinkedTexts,
    capsules: &LinkedTexts,
) -> Option<String> {
    if matcher.is_match(&r.description) {
        return Some("description".to_string());
    }
    let first = |texts: &LinkedTexts, label: &str| {
        texts
            .get(&r.id)
            .into_iter()
            .flatten()
            .find(|(_, text)| matcher.is_match(text))
            .map(|(id, _)| format!("{label}:{id}"))
    };
    first(statements, "invariant").or_else(|| first(capsules, "adr"))
}
