//! Add/remove/modify/rename diff between two symbol tables.
//!
//! Symbols are keyed by `(query, fqname)`. A removed/added pair with the
//! same language, kind, scope and query whose signatures are similar enough
//! (names masked) is reported as a rename instead.

use std::collections::{BTreeMap, BTreeSet};

use similar::TextDiff;
use thoth_core::entities::Symbol;
use thoth_core::enums::ModifiedPart;

/// Default minimum signature similarity for a rename.
pub const DEFAULT_RENAME_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifiedSymbol {
    pub old: Symbol,
    pub new: Symbol,
    pub part: ModifiedPart,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenamedSymbol {
    pub from: Symbol,
    pub to: Symbol,
    /// Signature similarity in `[0, 1]`.
    pub similarity: f32,
}

/// Each list is ordered by `(file_path, start_line, fqname)` of the symbol as
/// it appears in the newer table (the older one for `removed`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolDiff {
    pub added: Vec<Symbol>,
    pub removed: Vec<Symbol>,
    pub modified: Vec<ModifiedSymbol>,
    pub renamed: Vec<RenamedSymbol>,
}

impl SymbolDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.modified.is_empty()
            && self.renamed.is_empty()
    }
}

/// Computes symbol diffs with a fixed rename threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolDiffer {
    rename_threshold: f64,
}

impl Default for SymbolDiffer {
    fn default() -> Self {
        Self::new(DEFAULT_RENAME_THRESHOLD)
    }
}

type Key<'a> = (Option<&'a str>, &'a str);

fn key(s: &Symbol) -> Key<'_> {
    (s.query.as_deref(), s.fqname.as_str())
}

fn position(s: &Symbol) -> (&str, u32, &str) {
    (s.file_path.as_str(), s.start_line, s.fqname.as_str())
}

impl SymbolDiffer {
    /// A threshold above 1.0 disables rename detection.
    #[must_use]
    pub const fn new(rename_threshold: f64) -> Self {
        Self { rename_threshold }
    }

    #[must_use]
    pub const fn rename_threshold(&self) -> f64 {
        self.rename_threshold
    }

    /// Diff `old` against `new`. Inputs may span several files.
    #[must_use]
    pub fn diff(&self, old: &[Symbol], new: &[Symbol]) -> SymbolDiff {
        let old_by_key: BTreeMap<Key<'_>, &Symbol> = old.iter().map(|s| (key(s), s)).collect();
        let new_by_key: BTreeMap<Key<'_>, &Symbol> = new.iter().map(|s| (key(s), s)).collect();

        let mut diff = SymbolDiff::default();
        let mut removed: Vec<&Symbol> = Vec::new();
        let mut added: Vec<&Symbol> = Vec::new();

        for (k, o) in &old_by_key {
            match new_by_key.get(k) {
                Some(n) => {
                    let sig = o.signature_text != n.signature_text;
                    let body = o.body_hash != n.body_hash;
                    let part = match (sig, body) {
                        (false, false) => continue,
                        (true, false) => ModifiedPart::Signature,
                        (false, true) => ModifiedPart::Body,
                        (true, true) => ModifiedPart::Both,
                    };
                    diff.modified.push(ModifiedSymbol {
                        old: (*o).clone(),
                        new: (*n).clone(),
                        part,
                    });
                }
                None => removed.push(o),
            }
        }
        for (k, n) in &new_by_key {
            if !old_by_key.contains_key(k) {
                added.push(n);
            }
        }

        let pairs = self.rename_pairs(&removed, &added);
        let renamed_old: BTreeSet<usize> = pairs.iter().map(|(i, _, _)| *i).collect();
        let renamed_new: BTreeSet<usize> = pairs.iter().map(|(_, j, _)| *j).collect();

        diff.renamed = pairs
            .into_iter()
            .map(|(i, j, similarity)| RenamedSymbol {
                from: removed[i].clone(),
                to: added[j].clone(),
                similarity,
            })
            .collect();
        diff.removed = removed
            .iter()
            .enumerate()
            .filter(|(i, _)| !renamed_old.contains(i))
            .map(|(_, s)| (*s).clone())
            .collect();
        diff.added = added
            .iter()
            .enumerate()
            .filter(|(j, _)| !renamed_new.contains(j))
            .map(|(_, s)| (*s).clone())
            .collect();

        diff.added.sort_by(|a, b| position(a).cmp(&position(b)));
        diff.removed.sort_by(|a, b| position(a).cmp(&position(b)));
        diff.modified
            .sort_by(|a, b| position(&a.new).cmp(&position(&b.new)));
        diff.renamed.sort_by(|a, b| position(&a.to).cmp(&position(&b.to)));
        diff
    }

    /// Greedy pairing by descending similarity, ties broken by
    /// `(old fqname, new fqname)` ascending.
    fn rename_pairs(&self, removed: &[&Symbol], added: &[&Symbol]) -> Vec<(usize, usize, f32)> {
        let mut candidates: Vec<(usize, usize, f32)> = Vec::new();
        for (i, o) in removed.iter().enumerate() {
            for (j, n) in added.iter().enumerate() {
                if !comparable(o, n) {
                    continue;
                }
                let similarity = signature_similarity(o, n);
                if f64::from(similarity) >= self.rename_threshold {
                    candidates.push((i, j, similarity));
                }
            }
        }
        candidates.sort_by(|a, b| {
            b.2.total_cmp(&a.2)
                .then_with(|| removed[a.0].fqname.cmp(&removed[b.0].fqname))
                .then_with(|| added[a.1].fqname.cmp(&added[b.1].fqname))
        });

        let mut used_old = BTreeSet::new();
        let mut used_new = BTreeSet::new();
        let mut pairs = Vec::new();
        for (i, j, similarity) in candidates {
            if used_old.contains(&i) || used_new.contains(&j) {
                continue;
            }
            used_old.insert(i);
            used_new.insert(j);
            pairs.push((i, j, similarity));
        }
        pairs
    }
}

fn comparable(old: &Symbol, new: &Symbol) -> bool {
    !old.name.is_empty()
        && !new.name.is_empty()
        && old.lang == new.lang
        && old.kind == new.kind
        && old.scope == new.scope
        && old.query == new.query
}

/// Character-level similarity of the two signatures with the first occurrence
/// of each symbol's own name replaced by a placeholder.
#[must_use]
pub fn signature_similarity(old: &Symbol, new: &Symbol) -> f32 {
    let a = old.signature_text.replacen(&old.name, "\u{0}", 1);
    let b = new.signature_text.replacen(&new.name, "\u{0}", 1);
    TextDiff::from_chars(a.as_str(), b.as_str()).ratio()
}
