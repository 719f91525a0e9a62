//! Pure, order-stable binding matchers.
//!
//! Every function returns matches in the order of its input, then binding
//! order, with duplicates removed. [`merge`] folds them into per-resource
//! reason lists ordered path, region, symbol.

use std::collections::{BTreeMap, BTreeSet};

use thoth_core::entities::{
    FileDiagnostic, SymbolBinding, SymbolSelector, TouchReason, TouchedResource,
};
use thoth_core::enums::{ChangeKind, DiagnosticStage, ModifiedPart, ReasonType};
use thoth_manifest::ManifestModel;
use thoth_parser::SymbolDiff;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
    pub resource_id: String,
    pub path: String,
}

/// A region whose canonical hash differs between revisions, or that exists
/// in only one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionChange {
    pub region_id: String,
    /// `resource=` value of the region's BEGIN marker.
    pub marker_resource: String,
    pub file_path: String,
    pub change: ChangeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMatch {
    pub resource_id: String,
    pub region_id: String,
    pub change: ChangeKind,
}

/// One changed symbol, flattened from a [`SymbolDiff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolChange {
    pub fqname: String,
    pub name: String,
    pub lang: String,
    pub kind: thoth_core::enums::SymbolKind,
    pub query: Option<String>,
    pub file_path: String,
    pub change: ChangeKind,
    pub part: Option<ModifiedPart>,
    /// `(fqname, name)` before a rename.
    pub renamed_from: Option<(String, String)>,
    line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMatch {
    pub resource_id: String,
    pub fqname: String,
    pub change: ChangeKind,
    pub part: Option<ModifiedPart>,
    pub renamed_from: Option<String>,
}

/// Flatten a symbol diff into changes ordered by `(file, line, fqname)`.
#[must_use]
pub fn symbol_changes(diff: &SymbolDiff) -> Vec<SymbolChange> {
    let mut out = Vec::new();
    let mut push = |s: &thoth_core::entities::Symbol,
                    change: ChangeKind,
                    part: Option<ModifiedPart>,
                    renamed_from: Option<(String, String)>| {
        out.push(SymbolChange {
            fqname: s.fqname.clone(),
            name: s.name.clone(),
            lang: s.lang.clone(),
            kind: s.kind,
            query: s.query.clone(),
            file_path: s.file_path.clone(),
            change,
            part,
            renamed_from,
            line: s.start_line,
        });
    };
    for s in &diff.added {
        push(s, ChangeKind::Added, None, None);
    }
    for s in &diff.removed {
        push(s, ChangeKind::Removed, None, None);
    }
    for m in &diff.modified {
        push(&m.new, ChangeKind::Modified, Some(m.part), None);
    }
    for r in &diff.renamed {
        push(
            &r.to,
            ChangeKind::Renamed,
            None,
            Some((r.from.fqname.clone(), r.from.name.clone())),
        );
    }
    out.sort_by(|a, b| {
        (a.file_path.as_str(), a.line, a.fqname.as_str(), &a.query)
            .cmp(&(b.file_path.as_str(), b.line, b.fqname.as_str(), &b.query))
    });
    out
}

/// Match changed paths against path bindings.
#[must_use]
pub fn match_paths(changed_paths: &[&str], model: &ManifestModel) -> Vec<PathMatch> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for path in changed_paths {
        for binding in model.matching_path_bindings(path) {
            if seen.insert((binding.resource_id.as_str(), *path)) {
                out.push(PathMatch {
                    resource_id: binding.resource_id.clone(),
                    path: (*path).to_string(),
                });
            }
        }
    }
    out
}

/// Match touched regions against region bindings.
#[must_use]
pub fn match_regions(changes: &[RegionChange], model: &ManifestModel) -> Vec<RegionMatch> {
    changes
        .iter()
        .filter_map(|c| {
            model.region_owner(&c.region_id).map(|owner| RegionMatch {
                resource_id: owner.to_string(),
                region_id: c.region_id.clone(),
                change: c.change,
            })
        })
        .collect()
}

/// Touched regions whose marker names a resource other than the one the
/// manifest binds the region to, one diagnostic per region.
#[must_use]
pub fn region_owner_mismatches(
    changes: &[RegionChange],
    model: &ManifestModel,
) -> Vec<FileDiagnostic> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for c in changes {
        let Some(owner) = model.region_owner(&c.region_id) else {
            continue;
        };
        if owner == c.marker_resource || !seen.insert(c.region_id.as_str()) {
            continue;
        }
        tracing::warn!(
            region = %c.region_id,
            marker = %c.marker_resource,
            owner,
            "region marker disagrees with manifest binding"
        );
        out.push(FileDiagnostic {
            path: c.file_path.clone(),
            stage: DiagnosticStage::RegionOwner,
            message: format!(
                "region {} is marked resource={} but bound to {owner}",
                c.region_id, c.marker_resource
            ),
        });
    }
    out
}

/// Match changed symbols against symbol bindings.
///
/// `fqname` bindings match the exact name, `pattern` bindings match the bare
/// name by regex, `query` bindings match only captures of that query. A
/// renamed symbol matches on either its old or its new name.
#[must_use]
pub fn match_symbols(changes: &[SymbolChange], model: &ManifestModel) -> Vec<SymbolMatch> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for change in changes {
        for binding in model.symbol_bindings() {
            if !binding_matches(binding, change, model) {
                continue;
            }
            if !seen.insert((binding.resource_id.as_str(), change.fqname.as_str(), &change.query)) {
                continue;
            }
            out.push(SymbolMatch {
                resource_id: binding.resource_id.clone(),
                fqname: change.fqname.clone(),
                change: change.change,
                part: change.part,
                renamed_from: change.renamed_from.as_ref().map(|(f, _)| f.clone()),
            });
        }
    }
    out
}

fn binding_matches(binding: &SymbolBinding, change: &SymbolChange, model: &ManifestModel) -> bool {
    if binding.lang != change.lang || binding.kind.is_some_and(|k| k != change.kind) {
        return false;
    }
    let previous = change.renamed_from.as_ref();
    match &binding.selector {
        SymbolSelector::Query(q) => change.query.as_deref() == Some(q.as_str()),
        _ if change.query.is_some() => false,
        SymbolSelector::Fqname(f) => {
            change.fqname == *f || previous.is_some_and(|(old, _)| old == f)
        }
        SymbolSelector::Pattern(p) => model.symbol_pattern(p).is_some_and(|re| {
            re.is_match(&change.name) || previous.is_some_and(|(_, old)| re.is_match(old))
        }),
    }
}

/// Fold matches into touched resources ordered by resource id, each with
/// reasons ordered path, region, symbol.
#[must_use]
pub fn merge(
    model: &ManifestModel,
    paths: &[PathMatch],
    regions: &[RegionMatch],
    symbols: &[SymbolMatch],
) -> Vec<TouchedResource> {
    let mut reasons: BTreeMap<&str, Vec<TouchReason>> = BTreeMap::new();
    for m in paths {
        reasons
            .entry(m.resource_id.as_str())
            .or_default()
            .push(TouchReason::path(&m.path));
    }
    for m in regions {
        reasons
            .entry(m.resource_id.as_str())
            .or_default()
            .push(TouchReason::region(&m.region_id, m.change));
    }
    for m in symbols {
        reasons
            .entry(m.resource_id.as_str())
            .or_default()
            .push(TouchReason {
                reason_type: ReasonType::Symbol,
                value: m.fqname.clone(),
                change: Some(m.change),
                part: m.part,
                renamed_from: m.renamed_from.clone(),
            });
    }

    reasons
        .into_iter()
        .filter_map(|(id, mut reasons)| {
            let resource = model.resource(id)?;
            dedup_preserving_order(&mut reasons);
            Some(TouchedResource {
                resource_id: id.to_string(),
                severity: resource.severity,
                reasons,
                required_checks: model.required_checks(id),
                lease: resource.lease,
            })
        })
        .collect()
}

fn dedup_preserving_order(reasons: &mut Vec<TouchReason>) {
    let mut kept: Vec<TouchReason> = Vec::with_capacity(reasons.len());
    for r in reasons.drain(..) {
        if !kept.contains(&r) {
            kept.push(r);
        }
    }
    *reasons = kept;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use thoth_core::entities::Symbol;
    use thoth_core::enums::SymbolKind;
    use thoth_parser::{ModifiedSymbol, RenamedSymbol};

    use super::*;

    const MANIFEST: &str = r#"
[[resources]]
id = "wal_subsystem"
severity = "serialized"
checks = ["wal-tests"]
lease = { mode = "exclusive", ttl_seconds = 600 }
paths = ["pkg/storage/wal/**"]
regions = ["THOTH-0192"]

[[resources]]
id = "users_api"
severity = "gated"

[[resources.symbols]]
lang = "go"
kind = "interface"
fqname = "pkg.users.UserService"

[[resources]]
id = "services"

[[resources.symbols]]
lang = "go"
pattern = "Service$"

[[checks]]
id = "wal-tests"
cmd = "go test ./pkg/storage/wal/..."
"#;

    fn model() -> ManifestModel {
        ManifestModel::from_toml_str(MANIFEST).unwrap()
    }

    fn go_symbol(fqname: &str, kind: SymbolKind, line: u32) -> Symbol {
        Symbol {
            fqname: fqname.to_string(),
            name: fqname.rsplit('.').next().unwrap_or_default().to_string(),
            lang: "go".to_string(),
            kind,
            scope: Vec::new(),
            file_path: "pkg/users/service.go".to_string(),
            start_line: line,
            end_line: line,
            signature_text: String::new(),
            body_hash: String::new(),
            query: None,
        }
    }

    #[test]
    fn path_glob_semantics() {
        let model = model();
        let hits = match_paths(
            &["pkg/storage/wal/x.go", "pkg/storage/other/y.go", "pkg/storage/wal/seg/z.go"],
            &model,
        );
        let got: Vec<(&str, &str)> = hits
            .iter()
            .map(|m| (m.resource_id.as_str(), m.path.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("wal_subsystem", "pkg/storage/wal/x.go"),
                ("wal_subsystem", "pkg/storage/wal/seg/z.go"),
            ]
        );
    }

    #[test]
    fn unbound_regions_are_ignored() {
        let model = model();
        let changes = vec![
            RegionChange {
                region_id: "THOTH-0192".to_string(),
                marker_resource: "wal_subsystem".to_string(),
                file_path: "pkg/storage/wal/wal.go".to_string(),
                change: ChangeKind::Modified,
            },
            RegionChange {
                region_id: "THOTH-9999".to_string(),
                marker_resource: "wal_subsystem".to_string(),
                file_path: "pkg/other.go".to_string(),
                change: ChangeKind::Added,
            },
        ];
        assert_eq!(
            match_regions(&changes, &model),
            vec![RegionMatch {
                resource_id: "wal_subsystem".to_string(),
                region_id: "THOTH-0192".to_string(),
                change: ChangeKind::Modified,
            }]
        );
    }

    #[test]
    fn marker_naming_another_resource_is_reported() {
        let model = model();
        let change = |marker: &str| RegionChange {
            region_id: "THOTH-0192".to_string(),
            marker_resource: marker.to_string(),
            file_path: "pkg/storage/wal/wal.go".to_string(),
            change: ChangeKind::Modified,
        };

        assert_eq!(region_owner_mismatches(&[change("wal_subsystem")], &model), vec![]);

        let diagnostics = region_owner_mismatches(&[change("wal_flush"), change("wal_flush")], &model);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].stage, DiagnosticStage::RegionOwner);
        assert_eq!(
            diagnostics[0].message,
            "region THOTH-0192 is marked resource=wal_flush but bound to wal_subsystem"
        );
        assert_eq!(match_regions(&[change("wal_flush")], &model)[0].resource_id, "wal_subsystem");
    }

    #[test]
    fn symbol_selectors_and_kind_filter() {
        let model = model();
        let service = go_symbol("pkg.users.UserService", SymbolKind::Interface, 3);
        let helper = go_symbol("pkg.users.helper", SymbolKind::Function, 9);
        let diff = SymbolDiff {
            modified: vec![
                ModifiedSymbol {
                    old: service.clone(),
                    new: service,
                    part: ModifiedPart::Signature,
                },
                ModifiedSymbol {
                    old: helper.clone(),
                    new: helper,
                    part: ModifiedPart::Body,
                },
            ],
            ..SymbolDiff::default()
        };
        let matches = match_symbols(&symbol_changes(&diff), &model);
        let got: Vec<(&str, &str)> = matches
            .iter()
            .map(|m| (m.resource_id.as_str(), m.fqname.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("services", "pkg.users.UserService"),
                ("users_api", "pkg.users.UserService"),
            ]
        );
        assert!(matches.iter().all(|m| m.change == ChangeKind::Modified));
    }

    #[test]
    fn rename_matches_previous_fqname() {
        let model = model();
        let diff = SymbolDiff {
            renamed: vec![RenamedSymbol {
                from: go_symbol("pkg.users.UserService", SymbolKind::Interface, 3),
                to: go_symbol("pkg.users.AccountStore", SymbolKind::Interface, 3),
                similarity: 0.9,
            }],
            ..SymbolDiff::default()
        };
        let matches = match_symbols(&symbol_changes(&diff), &model);
        let got: Vec<(&str, Option<&str>)> = matches
            .iter()
            .map(|m| (m.resource_id.as_str(), m.renamed_from.as_deref()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("services", Some("pkg.users.UserService")),
                ("users_api", Some("pkg.users.UserService")),
            ]
        );
    }

    #[test]
    fn merge_orders_resources_and_reasons() {
        let model = model();
        let paths = vec![PathMatch {
            resource_id: "wal_subsystem".to_string(),
            path: "pkg/storage/wal/wal.go".to_string(),
        }];
        let regions = vec![RegionMatch {
            resource_id: "wal_subsystem".to_string(),
            region_id: "THOTH-0192".to_string(),
            change: ChangeKind::Modified,
        }];
        let symbols = vec![SymbolMatch {
            resource_id: "users_api".to_string(),
            fqname: "pkg.users.UserService".to_string(),
            change: ChangeKind::Modified,
            part: Some(ModifiedPart::Signature),
            renamed_from: None,
        }];
        let touched = merge(&model, &paths, &regions, &symbols);

        assert_eq!(touched.len(), 2);
        assert_eq!(touched[0].resource_id, "users_api");
        assert_eq!(touched[1].resource_id, "wal_subsystem");
        let types: Vec<ReasonType> = touched[1].reasons.iter().map(|r| r.reason_type).collect();
        assert_eq!(types, vec![ReasonType::Path, ReasonType::Region]);
        assert_eq!(touched[1].required_checks, vec!["wal-tests"]);
        assert!(touched[1].lease.is_some());
    }
}
