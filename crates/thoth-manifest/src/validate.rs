//! Collect-all validation of a [`RawManifest`].
//!
//! Every rule runs regardless of earlier failures so the caller sees the
//! complete violation list in one pass.

use std::collections::{BTreeMap, BTreeSet};

use globset::GlobMatcher;
use regex::Regex;
use thoth_core::EDGE_DEPENDS_ON;
use thoth_core::entities::{
    AdrCapsule, CheckDef, Edge, Invariant, LeaseSpec, PathBinding, RegionBinding, Resource,
    SymbolBinding, SymbolSelector,
};
use thoth_core::enums::{LeaseMode, Severity, SymbolKind};

use crate::error::Violation;
use crate::glob::compile_glob;
use crate::raw::{RawLease, RawManifest, RawResource, RawSymbolBinding};

/// Converted entities, ready to be indexed by the model.
pub(crate) struct Validated {
    pub resources: Vec<Resource>,
    pub path_bindings: Vec<(PathBinding, GlobMatcher)>,
    pub symbol_bindings: Vec<SymbolBinding>,
    pub patterns: BTreeMap<String, Regex>,
    pub region_bindings: Vec<RegionBinding>,
    pub invariants: Vec<Invariant>,
    pub adrs: Vec<AdrCapsule>,
    pub checks: Vec<CheckDef>,
    pub edges: Vec<Edge>,
}

pub(crate) fn validate(raw: &RawManifest) -> Result<Validated, Vec<Violation>> {
    let mut violations = Vec::new();

    let check_ids = unique_ids("check", raw.checks.iter().map(|c| c.id.as_str()), &mut violations);
    let invariant_ids = unique_ids(
        "invariant",
        raw.invariants.iter().map(|i| i.id.as_str()),
        &mut violations,
    );
    let adr_ids = unique_ids("adr", raw.adrs.iter().map(|a| a.id.as_str()), &mut violations);
    let resource_ids = unique_ids(
        "resource",
        raw.resources.iter().map(|r| r.id.as_str()),
        &mut violations,
    );

    let mut out = Validated {
        resources: Vec::with_capacity(raw.resources.len()),
        path_bindings: Vec::new(),
        symbol_bindings: Vec::new(),
        patterns: BTreeMap::new(),
        region_bindings: Vec::new(),
        invariants: Vec::new(),
        adrs: Vec::new(),
        checks: Vec::new(),
        edges: Vec::new(),
    };
    let mut region_owner: BTreeMap<&str, &str> = BTreeMap::new();

    for r in &raw.resources {
        for check in &r.checks {
            if !check_ids.contains(check.as_str()) {
                violations.push(Violation::UnknownCheck {
                    resource: r.id.clone(),
                    check: check.clone(),
                });
            }
        }
        for inv in &r.invariants {
            if !invariant_ids.contains(inv.as_str()) {
                violations.push(Violation::UnknownInvariant {
                    resource: r.id.clone(),
                    invariant: inv.clone(),
                });
            }
        }
        for adr in &r.adrs {
            if !adr_ids.contains(adr.as_str()) {
                violations.push(Violation::UnknownAdr {
                    resource: r.id.clone(),
                    adr: adr.clone(),
                });
            }
        }
        for dep in &r.deps {
            if resource_ids.contains(dep.as_str()) {
                out.edges.push(Edge {
                    src: r.id.clone(),
                    dst: dep.clone(),
                    edge_type: EDGE_DEPENDS_ON.to_string(),
                });
            } else {
                violations.push(Violation::UnknownDependency {
                    resource: r.id.clone(),
                    dep: dep.clone(),
                });
            }
        }

        for glob in &r.paths {
            match compile_glob(glob) {
                Ok(matcher) => out.path_bindings.push((
                    PathBinding {
                        resource_id: r.id.clone(),
                        glob: glob.clone(),
                    },
                    matcher,
                )),
                Err(e) => violations.push(Violation::InvalidGlob {
                    resource: r.id.clone(),
                    glob: glob.clone(),
                    reason: e.kind().to_string(),
                }),
            }
        }

        for (index, sym) in r.symbols.iter().enumerate() {
            if let Some(binding) = symbol_binding(r, index, sym, &mut out.patterns, &mut violations)
            {
                out.symbol_bindings.push(binding);
            }
        }

        for region in &r.regions {
            if region.is_empty() {
                violations.push(Violation::EmptyId { entity: "region" });
                continue;
            }
            if let Some(first) = region_owner.get(region.as_str()) {
                violations.push(Violation::DuplicateRegion {
                    region: region.clone(),
                    first: (*first).to_string(),
                    second: r.id.clone(),
                });
                continue;
            }
            region_owner.insert(region, &r.id);
            out.region_bindings.push(RegionBinding {
                resource_id: r.id.clone(),
                region_id: region.clone(),
            });
        }

        let severity = match r.severity.as_deref() {
            None => Severity::Advisory,
            Some(s) => s.parse().unwrap_or_else(|_| {
                violations.push(Violation::UnknownSeverity {
                    resource: r.id.clone(),
                    value: s.to_string(),
                });
                Severity::Advisory
            }),
        };
        let lease = r
            .lease
            .as_ref()
            .and_then(|l| lease_spec(&r.id, l, &mut violations));

        out.resources.push(Resource {
            id: r.id.clone(),
            description: r.description.clone(),
            severity,
            owners: r.owners.clone(),
            tags: r.tags.clone(),
            deps: r.deps.clone(),
            checks: r.checks.clone(),
            invariants: r.invariants.clone(),
            adrs: r.adrs.clone(),
            lease,
        });
    }

    for e in &raw.edges {
        if e.edge_type.is_empty() {
            violations.push(Violation::EmptyId { entity: "edge type" });
            continue;
        }
        let missing = [&e.src, &e.dst]
            .into_iter()
            .find(|id| !resource_ids.contains(id.as_str()));
        if let Some(missing) = missing {
            violations.push(Violation::UnknownEdgeEndpoint {
                src: e.src.clone(),
                dst: e.dst.clone(),
                edge_type: e.edge_type.clone(),
                missing: missing.clone(),
            });
            continue;
        }
        out.edges.push(Edge {
            src: e.src.clone(),
            dst: e.dst.clone(),
            edge_type: e.edge_type.clone(),
        });
    }

    out.invariants = raw
        .invariants
        .iter()
        .map(|i| Invariant {
            id: i.id.clone(),
            statement: i.statement.clone(),
            scope: i.scope.clone(),
            verify: i.verify.clone(),
            doc_path: i.doc_path.clone(),
        })
        .collect();
    out.adrs = raw
        .adrs
        .iter()
        .map(|a| AdrCapsule {
            id: a.id.clone(),
            capsule: a.capsule.clone(),
            capsule_path: a.capsule_path.clone(),
            full_path: a.path.clone(),
        })
        .collect();
    out.checks = raw
        .checks
        .iter()
        .map(|c| CheckDef {
            id: c.id.clone(),
            cmd: c.cmd.clone(),
            timeout_seconds: c.timeout_seconds,
            cacheable: c.cacheable,
        })
        .collect();

    if violations.is_empty() {
        Ok(out)
    } else {
        Err(violations)
    }
}

fn unique_ids<'a>(
    entity: &'static str,
    ids: impl Iterator<Item = &'a str>,
    violations: &mut Vec<Violation>,
) -> BTreeSet<&'a str> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if id.is_empty() {
            violations.push(Violation::EmptyId { entity });
        } else if !seen.insert(id) {
            violations.push(Violation::Duplicate {
                entity,
                id: id.to_string(),
            });
        }
    }
    seen
}

fn lease_spec(resource: &str, raw: &RawLease, violations: &mut Vec<Violation>) -> Option<LeaseSpec> {
    let Ok(mode) = raw.mode.parse::<LeaseMode>() else {
        violations.push(Violation::UnknownLeaseMode {
            resource: resource.to_string(),
            value: raw.mode.clone(),
        });
        return None;
    };
    if mode == LeaseMode::Exclusive && raw.ttl_seconds.unwrap_or(0) == 0 {
        violations.push(Violation::MissingLeaseTtl {
            resource: resource.to_string(),
        });
        return None;
    }
    Some(LeaseSpec {
        mode,
        ttl_seconds: raw.ttl_seconds,
    })
}

fn symbol_binding(
    resource: &RawResource,
    index: usize,
    raw: &RawSymbolBinding,
    patterns: &mut BTreeMap<String, Regex>,
    violations: &mut Vec<Violation>,
) -> Option<SymbolBinding> {
    let set = [&raw.fqname, &raw.pattern, &raw.query]
        .into_iter()
        .filter(|s| s.is_some())
        .count();
    let kind = match raw.kind.as_deref() {
        None => None,
        Some(k) => match k.parse::<SymbolKind>() {
            Ok(kind) => Some(kind),
            Err(_) => {
                violations.push(Violation::UnknownSymbolKind {
                    resource: resource.id.clone(),
                    index,
                    value: k.to_string(),
                });
                return None;
            }
        },
    };
    if set != 1 {
        violations.push(Violation::SymbolSelectorCount {
            resource: resource.id.clone(),
            index,
            count: set,
        });
        return None;
    }

    let selector = if let Some(fqname) = &raw.fqname {
        SymbolSelector::Fqname(fqname.clone())
    } else if let Some(pattern) = &raw.pattern {
        match Regex::new(pattern) {
            Ok(re) => {
                patterns.insert(pattern.clone(), re);
            }
            Err(e) => {
                violations.push(Violation::InvalidPattern {
                    resource: resource.id.clone(),
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                });
                return None;
            }
        }
        SymbolSelector::Pattern(pattern.clone())
    } else {
        SymbolSelector::Query(raw.query.clone().unwrap_or_default())
    };

    Some(SymbolBinding {
        resource_id: resource.id.clone(),
        lang: raw.lang.clone(),
        kind,
        selector,
    })
}
