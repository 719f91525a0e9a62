use pretty_assertions::assert_eq;
use thoth_core::EDGE_DEPENDS_ON;
use thoth_core::entities::SymbolSelector;
use thoth_core::enums::{LeaseMode, Severity};
use thoth_manifest::{ManifestError, ManifestModel, Violation};

const MANIFEST: &str = r#"
[[resources]]
id = "wal_subsystem"
description = "Write ahead log segment writer and reader"
severity = "serialized"
owners = ["storage-team"]
tags = ["storage", "durability"]
deps = ["storage_api"]
checks = ["wal-tests", "fmt"]
invariants = ["INV-7"]
adrs = ["ADR-12"]
lease = { mode = "exclusive", ttl_seconds = 900 }
paths = ["pkg/storage/wal/**"]
regions = ["THOTH-0192"]

[[resources.symbols]]
lang = "go"
kind = "interface"
fqname = "storage.wal.Writer"

[[resources]]
id = "storage_api"
description = "Public storage interfaces"
severity = "gated"
tags = ["storage"]
checks = ["fmt"]
paths = ["pkg/storage/api/*.go"]

[[resources.symbols]]
lang = "go"
pattern = "^User.*Service$"

[[resources]]
id = "docs"
description = "Documentation"

[[invariants]]
id = "INV-7"
statement = "Segments are fsynced before acknowledgement"
verify = ["wal-tests"]

[[adrs]]
id = "ADR-12"
capsule = "Single writer per segment"
path = "docs/adr/0012-wal.md"

[[checks]]
id = "wal-tests"
cmd = "go test ./pkg/storage/wal/..."
timeout_seconds = 120
cacheable = true

[[checks]]
id = "fmt"
cmd = "gofmt -l ."

[[edges]]
src = "docs"
dst = "storage_api"
type = "documents"
"#;

fn invalid(source: &str) -> Vec<Violation> {
    match ManifestModel::from_toml_str(source) {
        Err(ManifestError::Invalid { violations }) => violations,
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn loads_valid_manifest() {
    let model = ManifestModel::from_toml_str(MANIFEST).unwrap();

    let ids: Vec<&str> = model.resources().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["docs", "storage_api", "wal_subsystem"]);

    let wal = model.resource("wal_subsystem").unwrap();
    assert_eq!(wal.severity, Severity::Serialized);
    assert_eq!(wal.lease.unwrap().mode, LeaseMode::Exclusive);
    assert_eq!(model.resource("docs").unwrap().severity, Severity::Advisory);

    assert_eq!(model.required_checks("wal_subsystem"), vec!["fmt", "wal-tests"]);
    assert_eq!(model.check("wal-tests").unwrap().timeout_seconds, 120);
    assert_eq!(model.check("fmt").unwrap().timeout_seconds, 300);
    assert_eq!(model.region_owner("THOTH-0192"), Some("wal_subsystem"));
    assert_eq!(
        model.adr("ADR-12").unwrap().full_path.as_deref(),
        Some("docs/adr/0012-wal.md")
    );
}

#[test]
fn edges_include_dependencies_sorted() {
    let model = ManifestModel::from_toml_str(MANIFEST).unwrap();
    let edges: Vec<(&str, &str, &str)> = model
        .edges()
        .iter()
        .map(|e| (e.src.as_str(), e.dst.as_str(), e.edge_type.as_str()))
        .collect();
    assert_eq!(
        edges,
        vec![
            ("docs", "storage_api", "documents"),
            ("wal_subsystem", "storage_api", EDGE_DEPENDS_ON),
        ]
    );
}

#[test]
fn lookups_by_tag_severity_and_glob() {
    let model = ManifestModel::from_toml_str(MANIFEST).unwrap();

    let by_tag: Vec<&str> = model
        .resources_by_tag("storage")
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(by_tag, vec!["storage_api", "wal_subsystem"]);

    let gated: Vec<&str> = model
        .resources_by_severity(Severity::Gated)
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(gated, vec!["storage_api"]);

    let by_glob: Vec<&str> = model
        .resources_by_path_glob("pkg/storage/**")
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(by_glob, vec!["storage_api", "wal_subsystem"]);

    let by_file: Vec<&str> = model
        .resources_by_path_glob("pkg/storage/wal/segment.go")
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(by_file, vec!["wal_subsystem"]);
}

#[test]
fn matching_path_bindings_respects_separators() {
    let model = ManifestModel::from_toml_str(MANIFEST).unwrap();
    let owners: Vec<&str> = model
        .matching_path_bindings("pkg/storage/wal/x.go")
        .map(|b| b.resource_id.as_str())
        .collect();
    assert_eq!(owners, vec!["wal_subsystem"]);
    assert_eq!(model.matching_path_bindings("pkg/storage/other/y.go").count(), 0);
    assert_eq!(model.matching_path_bindings("pkg/storage/api/v1/z.go").count(), 0);
}

#[test]
fn symbol_patterns_are_precompiled() {
    let model = ManifestModel::from_toml_str(MANIFEST).unwrap();
    let binding = model
        .symbol_bindings()
        .iter()
        .find(|b| b.resource_id == "storage_api")
        .unwrap();
    let SymbolSelector::Pattern(pattern) = &binding.selector else {
        panic!("expected pattern selector");
    };
    assert!(model.symbol_pattern(pattern).unwrap().is_match("UserLookupService"));
}

#[test]
fn digest_is_stable_across_loads() {
    let a = ManifestModel::from_toml_str(MANIFEST).unwrap();
    let b = ManifestModel::from_toml_str(MANIFEST).unwrap();
    assert_eq!(a.digest(), b.digest());
    assert_eq!(a.digest().len(), 64);
}

#[test]
fn collects_every_violation() {
    let violations = invalid(
        r#"
[[resources]]
id = "a"
severity = "critical"
checks = ["missing-check"]
deps = ["ghost"]
lease = { mode = "exclusive" }
regions = ["R-1"]

[[resources.symbols]]
lang = "rust"
fqname = "crate::a"
pattern = "^a$"

[[resources]]
id = "a"
regions = ["R-1"]
paths = ["src/[unclosed"]

[[edges]]
src = "a"
dst = "nowhere"
type = "calls"
"#,
    );

    assert_eq!(
        violations,
        vec![
            Violation::Duplicate {
                entity: "resource",
                id: "a".to_string(),
            },
            Violation::UnknownCheck {
                resource: "a".to_string(),
                check: "missing-check".to_string(),
            },
            Violation::UnknownDependency {
                resource: "a".to_string(),
                dep: "ghost".to_string(),
            },
            Violation::SymbolSelectorCount {
                resource: "a".to_string(),
                index: 0,
                count: 2,
            },
            Violation::UnknownSeverity {
                resource: "a".to_string(),
                value: "critical".to_string(),
            },
            Violation::MissingLeaseTtl {
                resource: "a".to_string(),
            },
            Violation::InvalidGlob {
                resource: "a".to_string(),
                glob: "src/[unclosed".to_string(),
                reason: violations
                    .iter()
                    .find_map(|v| match v {
                        Violation::InvalidGlob { reason, .. } => Some(reason.clone()),
                        _ => None,
                    })
                    .unwrap(),
            },
            Violation::DuplicateRegion {
                region: "R-1".to_string(),
                first: "a".to_string(),
                second: "a".to_string(),
            },
            Violation::UnknownEdgeEndpoint {
                src: "a".to_string(),
                dst: "nowhere".to_string(),
                edge_type: "calls".to_string(),
                missing: "nowhere".to_string(),
            },
        ]
    );
}

#[test]
fn zero_ttl_exclusive_lease_is_rejected() {
    let violations = invalid(
        r#"
[[resources]]
id = "a"
lease = { mode = "exclusive", ttl_seconds = 0 }
"#,
    );
    assert_eq!(
        violations,
        vec![Violation::MissingLeaseTtl {
            resource: "a".to_string()
        }]
    );
}

#[test]
fn shared_lease_needs_no_ttl() {
    let model = ManifestModel::from_toml_str(
        r#"
[[resources]]
id = "a"
lease = { mode = "shared" }
"#,
    )
    .unwrap();
    assert_eq!(model.resource("a").unwrap().lease.unwrap().ttl_seconds, None);
}

#[test]
fn symbol_binding_without_selector_is_rejected() {
    let violations = invalid(
        r#"
[[resources]]
id = "a"

[[resources.symbols]]
lang = "rust"
kind = "function"
"#,
    );
    assert_eq!(
        violations,
        vec![Violation::SymbolSelectorCount {
            resource: "a".to_string(),
            index: 0,
            count: 0,
        }]
    );
}

#[test]
fn bad_regex_and_unknown_references_are_reported() {
    let violations = invalid(
        r#"
[[resources]]
id = "a"
invariants = ["INV-x"]
adrs = ["ADR-x"]

[[resources.symbols]]
lang = "go"
pattern = "(unclosed"
"#,
    );
    assert_eq!(violations.len(), 3);
    assert!(matches!(violations[0], Violation::UnknownInvariant { .. }));
    assert!(matches!(violations[1], Violation::UnknownAdr { .. }));
    assert!(matches!(violations[2], Violation::InvalidPattern { .. }));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = ManifestModel::from_toml_str("[[resources]]\nid = ").unwrap_err();
    assert!(matches!(err, ManifestError::Parse(_)));
    assert!(err.violations().is_empty());
}
