use std::collections::{BTreeMap, BTreeSet};

use globset::GlobMatcher;
use regex::Regex;
use sha2::{Digest, Sha256};
use thoth_core::entities::{
    AdrCapsule, CheckDef, Edge, Invariant, PathBinding, RegionBinding, Resource, SymbolBinding,
    SymbolSelector,
};
use thoth_core::enums::Severity;

use crate::error::ManifestError;
use crate::glob::globs_intersect;
use crate::raw::RawManifest;
use crate::validate::validate;

/// Validated, immutable governance declarations.
///
/// Every collection is kept in a deterministic order: resources, checks,
/// invariants and ADRs by id; bindings by `(resource_id, declaration order)`;
/// edges by `(src, dst, edge_type)`.
#[derive(Debug, Clone)]
pub struct ManifestModel {
    resources: BTreeMap<String, Resource>,
    path_bindings: Vec<(PathBinding, GlobMatcher)>,
    symbol_bindings: Vec<SymbolBinding>,
    patterns: BTreeMap<String, Regex>,
    region_bindings: Vec<RegionBinding>,
    region_owner: BTreeMap<String, String>,
    invariants: BTreeMap<String, Invariant>,
    adrs: BTreeMap<String, AdrCapsule>,
    checks: BTreeMap<String, CheckDef>,
    edges: Vec<Edge>,
    digest: String,
}

impl ManifestModel {
    /// Validate a raw manifest and build the model.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Invalid`] carrying every violation found.
    pub fn load(raw: &RawManifest) -> Result<Self, ManifestError> {
        let v = validate(raw).map_err(|violations| ManifestError::Invalid { violations })?;

        let mut path_bindings = v.path_bindings;
        path_bindings.sort_by(|a, b| a.0.resource_id.cmp(&b.0.resource_id));
        let mut symbol_bindings = v.symbol_bindings;
        symbol_bindings.sort_by(|a, b| a.resource_id.cmp(&b.resource_id));
        let mut region_bindings = v.region_bindings;
        region_bindings.sort_by(|a, b| a.resource_id.cmp(&b.resource_id));
        let mut edges = v.edges;
        edges.sort();
        edges.dedup();

        let region_owner = region_bindings
            .iter()
            .map(|b| (b.region_id.clone(), b.resource_id.clone()))
            .collect();

        let mut model = Self {
            resources: v.resources.into_iter().map(|r| (r.id.clone(), r)).collect(),
            path_bindings,
            symbol_bindings,
            patterns: v.patterns,
            region_bindings,
            region_owner,
            invariants: v.invariants.into_iter().map(|i| (i.id.clone(), i)).collect(),
            adrs: v.adrs.into_iter().map(|a| (a.id.clone(), a)).collect(),
            checks: v.checks.into_iter().map(|c| (c.id.clone(), c)).collect(),
            edges,
            digest: String::new(),
        };
        model.digest = model.compute_digest();

        tracing::debug!(
            resources = model.resources.len(),
            edges = model.edges.len(),
            digest = %model.digest,
            "manifest loaded"
        );
        Ok(model)
    }

    /// Parse TOML source and load it.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] or [`ManifestError::Invalid`].
    pub fn from_toml_str(source: &str) -> Result<Self, ManifestError> {
        Self::load(&RawManifest::from_toml_str(source)?)
    }

    fn compute_digest(&self) -> String {
        let paths: Vec<&PathBinding> = self.path_bindings.iter().map(|(b, _)| b).collect();
        let snapshot = (
            &self.resources,
            paths,
            &self.symbol_bindings,
            &self.region_bindings,
            &self.invariants,
            &self.adrs,
            &self.checks,
            &self.edges,
        );
        let bytes = serde_json::to_vec(&snapshot).unwrap_or_default();
        format!("{:x}", Sha256::digest(&bytes))
    }

    /// Hex SHA-256 over the normalized model. Equal manifests share a digest.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    #[must_use]
    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    /// All resources, id ascending.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    #[must_use]
    pub fn resources_by_tag(&self, tag: &str) -> Vec<&Resource> {
        self.resources()
            .filter(|r| r.tags.iter().any(|t| t == tag))
            .collect()
    }

    #[must_use]
    pub fn resources_by_severity(&self, severity: Severity) -> Vec<&Resource> {
        self.resources()
            .filter(|r| r.severity == severity)
            .collect()
    }

    /// Resources owning at least one path binding that may overlap `glob`.
    #[must_use]
    pub fn resources_by_path_glob(&self, glob: &str) -> Vec<&Resource> {
        let ids: BTreeSet<&str> = self
            .path_bindings
            .iter()
            .filter(|(b, _)| globs_intersect(&b.glob, glob))
            .map(|(b, _)| b.resource_id.as_str())
            .collect();
        ids.into_iter().filter_map(|id| self.resource(id)).collect()
    }

    pub fn path_bindings(&self) -> impl Iterator<Item = &PathBinding> {
        self.path_bindings.iter().map(|(b, _)| b)
    }

    /// Path bindings whose glob matches `path`, in binding order.
    pub fn matching_path_bindings<'a>(
        &'a self,
        path: &'a str,
    ) -> impl Iterator<Item = &'a PathBinding> + 'a {
        self.path_bindings
            .iter()
            .filter(move |(_, m)| m.is_match(path))
            .map(|(b, _)| b)
    }

    #[must_use]
    pub fn symbol_bindings(&self) -> &[SymbolBinding] {
        &self.symbol_bindings
    }

    /// Compiled regex of a `pattern` symbol binding.
    #[must_use]
    pub fn symbol_pattern(&self, pattern: &str) -> Option<&Regex> {
        self.patterns.get(pattern)
    }

    /// Distinct custom queries declared for `lang`, ascending.
    #[must_use]
    pub fn queries_for(&self, lang: &str) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .symbol_bindings
            .iter()
            .filter(|b| b.lang == lang)
            .filter_map(|b| match &b.selector {
                SymbolSelector::Query(q) => Some(q.as_str()),
                _ => None,
            })
            .collect();
        set.into_iter().collect()
    }

    #[must_use]
    pub fn region_bindings(&self) -> &[RegionBinding] {
        &self.region_bindings
    }

    /// Resource bound to a region id.
    #[must_use]
    pub fn region_owner(&self, region_id: &str) -> Option<&str> {
        self.region_owner.get(region_id).map(String::as_str)
    }

    #[must_use]
    pub fn check(&self, id: &str) -> Option<&CheckDef> {
        self.checks.get(id)
    }

    pub fn checks(&self) -> impl Iterator<Item = &CheckDef> {
        self.checks.values()
    }

    #[must_use]
    pub fn invariant(&self, id: &str) -> Option<&Invariant> {
        self.invariants.get(id)
    }

    pub fn invariants(&self) -> impl Iterator<Item = &Invariant> {
        self.invariants.values()
    }

    #[must_use]
    pub fn adr(&self, id: &str) -> Option<&AdrCapsule> {
        self.adrs.get(id)
    }

    pub fn adrs(&self) -> impl Iterator<Item = &AdrCapsule> {
        self.adrs.values()
    }

    /// Declared edges plus `depends-on` edges from `deps`, sorted and deduplicated.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Check ids a change to `resource_id` must run, ascending and unique.
    #[must_use]
    pub fn required_checks(&self, resource_id: &str) -> Vec<String> {
        let Some(resource) = self.resource(resource_id) else {
            return Vec::new();
        };
        let set: BTreeSet<&String> = resource.checks.iter().collect();
        set.into_iter().cloned().collect()
    }
}
