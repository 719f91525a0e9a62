use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use thoth_core::entities::{Diff, FileChange, FileDiagnostic, Region, Symbol, TouchResult, UnknownPath};
use thoth_core::enums::{ChangeKind, DiagnosticStage};
use thoth_manifest::ManifestModel;
use thoth_parser::{
    ExtractLimits, LanguageRegistry, ParserError, RegionError, RegionScanner, ScanOptions,
    SymbolDiffer, SymbolExtractor,
};

use crate::error::TouchError;
use crate::matcher::{self, RegionChange};

/// Knobs of the classification pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub scan: ScanOptions,
    pub limits: ExtractLimits,
    pub rename_threshold: f64,
    /// Worker threads for per-file work; `0` uses the global rayon pool.
    pub workers: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            scan: ScanOptions::default(),
            limits: ExtractLimits::default(),
            rename_threshold: thoth_parser::differ::DEFAULT_RENAME_THRESHOLD,
            workers: 0,
        }
    }
}

/// Per-revision structural facts of one file.
#[derive(Debug, Default)]
pub(crate) struct FileFacts {
    pub regions: Vec<Region>,
    pub symbols: Vec<Symbol>,
    pub diagnostics: Vec<FileDiagnostic>,
}

#[derive(Debug, Default)]
struct FileOutcome {
    old: FileFacts,
    new: FileFacts,
}

/// Orchestrates region scanning, symbol extraction and diffing, and binding
/// matching over one logical diff.
#[derive(Debug)]
pub struct ClassificationPipeline {
    scanner: RegionScanner,
    extractor: SymbolExtractor,
    differ: SymbolDiffer,
    pool: Option<rayon::ThreadPool>,
}

impl ClassificationPipeline {
    /// Build a pipeline with the default language registry.
    ///
    /// # Errors
    ///
    /// Returns [`TouchError`] for an invalid threshold or when the worker
    /// pool cannot be created.
    pub fn new(options: PipelineOptions) -> Result<Self, TouchError> {
        Self::with_registry(options, LanguageRegistry::with_defaults())
    }

    /// Build a pipeline over a custom capability registry.
    ///
    /// # Errors
    ///
    /// Same as [`ClassificationPipeline::new`].
    pub fn with_registry(
        options: PipelineOptions,
        registry: LanguageRegistry,
    ) -> Result<Self, TouchError> {
        if options.rename_threshold.is_nan() || options.rename_threshold < 0.0 {
            return Err(TouchError::InvalidOption(format!(
                "rename threshold {} must be >= 0",
                options.rename_threshold
            )));
        }
        let pool = if options.workers > 0 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(options.workers)
                    .thread_name(|i| format!("thoth-worker-{i}"))
                    .build()?,
            )
        } else {
            None
        };
        Ok(Self {
            scanner: RegionScanner::new(options.scan),
            extractor: SymbolExtractor::new(registry, options.limits),
            differ: SymbolDiffer::new(options.rename_threshold),
            pool,
        })
    }

    /// Run `f` on the configured pool.
    pub(crate) fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }

    /// Classify a diff. Never fails: per-file problems become diagnostics and
    /// mark the result incomplete.
    #[must_use]
    pub fn classify(&self, model: &ManifestModel, diff: &Diff) -> TouchResult {
        let mut files: Vec<&FileChange> = diff.files.iter().collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let outcomes: Vec<FileOutcome> = self.install(|| {
            files
                .par_iter()
                .map(|f| FileOutcome {
                    old: self.facts(model, &f.path, f.lang.as_deref(), f.old.as_deref(), f.binary),
                    new: self.facts(model, &f.path, f.lang.as_deref(), f.new.as_deref(), f.binary),
                })
                .collect()
        });

        let mut diagnostics: Vec<FileDiagnostic> = Vec::new();
        let mut old_regions: Vec<Region> = Vec::new();
        let mut new_regions: Vec<Region> = Vec::new();
        let mut old_symbols: Vec<Symbol> = Vec::new();
        let mut new_symbols: Vec<Symbol> = Vec::new();

        for (file, outcome) in files.iter().zip(outcomes) {
            let region_failed = has_stage(&outcome, DiagnosticStage::RegionScan);
            let symbols_failed = has_stage(&outcome, DiagnosticStage::SymbolParse)
                || has_stage(&outcome, DiagnosticStage::SymbolResolution);
            for d in outcome.old.diagnostics.iter().chain(&outcome.new.diagnostics) {
                if !diagnostics.contains(d) {
                    diagnostics.push(d.clone());
                }
            }
            if !region_failed {
                old_regions.extend(outcome.old.regions);
                new_regions.extend(outcome.new.regions);
            }
            if !symbols_failed {
                old_symbols.extend(outcome.old.symbols);
                new_symbols.extend(outcome.new.symbols);
            } else {
                tracing::warn!(file = %file.path, "symbol analysis degraded to path-only");
            }
        }

        let collisions = merge_collisions(
            symbol_collisions(&old_symbols),
            symbol_collisions(&new_symbols),
        );
        for (path, message) in &collisions {
            tracing::warn!(file = %path, %message, "symbol analysis degraded to path-only");
            let d = FileDiagnostic {
                path: path.clone(),
                stage: DiagnosticStage::SymbolResolution,
                message: message.clone(),
            };
            if !diagnostics.contains(&d) {
                diagnostics.push(d);
            }
        }
        old_symbols.retain(|s| !collisions.contains_key(&s.file_path));
        new_symbols.retain(|s| !collisions.contains_key(&s.file_path));

        let old_regions = dedupe_regions(old_regions, &mut diagnostics);
        let new_regions = dedupe_regions(new_regions, &mut diagnostics);
        let region_changes = region_changes(&old_regions, &new_regions);
        let symbol_diff = self.differ.diff(&old_symbols, &new_symbols);
        let symbol_changes = matcher::symbol_changes(&symbol_diff);

        let changed: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        let path_matches = matcher::match_paths(&changed, model);
        let region_matches = matcher::match_regions(&region_changes, model);
        diagnostics.extend(matcher::region_owner_mismatches(&region_changes, model));
        let symbol_matches = matcher::match_symbols(&symbol_changes, model);
        let touched = matcher::merge(model, &path_matches, &region_matches, &symbol_matches);

        let mut covered: BTreeSet<&str> = BTreeSet::new();
        for m in &path_matches {
            covered.insert(m.path.as_str());
        }
        for c in &region_changes {
            if region_matches.iter().any(|m| m.region_id == c.region_id) {
                covered.insert(c.file_path.as_str());
            }
        }
        for c in &symbol_changes {
            if symbol_matches.iter().any(|m| m.fqname == c.fqname) {
                covered.insert(c.file_path.as_str());
            }
        }

        diagnostics.sort_by(|a, b| (&a.path, a.stage).cmp(&(&b.path, b.stage)));
        let unknown = unknown_paths(&changed, &covered, &diagnostics);
        let incomplete = diagnostics.iter().any(|d| d.stage.degrades());

        tracing::debug!(
            files = files.len(),
            touched = touched.len(),
            unknown = unknown.len(),
            incomplete,
            "classified diff"
        );
        TouchResult {
            touched,
            unknown,
            diagnostics,
            incomplete,
        }
    }

    /// Regions and symbols of one file at one revision.
    pub(crate) fn facts(
        &self,
        model: &ManifestModel,
        path: &str,
        lang: Option<&str>,
        content: Option<&str>,
        binary: bool,
    ) -> FileFacts {
        let mut facts = FileFacts::default();
        let Some(content) = content.filter(|_| !binary) else {
            return facts;
        };

        match self.scanner.scan(path, content) {
            Ok(regions) => facts.regions = regions,
            Err(e) => facts
                .diagnostics
                .push(region_diagnostic(path, &e)),
        }

        if let Some(lang) = lang.filter(|l| self.extractor.supports(l)) {
            let queries: Vec<String> = model
                .queries_for(lang)
                .into_iter()
                .map(ToString::to_string)
                .collect();
            match self.extractor.extract(path, content, lang, &queries) {
                Ok(table) => facts.symbols = table.symbols,
                Err(e) => facts.diagnostics.push(symbol_diagnostic(path, &e)),
            }
        }
        facts
    }

    pub(crate) const fn scanner(&self) -> &RegionScanner {
        &self.scanner
    }

    pub(crate) const fn extractor(&self) -> &SymbolExtractor {
        &self.extractor
    }
}

fn has_stage(outcome: &FileOutcome, stage: DiagnosticStage) -> bool {
    outcome
        .old
        .diagnostics
        .iter()
        .chain(&outcome.new.diagnostics)
        .any(|d| d.stage == stage)
}

pub(crate) fn region_diagnostic(path: &str, err: &RegionError) -> FileDiagnostic {
    tracing::warn!(file = path, error = %err, "region scan failed");
    FileDiagnostic {
        path: path.to_string(),
        stage: DiagnosticStage::RegionScan,
        message: err.to_string(),
    }
}

pub(crate) fn symbol_diagnostic(path: &str, err: &ParserError) -> FileDiagnostic {
    tracing::warn!(file = path, error = %err, "symbol extraction failed");
    FileDiagnostic {
        path: path.to_string(),
        stage: if err.is_resolution() {
            DiagnosticStage::SymbolResolution
        } else {
            DiagnosticStage::SymbolParse
        },
        message: err.to_string(),
    }
}

/// Enforce region-id uniqueness across files: the first file in path order
/// keeps the id, every later file loses all of its regions.
pub(crate) fn dedupe_regions(
    regions: Vec<Region>,
    diagnostics: &mut Vec<FileDiagnostic>,
) -> Vec<Region> {
    let mut owner: BTreeMap<String, (String, u32)> = BTreeMap::new();
    let mut rejected: BTreeMap<String, RegionError> = BTreeMap::new();
    for r in &regions {
        match owner.get(&r.region_id) {
            Some((first_path, first_line)) if *first_path != r.file_path => {
                rejected.entry(r.file_path.clone()).or_insert_with(|| {
                    RegionError::DuplicateId {
                        id: r.region_id.clone(),
                        line: r.start_line,
                        first: format!("{first_path}:{first_line}"),
                    }
                });
            }
            Some(_) => {}
            None => {
                owner.insert(r.region_id.clone(), (r.file_path.clone(), r.start_line));
            }
        }
    }
    for (path, err) in &rejected {
        let d = region_diagnostic(path, err);
        if !diagnostics.contains(&d) {
            diagnostics.push(d);
        }
    }
    regions
        .into_iter()
        .filter(|r| !rejected.contains_key(&r.file_path))
        .collect()
}

/// Files repeating a `(query, fqname)` key already declared by an earlier
/// file in path order, each with the first collision found.
///
/// `symbols` must be grouped by file in path order.
pub(crate) fn symbol_collisions(symbols: &[Symbol]) -> BTreeMap<String, String> {
    let mut owner: BTreeMap<(Option<&str>, &str), (&str, u32)> = BTreeMap::new();
    let mut rejected: BTreeMap<String, String> = BTreeMap::new();
    for s in symbols {
        let key = (s.query.as_deref(), s.fqname.as_str());
        match owner.get(&key) {
            Some((first, line)) if *first != s.file_path => {
                rejected.entry(s.file_path.clone()).or_insert_with(|| {
                    format!(
                        "duplicate fqname '{}' at line {} (first defined in {first}:{line})",
                        s.fqname, s.start_line
                    )
                });
            }
            Some(_) => {}
            None => {
                owner.insert(key, (s.file_path.as_str(), s.start_line));
            }
        }
    }
    rejected
}

/// Union of both revisions' collisions; the old revision's message wins.
fn merge_collisions(
    mut old: BTreeMap<String, String>,
    new: BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    for (path, message) in new {
        old.entry(path).or_insert(message);
    }
    old
}

/// Regions touched between two revisions, ordered by `(file, line, id)`.
fn region_changes(old: &[Region], new: &[Region]) -> Vec<RegionChange> {
    let old_by_id: BTreeMap<&str, &Region> = old.iter().map(|r| (r.region_id.as_str(), r)).collect();
    let new_by_id: BTreeMap<&str, &Region> = new.iter().map(|r| (r.region_id.as_str(), r)).collect();

    let mut changes: Vec<(&Region, ChangeKind)> = Vec::new();
    for (id, n) in &new_by_id {
        match old_by_id.get(id) {
            None => changes.push((n, ChangeKind::Added)),
            Some(o) if o.canonical_hash != n.canonical_hash => {
                changes.push((n, ChangeKind::Modified));
            }
            Some(_) => {}
        }
    }
    for (id, o) in &old_by_id {
        if !new_by_id.contains_key(id) {
            changes.push((o, ChangeKind::Removed));
        }
    }
    changes.sort_by(|(a, _), (b, _)| {
        (&a.file_path, a.start_line, &a.region_id).cmp(&(&b.file_path, b.start_line, &b.region_id))
    });
    changes
        .into_iter()
        .map(|(r, change)| RegionChange {
            region_id: r.region_id.clone(),
            marker_resource: r.resource_id.clone(),
            file_path: r.file_path.clone(),
            change,
        })
        .collect()
}

fn unknown_paths(
    changed: &[&str],
    covered: &BTreeSet<&str>,
    diagnostics: &[FileDiagnostic],
) -> Vec<UnknownPath> {
    let mut out: Vec<UnknownPath> = Vec::new();
    for path in changed {
        let mut notes: Vec<String> = Vec::new();
        if !covered.contains(path) {
            notes.push("no binding claims this path".to_string());
        }
        for d in diagnostics
            .iter()
            .filter(|d| d.path == *path && d.stage.degrades())
        {
            notes.push(format!("{} failed: {}", d.stage, d.message));
        }
        if !notes.is_empty() {
            out.push(UnknownPath {
                path: (*path).to_string(),
                note: notes.join("; "),
            });
        }
    }
    out
}
