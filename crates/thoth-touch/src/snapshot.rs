//! Full-tree structural facts for index builds.

use rayon::prelude::*;
use thoth_core::entities::{FileDiagnostic, Region, SourceFile, Symbol};
use thoth_core::enums::DiagnosticStage;

use crate::pipeline::{self, ClassificationPipeline, FileFacts};

/// Regions and plain symbols of a whole revision, with per-file failures.
#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    /// Ordered by `(file_path, start_line)`.
    pub regions: Vec<Region>,
    /// Ordered by `(file_path, start_line, fqname)`; fqnames are unique.
    pub symbols: Vec<Symbol>,
    pub degraded: Vec<FileDiagnostic>,
    pub files_scanned: usize,
}

impl Snapshot {
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

impl ClassificationPipeline {
    /// Scan every file of a revision. Custom queries are not run: their
    /// captures only matter while classifying a diff.
    #[must_use]
    pub fn snapshot(&self, files: &[SourceFile]) -> Snapshot {
        let mut files: Vec<&SourceFile> = files.iter().collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let facts: Vec<FileFacts> = self.install(|| {
            files
                .par_iter()
                .map(|f| self.file_snapshot(f))
                .collect()
        });

        let mut degraded: Vec<FileDiagnostic> = Vec::new();
        let mut regions = Vec::new();
        let mut symbols = Vec::new();
        for f in facts {
            degraded.extend(f.diagnostics);
            regions.extend(f.regions);
            symbols.extend(f.symbols);
        }

        let regions = pipeline::dedupe_regions(regions, &mut degraded);
        let symbols = dedupe_symbols(symbols, &mut degraded);
        degraded.sort_by(|a, b| (&a.path, a.stage).cmp(&(&b.path, b.stage)));

        tracing::info!(
            files = files.len(),
            regions = regions.len(),
            symbols = symbols.len(),
            degraded = degraded.len(),
            "snapshot collected"
        );
        Snapshot {
            regions,
            symbols,
            degraded,
            files_scanned: files.len(),
        }
    }

    fn file_snapshot(&self, file: &SourceFile) -> FileFacts {
        let mut facts = FileFacts::default();
        let Some(content) = file.content.as_deref() else {
            return facts;
        };
        match self.scanner().scan(&file.path, content) {
            Ok(regions) => facts.regions = regions,
            Err(e) => facts
                .diagnostics
                .push(pipeline::region_diagnostic(&file.path, &e)),
        }
        if let Some(lang) = file.lang.as_deref().filter(|l| self.extractor().supports(l)) {
            match self.extractor().extract(&file.path, content, lang, &[]) {
                Ok(table) => facts.symbols = table.symbols,
                Err(e) => facts
                    .diagnostics
                    .push(pipeline::symbol_diagnostic(&file.path, &e)),
            }
        }
        facts
    }
}

/// Keep the first definition of each fqname in path order; later files
/// declaring the same name are reported and dropped wholesale.
fn dedupe_symbols(symbols: Vec<Symbol>, degraded: &mut Vec<FileDiagnostic>) -> Vec<Symbol> {
    let rejected = pipeline::symbol_collisions(&symbols);
    for (path, message) in &rejected {
        tracing::warn!(file = %path, %message, "symbols dropped from snapshot");
        degraded.push(FileDiagnostic {
            path: path.clone(),
            stage: DiagnosticStage::SymbolResolution,
            message: message.clone(),
        });
    }
    symbols
        .into_iter()
        .filter(|s| !rejected.contains_key(&s.file_path))
        .collect()
}
