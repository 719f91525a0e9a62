//! FQN resolution over parse captures.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use thoth_core::entities::Symbol;

use crate::error::ParserError;
use crate::language::{Capture, FqnTemplate, LanguageRegistry, ModuleStyle, ParseCapability};

/// Per-file resource limits. Exceeding either degrades the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractLimits {
    pub max_file_bytes: usize,
    /// Wall-clock budget per parse; `None` runs inline without a budget.
    pub timeout: Option<Duration>,
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: 1024 * 1024,
            timeout: Some(Duration::from_millis(2000)),
        }
    }
}

/// Symbols of one `(file, revision, language)`.
///
/// Ordered by start line, then query (plain declarations first), then fqname.
/// Plain declarations have unique fqnames; query captures are keyed by
/// `(query, fqname)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    pub file_path: String,
    pub lang: String,
    pub symbols: Vec<Symbol>,
}

struct Parsed {
    module: Option<String>,
    definitions: Vec<Capture>,
    queries: Vec<(String, Vec<Capture>)>,
}

/// Produces symbol tables through the capability registry.
#[derive(Debug, Clone)]
pub struct SymbolExtractor {
    registry: LanguageRegistry,
    limits: ExtractLimits,
}

impl Default for SymbolExtractor {
    fn default() -> Self {
        Self::new(LanguageRegistry::with_defaults(), ExtractLimits::default())
    }
}

impl SymbolExtractor {
    #[must_use]
    pub const fn new(registry: LanguageRegistry, limits: ExtractLimits) -> Self {
        Self { registry, limits }
    }

    #[must_use]
    pub const fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    #[must_use]
    pub fn supports(&self, lang: &str) -> bool {
        self.registry.supports(lang)
    }

    /// Extract the symbol table of one file.
    ///
    /// `queries` are the custom structural queries active for this language;
    /// their captures are added with `query` set.
    ///
    /// # Errors
    ///
    /// Per-file only: unsupported language, oversize file, timeout, parse
    /// failure, invalid query, or duplicate fqname.
    pub fn extract(
        &self,
        file_path: &str,
        content: &str,
        lang: &str,
        queries: &[String],
    ) -> Result<SymbolTable, ParserError> {
        let capability = self
            .registry
            .get(lang)
            .ok_or_else(|| ParserError::UnsupportedLanguage(lang.to_string()))?;
        if content.len() > self.limits.max_file_bytes {
            return Err(ParserError::TooLarge {
                size: content.len(),
                limit: self.limits.max_file_bytes,
            });
        }

        let template = capability.template();
        let parsed = match self.limits.timeout {
            Some(budget) => run_with_budget(capability, content, queries, budget)?,
            None => run(capability.as_ref(), content, queries)?,
        };
        let table = resolve(file_path, lang, template, parsed)?;
        tracing::debug!(file = file_path, lang, symbols = table.symbols.len(), "symbols extracted");
        Ok(table)
    }
}

fn run(
    capability: &dyn ParseCapability,
    content: &str,
    queries: &[String],
) -> Result<Parsed, ParserError> {
    let tree = capability.parse(content)?;
    let mut query_captures = Vec::with_capacity(queries.len());
    for q in queries {
        query_captures.push((q.clone(), tree.query(q)?));
    }
    Ok(Parsed {
        module: tree.declared_module(),
        definitions: tree.definitions(),
        queries: query_captures,
    })
}

/// Parse on a helper thread so a pathological file cannot stall the caller.
/// A timed-out parse is abandoned; its thread finishes in the background.
fn run_with_budget(
    capability: Arc<dyn ParseCapability>,
    content: &str,
    queries: &[String],
    budget: Duration,
) -> Result<Parsed, ParserError> {
    let (tx, rx) = mpsc::channel();
    let source = content.to_string();
    let queries = queries.to_vec();
    thread::Builder::new()
        .name("thoth-parse".to_string())
        .spawn(move || {
            let _ = tx.send(run(capability.as_ref(), &source, &queries));
        })
        .map_err(|e| ParserError::ExtractionFailed(e.to_string()))?;

    match rx.recv_timeout(budget) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(ParserError::Timeout(budget)),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(ParserError::ExtractionFailed(
            "parser thread exited without a result".to_string(),
        )),
    }
}

fn resolve(
    file_path: &str,
    lang: &str,
    template: FqnTemplate,
    parsed: Parsed,
) -> Result<SymbolTable, ParserError> {
    let module = module_path(file_path, template, parsed.module.as_deref());
    let mut symbols = Vec::with_capacity(parsed.definitions.len());

    let mut seen: BTreeMap<String, u32> = BTreeMap::new();
    for capture in parsed.definitions {
        let fqname = fqname(&module, template, &capture, file_path);
        if let Some(first) = seen.get(&fqname) {
            return Err(ParserError::DuplicateSymbol {
                fqname,
                first: *first,
                second: capture.start_line,
            });
        }
        seen.insert(fqname.clone(), capture.start_line);
        symbols.push(symbol(fqname, lang, file_path, capture, None));
    }

    for (query, captures) in parsed.queries {
        let mut seen_in_query = BTreeSet::new();
        for capture in captures {
            let fqname = fqname(&module, template, &capture, file_path);
            if !seen_in_query.insert(fqname.clone()) {
                continue;
            }
            symbols.push(symbol(fqname, lang, file_path, capture, Some(query.clone())));
        }
    }

    symbols.sort_by(|a, b| {
        (a.start_line, &a.query, &a.fqname).cmp(&(b.start_line, &b.query, &b.fqname))
    });
    Ok(SymbolTable {
        file_path: file_path.to_string(),
        lang: lang.to_string(),
        symbols,
    })
}

fn symbol(
    fqname: String,
    lang: &str,
    file_path: &str,
    capture: Capture,
    query: Option<String>,
) -> Symbol {
    Symbol {
        fqname,
        name: capture.name,
        lang: lang.to_string(),
        kind: capture.kind,
        scope: capture.scope,
        file_path: file_path.to_string(),
        start_line: capture.start_line,
        end_line: capture.end_line,
        signature_text: capture.signature_text,
        body_hash: capture.body_hash,
        query,
    }
}

/// Module part of an FQN for `file_path`.
#[must_use]
pub fn module_path(file_path: &str, template: FqnTemplate, declared: Option<&str>) -> String {
    let sep = template.separator;
    let mut segments: Vec<&str> = file_path.split('/').filter(|s| !s.is_empty()).collect();
    let file = segments.pop().unwrap_or_default();
    match (template.module, declared) {
        (ModuleStyle::Declared, Some(declared)) => declared.replace('.', sep),
        (ModuleStyle::Directory | ModuleStyle::Declared, _) => segments.join(sep),
        (ModuleStyle::FilePath, _) => {
            let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
            if !template.index_stems.contains(&stem) || segments.is_empty() {
                segments.push(stem);
            }
            segments.join(sep)
        }
    }
}

fn fqname(module: &str, template: FqnTemplate, capture: &Capture, file_path: &str) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(capture.scope.len() + 2);
    if !module.is_empty() {
        parts.push(module.to_string());
    }
    parts.extend(capture.scope.iter().cloned());
    if !capture.name.is_empty() {
        let mut leaf = capture.name.clone();
        if let Some(d) = &capture.disambiguator {
            leaf.push_str(d);
        } else if capture.scope.is_empty() && template.file_scoped.contains(&leaf.as_str()) {
            leaf.push('#');
            leaf.push_str(file_stem(file_path));
        }
        parts.push(leaf);
    }
    if parts.is_empty() {
        return file_path.to_string();
    }
    parts.join(template.separator)
}

fn file_stem(file_path: &str) -> &str {
    let file = file_path.rsplit('/').next().unwrap_or(file_path);
    file.rsplit_once('.').map_or(file, |(stem, _)| stem)
}
