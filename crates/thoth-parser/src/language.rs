//! Language detection and the parse capability registry.
//!
//! A capability is registered per language tag; adding a language means
//! registering another [`ParseCapability`], nothing else changes.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thoth_core::enums::SymbolKind;

use crate::ast::AstGrepCapability;
use crate::error::ParserError;

pub const RUST: &str = "rust";
pub const GO: &str = "go";
pub const PYTHON: &str = "python";
pub const TYPESCRIPT: &str = "typescript";
pub const TSX: &str = "tsx";
pub const JAVASCRIPT: &str = "javascript";
pub const JAVA: &str = "java";

/// Detect the language tag from a file path extension.
///
/// Returns `None` for unsupported or unrecognized extensions.
#[must_use]
pub fn detect_language(file_path: &str) -> Option<&'static str> {
    let name = file_path.rsplit('/').next()?;
    let (_, ext) = name.rsplit_once('.')?;
    match ext {
        "rs" => Some(RUST),
        "go" => Some(GO),
        "py" | "pyi" => Some(PYTHON),
        "ts" | "mts" | "cts" => Some(TYPESCRIPT),
        "tsx" => Some(TSX),
        "js" | "mjs" | "cjs" | "jsx" => Some(JAVASCRIPT),
        "java" => Some(JAVA),
        _ => None,
    }
}

/// Where the module part of an FQN comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStyle {
    /// File path with the extension stripped.
    FilePath,
    /// Directory containing the file (Go packages).
    Directory,
    /// Module declared in the source (Java `package`), else the directory.
    Declared,
}

/// Per-language FQN template: `module <sep> scope... <sep> name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FqnTemplate {
    pub separator: &'static str,
    pub module: ModuleStyle,
    /// Trailing file stems that name their directory (`mod`, `__init__`, `index`).
    pub index_stems: &'static [&'static str],
    /// Top-level names a language lets every file of one module declare
    /// (Go `init`). Their FQN gains a `#<file stem>` suffix.
    pub file_scoped: &'static [&'static str],
}

/// One structural match reported by a capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Bare name. Empty for captures outside any declaration.
    pub name: String,
    /// Appended to the name in the FQN to separate overloads, e.g. `(int,String)`.
    pub disambiguator: Option<String>,
    pub kind: SymbolKind,
    /// Enclosing container names, outermost first.
    pub scope: Vec<String>,
    pub start_line: u32,
    pub end_line: u32,
    pub signature_text: String,
    pub body_hash: String,
}

/// A parsed source file.
pub trait SyntaxTree {
    /// Module name declared in the source, when the language has one.
    fn declared_module(&self) -> Option<String>;

    /// Declarations in source order.
    fn definitions(&self) -> Vec<Capture>;

    /// Declarations captured by a custom structural query, in source order.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::InvalidQuery`] when the query does not compile.
    fn query(&self, query: &str) -> Result<Vec<Capture>, ParserError>;
}

/// Parse capability for one language.
pub trait ParseCapability: Send + Sync {
    fn lang(&self) -> &str;

    fn template(&self) -> FqnTemplate;

    /// Parse source text.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::ParseFailed`] when the syntax tree has errors.
    fn parse(&self, source: &str) -> Result<Box<dyn SyntaxTree>, ParserError>;
}

/// Capabilities keyed by language tag.
#[derive(Clone, Default)]
pub struct LanguageRegistry {
    capabilities: BTreeMap<String, Arc<dyn ParseCapability>>,
}

impl LanguageRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the ast-grep capability for every built-in language.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for cap in AstGrepCapability::all() {
            registry.register(Arc::new(cap));
        }
        registry
    }

    /// Register (or replace) the capability for its language tag.
    pub fn register(&mut self, capability: Arc<dyn ParseCapability>) {
        self.capabilities
            .insert(capability.lang().to_string(), capability);
    }

    #[must_use]
    pub fn get(&self, lang: &str) -> Option<Arc<dyn ParseCapability>> {
        self.capabilities.get(lang).cloned()
    }

    #[must_use]
    pub fn supports(&self, lang: &str) -> bool {
        self.capabilities.contains_key(lang)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.capabilities.keys().map(String::as_str)
    }
}

impl fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageRegistry")
            .field("languages", &self.capabilities.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_supported_languages() {
        assert_eq!(detect_language("src/main.rs"), Some(RUST));
        assert_eq!(detect_language("pkg/storage/wal/x.go"), Some(GO));
        assert_eq!(detect_language("app/__init__.py"), Some(PYTHON));
        assert_eq!(detect_language("web/index.ts"), Some(TYPESCRIPT));
        assert_eq!(detect_language("web/App.tsx"), Some(TSX));
        assert_eq!(detect_language("web/util.mjs"), Some(JAVASCRIPT));
        assert_eq!(detect_language("src/main/java/Foo.java"), Some(JAVA));
    }

    #[test]
    fn detect_unknown_returns_none() {
        assert_eq!(detect_language("data.csv"), None);
        assert_eq!(detect_language("Makefile"), None);
        assert_eq!(detect_language("dir.rs/README"), None);
    }

    #[test]
    fn default_registry_covers_builtin_languages() {
        let registry = LanguageRegistry::with_defaults();
        let langs: Vec<&str> = registry.languages().collect();
        assert_eq!(
            langs,
            vec![GO, JAVA, JAVASCRIPT, PYTHON, RUST, TSX, TYPESCRIPT]
        );
        assert!(!registry.supports("cobol"));
    }
}
