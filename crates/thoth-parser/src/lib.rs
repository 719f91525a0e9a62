//! # thoth-parser
//!
//! Structural fact extraction for Thoth.
//!
//! - [`region::RegionScanner`]: begin/end tagged regions with canonical
//!   SHA-256 hashes, tracked by an explicit `Closed`/`Open` state machine
//! - [`language::LanguageRegistry`]: parse capabilities keyed by language tag;
//!   the default registry is backed by ast-grep
//! - [`extractor::SymbolExtractor`]: resolves captures into fully-qualified
//!   symbol tables, one per `(file, revision, language)`
//! - [`differ::SymbolDiffer`]: added/removed/modified/renamed diffs between
//!   two symbol tables
//!
//! Everything here is a pure function of its inputs. Per-file failures are
//! returned as errors for the caller to record; nothing panics or aborts a
//! multi-file run.

pub mod ast;
pub mod differ;
pub mod error;
pub mod extractor;
pub mod hash;
pub mod language;
pub mod region;

pub use differ::{ModifiedSymbol, RenamedSymbol, SymbolDiff, SymbolDiffer};
pub use error::{ParserError, RegionError};
pub use extractor::{ExtractLimits, SymbolExtractor, SymbolTable};
pub use language::{
    Capture, FqnTemplate, LanguageRegistry, ModuleStyle, ParseCapability, SyntaxTree,
    detect_language,
};
pub use region::{RegionScanner, ScanOptions};
