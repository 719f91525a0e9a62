//! Parser error types for thoth-parser.

use std::time::Duration;

/// Errors from symbol extraction. All of them are per-file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParserError {
    #[error("Parse failed for {language}: {message}")]
    ParseFailed { language: String, message: String },

    #[error("Language not supported: {0}")]
    UnsupportedLanguage(String),

    #[error("Invalid query for {language} '{query}': {reason}")]
    InvalidQuery {
        language: String,
        query: String,
        reason: String,
    },

    #[error("Symbol resolution failed: duplicate fqname '{fqname}' at lines {first} and {second}")]
    DuplicateSymbol {
        fqname: String,
        first: u32,
        second: u32,
    },

    #[error("File too large for symbol analysis: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    #[error("Symbol extraction exceeded {0:?}")]
    Timeout(Duration),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),
}

impl ParserError {
    /// Whether this is a resolution failure rather than a parse failure.
    #[must_use]
    pub const fn is_resolution(&self) -> bool {
        matches!(self, Self::DuplicateSymbol { .. })
    }
}

/// Errors from region scanning. Fatal for the offending file's region set only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    #[error("line {line}: malformed region marker: {reason}")]
    Malformed { line: u32, reason: String },

    #[error("line {line}: region '{id}' already declared at {first}")]
    DuplicateId { id: String, line: u32, first: String },

    #[error("line {line}: region '{id}' begins inside open region '{open}' (nesting disabled)")]
    Nesting { id: String, open: String, line: u32 },

    #[error("line {line}: region '{id}' is never closed")]
    Unterminated { id: String, line: u32 },

    #[error("line {line}: END for '{id}' does not close the open region{}", expected_suffix(.expected.as_deref()))]
    UnmatchedEnd {
        id: String,
        expected: Option<String>,
        line: u32,
    },
}

fn expected_suffix(expected: Option<&str>) -> String {
    expected.map_or_else(String::new, |e| format!(" '{e}'"))
}
