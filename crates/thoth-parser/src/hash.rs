//! Canonical content hashing.

use sha2::{Digest, Sha256};

/// Normalize line endings to `\n`, trim trailing whitespace per line, and
/// terminate every line with `\n`. Interior whitespace is preserved.
#[must_use]
pub fn canonicalize<'a>(lines: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Split text into lines, treating `\r\n`, `\r` and `\n` as terminators.
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;
    while let Some(idx) = rest.find(['\r', '\n']) {
        lines.push(&rest[..idx]);
        let skip = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[idx + skip..];
    }
    if !rest.is_empty() {
        lines.push(rest);
    }
    lines
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Hash of `text` after canonicalization.
#[must_use]
pub fn canonical_hash(text: &str) -> String {
    sha256_hex(canonicalize(split_lines(text)).as_bytes())
}
