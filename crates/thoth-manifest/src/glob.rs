//! Glob compilation and intersection shared by matching and lookups.
//!
//! `**` spans directory boundaries; `*` and `?` never cross a `/`.

use globset::{GlobBuilder, GlobMatcher};

/// Compile a path binding glob with literal-separator semantics.
///
/// # Errors
///
/// Returns the globset error for malformed patterns.
pub fn compile_glob(glob: &str) -> Result<GlobMatcher, globset::Error> {
    Ok(GlobBuilder::new(glob)
        .literal_separator(true)
        .build()?
        .compile_matcher())
}

/// Directory part of a glob before its first metacharacter.
#[must_use]
pub fn literal_prefix(glob: &str) -> &str {
    let meta = glob.find(['*', '?', '[', '{']).unwrap_or(glob.len());
    if meta == glob.len() {
        return glob;
    }
    glob[..meta].rfind('/').map_or("", |slash| &glob[..=slash])
}

/// Whether two globs may match a common path.
///
/// Conservative: true when either glob matches the other's text, or when
/// their literal directory prefixes nest. Never false for globs that share
/// a concrete match.
#[must_use]
pub fn globs_intersect(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    if let (Ok(ma), Ok(mb)) = (compile_glob(a), compile_glob(b))
        && (ma.is_match(b) || mb.is_match(a))
    {
        return true;
    }
    let (pa, pb) = (literal_prefix(a), literal_prefix(b));
    let a_is_literal = pa == a;
    let b_is_literal = pb == b;
    match (a_is_literal, b_is_literal) {
        (true, true) => false,
        (true, false) => a.starts_with(pb),
        (false, true) => b.starts_with(pa),
        (false, false) => pa.starts_with(pb) || pb.starts_with(pa),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_star_spans_directories() {
        let m = compile_glob("pkg/storage/wal/**").unwrap();
        assert!(m.is_match("pkg/storage/wal/x.go"));
        assert!(m.is_match("pkg/storage/wal/segment/reader.go"));
        assert!(!m.is_match("pkg/storage/other/y.go"));
    }

    #[test]
    fn single_star_stays_in_directory() {
        let m = compile_glob("src/*.rs").unwrap();
        assert!(m.is_match("src/lib.rs"));
        assert!(!m.is_match("src/nested/mod.rs"));
    }

    #[test]
    fn literal_prefix_stops_at_last_separator_before_meta() {
        assert_eq!(literal_prefix("pkg/storage/wal/**"), "pkg/storage/wal/");
        assert_eq!(literal_prefix("pkg/stor*/x"), "pkg/");
        assert_eq!(literal_prefix("*.go"), "");
        assert_eq!(literal_prefix("README.md"), "README.md");
    }

    #[test]
    fn nested_globs_intersect() {
        assert!(globs_intersect("pkg/storage/**", "pkg/storage/wal/*.go"));
        assert!(globs_intersect("pkg/storage/wal/x.go", "pkg/storage/**"));
        assert!(!globs_intersect("pkg/api/*.go", "pkg/storage/**"));
        assert!(!globs_intersect("a.txt", "b.txt"));
    }
}
