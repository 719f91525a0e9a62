//! Working-tree reads, honoring `.gitignore`.

use std::collections::BTreeMap;
use std::path::Path;

use ignore::WalkBuilder;

use crate::error::VcsError;

/// Directories never read from the working tree.
const SKIPPED_DIRS: &[&str] = &[".git", ".thoth", ".jj"];

/// Every non-ignored file under `root`, keyed by `/`-separated relative path.
pub fn read_tree(root: &Path) -> Result<BTreeMap<String, Vec<u8>>, VcsError> {
    let mut builder = WalkBuilder::new(root);
    builder.hidden(false);
    builder.filter_entry(|entry| {
        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
        !(is_dir && SKIPPED_DIRS.contains(&entry.file_name().to_string_lossy().as_ref()))
    });

    let mut files = BTreeMap::new();
    for entry in builder.build() {
        let entry = entry?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.insert(key, std::fs::read(entry.path())?);
    }
    tracing::debug!(root = %root.display(), files = files.len(), "read working tree");
    Ok(files)
}

/// Text content of a blob, `None` when it looks binary.
pub fn decode(bytes: Vec<u8>) -> Option<String> {
    let head = &bytes[..bytes.len().min(8000)];
    if head.contains(&0) {
        return None;
    }
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn decode_rejects_nul_and_invalid_utf8() {
        assert_eq!(decode(b"fn main() {}\n".to_vec()).as_deref(), Some("fn main() {}\n"));
        assert_eq!(decode(vec![0x7f, 0x45, 0x00, 0x01]), None);
        assert_eq!(decode(vec![0xff, 0xfe, 0x41]), None);
    }

    #[test]
    fn read_tree_skips_gitignored_and_state_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::create_dir_all(root.join(".thoth")).unwrap();
        std::fs::create_dir_all(root.join("target")).unwrap();
        std::fs::write(root.join("src/lib.rs"), "pub fn a() {}\n").unwrap();
        std::fs::write(root.join(".thoth/index.db"), "x").unwrap();
        std::fs::write(root.join("target/out"), "x").unwrap();
        std::fs::write(root.join(".gitignore"), "target/\n").unwrap();
        // The ignore crate only applies .gitignore inside a git repository.
        std::fs::create_dir_all(root.join(".git")).unwrap();

        let files = read_tree(root).unwrap();
        let paths: Vec<&str> = files.keys().map(String::as_str).collect();
        assert_eq!(paths, vec![".gitignore", "src/lib.rs"]);
    }
}
