use std::path::{Path, PathBuf};

use anyhow::Context;

const THOTH_DIR: &str = ".thoth";

/// Nearest ancestor of `start` (inclusive) holding a `.thoth` directory.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(THOTH_DIR).is_dir())
        .map(Path::to_path_buf)
}

/// Resolve `--project`, accepting either the root or its `.thoth` directory.
/// Without an override the current directory is searched upwards.
pub fn resolve_project_root(project_override: Option<&str>) -> anyhow::Result<PathBuf> {
    let Some(path) = project_override else {
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        return find_project_root(&cwd)
            .with_context(|| format!("no {THOTH_DIR} directory in {} or above", cwd.display()));
    };

    let path = Path::new(path);
    let root = if path.ends_with(THOTH_DIR) {
        path.parent().unwrap_or(Path::new("."))
    } else {
        path
    };
    anyhow::ensure!(
        root.is_dir(),
        "--project {} is not a directory",
        root.display()
    );
    Ok(root.to_path_buf())
}
