use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use thoth_vcs::{GitAdapter, Revset, VcsAdapter, VcsError};

fn run_git(repo: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .unwrap_or_else(|e| panic!("git {} failed: {e}", args.join(" ")));
    assert!(
        output.status.success(),
        "git {} failed:\nstderr: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}

fn init_repo() -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().unwrap();
    run_git(dir.path(), &["init", "--initial-branch=main"]);
    run_git(dir.path(), &["config", "user.email", "test@thoth.dev"]);
    run_git(dir.path(), &["config", "user.name", "Thoth Test"]);
    dir
}

fn commit_file(repo: &Path, file: &str, content: &str, message: &str) -> String {
    let path = repo.join(file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    run_git(repo, &["add", "-A"]);
    run_git(repo, &["commit", "-m", message]);
    run_git(repo, &["rev-parse", "HEAD"])
}

#[test]
fn discover_fails_outside_a_repository() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = GitAdapter::discover(dir.path()).unwrap_err();
    assert!(matches!(err, VcsError::NotRepository(_)));
}

#[test]
fn diff_between_commits_carries_both_sides() {
    let dir = init_repo();
    let repo = dir.path();
    let base = commit_file(repo, "pkg/wal/wal.go", "package wal\n", "add wal");
    commit_file(repo, "README.md", "# readme\n", "add readme");
    let target = commit_file(repo, "pkg/wal/wal.go", "package wal\n\nfunc Open() {}\n", "open");

    let vcs = GitAdapter::discover(repo).unwrap();
    let diff = vcs.diff(Some(&base), Some(&target)).unwrap();

    assert_eq!(diff.base, base);
    assert_eq!(diff.target.as_deref(), Some(target.as_str()));
    let paths: Vec<&str> = diff.paths().collect();
    assert_eq!(paths, vec!["README.md", "pkg/wal/wal.go"]);

    let readme = &diff.files[0];
    assert!(readme.is_added());
    assert_eq!(readme.lang, None);

    let wal = &diff.files[1];
    assert_eq!(wal.lang.as_deref(), Some("go"));
    assert_eq!(wal.old.as_deref(), Some("package wal\n"));
    assert_eq!(wal.new.as_deref(), Some("package wal\n\nfunc Open() {}\n"));
}

#[test]
fn worktree_diff_sees_uncommitted_edits_and_deletions() {
    let dir = init_repo();
    let repo = dir.path();
    commit_file(repo, "src/lib.rs", "pub fn a() {}\n", "lib");
    commit_file(repo, "src/gone.rs", "pub fn b() {}\n", "gone");
    fs::write(repo.join("src/lib.rs"), "pub fn a() -> u8 { 1 }\n").unwrap();
    fs::remove_file(repo.join("src/gone.rs")).unwrap();

    let vcs = GitAdapter::discover(repo).unwrap();
    let diff = vcs.diff(None, None).unwrap();

    assert_eq!(diff.target, None);
    let paths: Vec<&str> = diff.paths().collect();
    assert_eq!(paths, vec!["src/gone.rs", "src/lib.rs"]);
    assert!(diff.files[0].is_deleted());
    assert_eq!(
        vcs.changed_paths(None, None).unwrap(),
        vec!["src/gone.rs".to_string(), "src/lib.rs".to_string()]
    );
}

#[test]
fn binary_files_carry_no_content() {
    let dir = init_repo();
    let repo = dir.path();
    commit_file(repo, "a.txt", "a\n", "init");
    let base = run_git(repo, &["rev-parse", "HEAD"]);
    fs::write(repo.join("blob.bin"), [0u8, 159, 146, 150]).unwrap();

    let vcs = GitAdapter::discover(repo).unwrap();
    let diff = vcs.diff(Some(&base), None).unwrap();

    assert_eq!(diff.files.len(), 1);
    assert!(diff.files[0].binary);
    assert_eq!(diff.files[0].new, None);
}

#[test]
fn file_at_rev_reads_historical_content() {
    let dir = init_repo();
    let repo = dir.path();
    let first = commit_file(repo, "notes.md", "one\n", "one");
    commit_file(repo, "notes.md", "two\n", "two");

    let vcs = GitAdapter::discover(repo).unwrap();
    assert_eq!(vcs.file_at_rev("notes.md", &first).unwrap(), b"one\n");
    assert_eq!(vcs.file_at_rev("notes.md", "HEAD").unwrap(), b"two\n");
    assert!(matches!(
        vcs.file_at_rev("missing.md", "HEAD"),
        Err(VcsError::PathNotFound { .. })
    ));
}

#[test]
fn log_honors_ranges_and_limits() {
    let dir = init_repo();
    let repo = dir.path();
    let first = commit_file(repo, "f.txt", "1\n", "first");
    let second = commit_file(repo, "f.txt", "2\n", "second");
    let third = commit_file(repo, "f.txt", "3\n", "third");

    let vcs = GitAdapter::discover(repo).unwrap();
    assert_eq!(vcs.current_rev().unwrap(), third);

    let all = vcs.log(&"HEAD".parse::<Revset>().unwrap(), None).unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().any(|r| r.rev_id == first && r.summary == "first"));

    let range = vcs
        .log(&format!("{first}..HEAD").parse::<Revset>().unwrap(), None)
        .unwrap();
    let mut ids: Vec<&str> = range.iter().map(|r| r.rev_id.as_str()).collect();
    ids.sort_unstable();
    let mut expected = vec![second.as_str(), third.as_str()];
    expected.sort_unstable();
    assert_eq!(ids, expected);

    let limited = vcs.log(&"HEAD".parse::<Revset>().unwrap(), Some(1)).unwrap();
    assert_eq!(limited.len(), 1);
}

#[test]
fn list_files_at_revision_and_worktree() {
    let dir = init_repo();
    let repo = dir.path();
    let rev = commit_file(repo, "src/main.rs", "fn main() {}\n", "main");
    fs::write(repo.join("src/extra.rs"), "pub fn extra() {}\n").unwrap();

    let vcs = GitAdapter::discover(repo).unwrap();
    let at_rev = vcs.list_files(Some(&rev)).unwrap();
    let paths: Vec<&str> = at_rev.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["src/main.rs"]);
    assert_eq!(at_rev[0].lang.as_deref(), Some("rust"));

    let worktree = vcs.list_files(None).unwrap();
    let paths: Vec<&str> = worktree.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["src/extra.rs", "src/main.rs"]);
}

#[test]
fn unresolvable_revision_is_reported() {
    let dir = init_repo();
    commit_file(dir.path(), "a.txt", "a\n", "init");
    let vcs = GitAdapter::discover(dir.path()).unwrap();
    let err = vcs.diff(Some("no-such-branch"), None).unwrap_err();
    assert!(matches!(err, VcsError::Revision { .. }), "{err}");
}

#[test]
fn resolve_rev_returns_full_commit_ids() {
    let dir = init_repo();
    let first = commit_file(dir.path(), "a.txt", "a\n", "init");
    commit_file(dir.path(), "a.txt", "b\n", "second");
    let vcs = GitAdapter::discover(dir.path()).unwrap();
    assert_eq!(vcs.resolve_rev("HEAD~1").unwrap(), first);
    assert!(matches!(
        vcs.resolve_rev("nope"),
        Err(VcsError::Revision { .. })
    ));
}
