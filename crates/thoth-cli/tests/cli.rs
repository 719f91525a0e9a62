use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use serde_json::Value;

const MANIFEST: &str = r#"
[[resources]]
id = "wal_subsystem"
description = "Write ahead log"
severity = "serialized"
tags = ["storage"]
paths = ["pkg/storage/wal/**"]

[[resources]]
id = "wal_flush"
description = "Flush path of the segment writer"
severity = "gated"
deps = ["wal_subsystem"]
regions = ["THOTH-0192"]
"#;

const WAL: &str = concat!(
    "package wal\n",
    "\n",
    "// THOTH:BEGIN resource=wal_flush id=THOTH-0192\n",
    "func Flush() {\n",
    "\tsyncAll()\n",
    "}\n",
    "// THOTH:END id=THOTH-0192\n",
    "\n",
    "func syncAll() {}\n",
);

fn git(repo: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .expect("git should run");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    git(root, &["init", "--initial-branch=main"]);
    git(root, &["config", "user.email", "test@thoth.dev"]);
    git(root, &["config", "user.name", "Thoth Test"]);

    fs::create_dir_all(root.join(".thoth")).unwrap();
    fs::write(root.join(".thoth/manifest.toml"), MANIFEST).unwrap();
    fs::write(root.join(".gitignore"), ".thoth/\n").unwrap();
    fs::create_dir_all(root.join("pkg/storage/wal")).unwrap();
    fs::write(root.join("pkg/storage/wal/wal.go"), WAL).unwrap();
    git(root, &["add", "-A"]);
    git(root, &["commit", "-m", "initial"]);
    dir
}

fn thoth(project: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_thoth"))
        .arg("--project")
        .arg(project)
        .args(args)
        .env_remove("THOTH_LOG")
        .output()
        .expect("thoth should run")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "thoth failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn stderr_error(output: &Output) -> Value {
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let last = stderr.lines().last().expect("stderr should not be empty");
    serde_json::from_str(last).expect("error should be JSON")
}

#[test]
fn index_build_then_query() {
    let dir = project();
    let root = dir.path();

    let report = stdout_json(&thoth(root, &["index", "build"]));
    assert_eq!(report["version"], 1);
    assert_eq!(report["resources"], 2);
    assert_eq!(report["regions"], 1);

    let map = stdout_json(&thoth(root, &["map", "--tag", "storage"]));
    assert_eq!(map["resources"][0]["id"], "wal_subsystem");

    let find = stdout_json(&thoth(root, &["find", "THOTH-0192"]));
    assert_eq!(find["results"][0]["resource_id"], "wal_flush");
    assert_eq!(find["results"][0]["tier"], "binding");

    let walk = stdout_json(&thoth(root, &["walk", "wal_flush", "--depth", "2"]));
    assert_eq!(walk["nodes"][1]["id"], "wal_subsystem");
}

#[test]
fn touch_classifies_working_tree_edits() {
    let dir = project();
    let root = dir.path();
    fs::write(
        root.join("pkg/storage/wal/wal.go"),
        WAL.replace("\tsyncAll()\n", "\tsyncAll()\n\tsyncAll()\n"),
    )
    .unwrap();

    let touch = stdout_json(&thoth(root, &["touch"]));
    assert_eq!(touch["vcs"]["backend"], "git");
    assert_eq!(touch["vcs"]["target"], Value::Null);
    assert_eq!(touch["inputs"]["files"][0], "pkg/storage/wal/wal.go");
    let ids: Vec<&str> = touch["touched"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["resource_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["wal_flush", "wal_subsystem"]);
    assert_eq!(touch["incomplete"], false);
}

#[test]
fn recorded_touches_show_up_in_history() {
    let dir = project();
    let root = dir.path();
    stdout_json(&thoth(root, &["index", "build"]));

    fs::write(root.join("pkg/storage/wal/segment.go"), "package wal\n").unwrap();
    git(root, &["add", "-A"]);
    git(root, &["commit", "-m", "add segment"]);

    let touch = stdout_json(&thoth(
        root,
        &["touch", "--base", "HEAD~1", "--target", "HEAD", "--record"],
    ));
    let recorded = touch["recorded"].as_str().unwrap().to_string();

    let history = stdout_json(&thoth(root, &["history", "wal_subsystem"]));
    assert_eq!(history["revisions"][0]["rev_id"], recorded.as_str());
    assert_eq!(history["revisions"][0]["summary"], "add segment");
}

#[test]
fn errors_are_reported_as_json() {
    let dir = project();
    let root = dir.path();

    let not_built = stderr_error(&thoth(root, &["show", "wal_subsystem"]));
    assert_eq!(not_built["error"]["kind"], "index_not_built");

    stdout_json(&thoth(root, &["index", "build"]));
    let unknown = stderr_error(&thoth(root, &["show", "ghost"]));
    assert_eq!(unknown["error"]["kind"], "unknown_resource");
}

#[test]
fn raw_format_prints_one_line() {
    let dir = project();
    let output = thoth(dir.path(), &["--format", "raw", "schema", "map"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end().lines().count(), 1);
}
