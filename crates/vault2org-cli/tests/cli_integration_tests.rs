//! Integration tests for the vault2org binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Empty config file so the user's own config never leaks into a test
fn empty_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, "").unwrap();
    path
}

fn vault2org(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vault2org").unwrap();
    cmd.arg("-C")
        .arg(empty_config(dir))
        .arg("--no-progress")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn converts_a_vault() {
    let dir = TempDir::new().unwrap();
    let vault = dir.path().join("vault");
    let out = dir.path().join("out");
    write(
        &vault,
        "topics/Rust.md",
        "---\ncreated: 2024-06-01 12:00:00\n---\nSee [[Ownership]].\n",
    );
    write(
        &vault,
        "topics/Ownership.md",
        "---\ntitle: Ownership Rules\ncreated: 2024-06-02 12:00:00\n---\nBody\n",
    );

    vault2org(&dir)
        .arg(&vault)
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 of 2 notes written"));

    let rust = fs::read_to_string(out.join("20240601120000-rust.org")).unwrap();
    assert!(rust.contains("[[id:ownership][Ownership Rules]]"));
    assert!(out.join("20240602120000-ownership.org").is_file());
}

#[test]
fn missing_input_directory_fails() {
    let dir = TempDir::new().unwrap();

    vault2org(&dir)
        .arg(dir.path().join("no-such-vault"))
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("input directory does not exist"));
}

#[test]
fn failed_notes_do_not_fail_the_run() {
    let dir = TempDir::new().unwrap();
    let vault = dir.path().join("vault");
    write(&vault, "Undated.md", "no frontmatter\n");

    vault2org(&dir)
        .arg(&vault)
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Undated.md [missing-timestamp]"));
}

#[test]
fn invalid_job_count_fails() {
    let dir = TempDir::new().unwrap();
    let vault = dir.path().join("vault");
    fs::create_dir_all(&vault).unwrap();

    vault2org(&dir)
        .args(["-j", "0"])
        .arg(&vault)
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn explicit_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    let vault = dir.path().join("vault");
    fs::create_dir_all(&vault).unwrap();

    Command::cargo_bin("vault2org")
        .unwrap()
        .arg("-C")
        .arg(dir.path().join("absent.toml"))
        .arg(&vault)
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

#[test]
fn missing_pandoc_is_reported_per_note() {
    let dir = TempDir::new().unwrap();
    let vault = dir.path().join("vault");
    write(&vault, "Note.md", "---\ncreated: 2024-01-01\n---\nbody\n");

    vault2org(&dir)
        .args(["--converter", "pandoc", "--pandoc"])
        .arg(dir.path().join("definitely-not-pandoc"))
        .arg(&vault)
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Note.md [convert]"));
}
