//! Exit-status tests for the `jailing` binary.
//!
//! Only paths that need no privilege are exercised here: argument
//! validation, teardown preconditions, and teardown of an unmounted root.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::process::{Command, Output};

fn jailing(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jailing"))
        .args(args)
        .env_remove("JAILING_ROOT")
        .env_remove("RUST_LOG")
        .output()
        .expect("binary should start")
}

#[test]
fn relative_root_exits_with_status_one() {
    let out = jailing(&["--root=relative/jail"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("absolute"), "stderr was: {stderr}");
}

#[test]
fn relative_bind_spec_fails_before_any_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("jail");
    let out = jailing(&[
        format!("--root={}", root.display()).as_str(),
        "--bind=data:/data",
    ]);

    assert_eq!(out.status.code(), Some(1));
    assert!(!root.exists());
}

#[test]
fn bind_destination_outside_the_jail_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("jail");
    let out = jailing(&[
        format!("--root={}", root.display()).as_str(),
        "--robind=/opt:/../../etc",
    ]);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("inside the jail"), "stderr was: {stderr}");
    assert!(!root.exists());
}

#[test]
fn umount_of_missing_root_exits_with_status_one() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("never-built");
    let out = jailing(&[format!("--root={}", root.display()).as_str(), "--umount"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(!root.exists());
}

#[cfg(target_os = "linux")]
#[test]
fn umount_of_unmounted_root_succeeds_and_keeps_entries() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("usr/bin")).unwrap();
    let out = jailing(&[format!("--root={}", dir.path().display()).as_str(), "--umount"]);

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("removed 0 mounts"), "stdout was: {stdout}");
    assert!(dir.path().join("usr/bin").is_dir());
}

#[test]
fn malformed_layout_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let layout = dir.path().join("layout.json");
    std::fs::write(&layout, "{ not json").unwrap();
    let root = dir.path().join("jail");
    let out = jailing(&[
        format!("--root={}", root.display()).as_str(),
        format!("--layout={}", layout.display()).as_str(),
    ]);

    assert_eq!(out.status.code(), Some(1));
    assert!(!root.exists());
}
