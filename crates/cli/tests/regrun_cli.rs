// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg(unix)]

//! End-to-end tests for the regrun binary.
//!
//! Test files are shell scripts and `/bin/sh` stands in for the tool under
//! test, so each file controls its own output and exit status.

#![allow(deprecated)] // Command::cargo_bin is deprecated but still functional

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PASSING: &str = "echo 'MM_NOTICE: A'\necho one\necho 'MM_NOTICE: B'\n";
const FAILING: &str = "echo 'MM_NOTICE: A'\necho 'oops' >&2\nexit 1\n";

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.stig"), PASSING).unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/b.stig"), FAILING).unwrap();
    dir
}

/// regrun running in `dir` with `/bin/sh` as the tool.
fn regrun(dir: &Path) -> Command {
    let mut cmd = bare_regrun(dir);
    cmd.args(["--program", "/bin/sh", "--arg", "{input}", "--out-dir"])
        .arg(dir.join("out"));
    cmd
}

/// regrun running in `dir` with no tool flags.
fn bare_regrun(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("regrun").unwrap();
    cmd.current_dir(dir)
        .env_remove("REGRUN_WORKERS")
        .env_remove("REGRUN_CONFIG")
        .env_remove("REGRUN_PROGRAM")
        .env_remove("RUST_LOG");
    cmd
}

// =============================================================================
// Check and update
// =============================================================================

#[test]
fn test_check_without_baselines() {
    let dir = workspace();

    regrun(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No state file: sub/b.stig\n"))
        .stdout(predicate::str::contains("No state file: a.stig").not())
        .stdout(predicate::str::ends_with(
            "Overall: 1 changed, 1 passed, 1 failed\n",
        ));
}

#[test]
fn test_update_then_check() {
    let dir = workspace();

    regrun(dir.path())
        .arg("-u")
        .assert()
        .success()
        .stdout("Updated: 2 baselines\n");
    assert!(dir.path().join(".a.stig.test.state").is_file());
    assert!(dir.path().join("sub/.b.stig.test.state").is_file());

    regrun(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Change: \n"))
        .stdout(predicate::str::contains("Changes:").not())
        .stdout(predicate::str::ends_with(
            "Overall: 0 changed, 1 passed, 1 failed\n",
        ));
}

#[test]
fn test_update_twice_is_byte_identical() {
    let dir = workspace();
    let sidecar = dir.path().join(".a.stig.test.state");

    regrun(dir.path()).arg("-u").assert().success();
    let first = fs::read(&sidecar).unwrap();
    regrun(dir.path()).arg("-u").assert().success();

    assert_eq!(fs::read(&sidecar).unwrap(), first);
}

#[test]
fn test_changed_output_is_described() {
    let dir = workspace();
    regrun(dir.path()).arg("-u").assert().success();
    fs::write(
        dir.path().join("a.stig"),
        "echo 'MM_NOTICE: A'\necho two\n",
    )
    .unwrap();

    regrun(dir.path())
        .arg("-c")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Changes: a.stig\nDiffers: A\nOld:\none\nNew:\ntwo\nWorse: B\n",
        ))
        .stdout(predicate::str::contains("Change: a.stig\n"))
        .stdout(predicate::str::ends_with(
            "Overall: 1 changed, 1 passed, 1 failed\n",
        ));
}

#[test]
fn test_stderr_is_part_of_the_output() {
    let dir = workspace();
    regrun(dir.path()).arg("-u").assert().success();
    fs::write(
        dir.path().join("sub/b.stig"),
        "echo 'MM_NOTICE: A'\necho 'other' >&2\nexit 1\n",
    )
    .unwrap();

    regrun(dir.path())
        .arg("-c")
        .assert()
        .success()
        .stdout(predicate::str::contains("Differs: A\nOld:\noops\nNew:\nother\n"));
}

#[test]
fn test_explicit_files_only() {
    let dir = workspace();

    regrun(dir.path())
        .arg("a.stig")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pass: a.stig\n"))
        .stdout(predicate::str::ends_with(
            "Overall: 0 changed, 1 passed, 0 failed\n",
        ));
}

#[test]
fn test_ignored_directory_is_skipped() {
    let dir = workspace();

    regrun(dir.path())
        .args(["--ignore", "sub"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with(
            "Overall: 0 changed, 1 passed, 0 failed\n",
        ));
}

#[test]
fn test_missing_tool_is_reported_per_file() {
    let dir = workspace();

    bare_regrun(dir.path())
        .args(["--program", "/nonexistent/regrun-tool", "-u", "a.stig"])
        .args(["--out-dir", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Errors: a.stig (failed to spawn"))
        .stdout(predicate::str::contains("Updated: 0 baselines\n"));
    assert!(!dir.path().join(".a.stig.test.state").exists());
}

#[test]
fn test_json_report() {
    let dir = workspace();

    regrun(dir.path())
        .args(["--json-report", "report.json"])
        .assert()
        .success();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(value["passed"][0], "a.stig");
    assert_eq!(value["failed"][0], "sub/b.stig");
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_file_in_root() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.case"), PASSING).unwrap();
    fs::write(dir.path().join("b.stig"), FAILING).unwrap();
    fs::write(
        dir.path().join("regrun.toml"),
        r#"
        extension = "case"
        out_dir = "out"
        workers = 1

        [tool]
        program = "/bin/sh"
        args = ["{input}"]
        "#,
    )
    .unwrap();

    bare_regrun(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Pass: a.case\n"))
        .stdout(predicate::str::ends_with(
            "Overall: 0 changed, 1 passed, 0 failed\n",
        ));
}

#[test]
fn test_unknown_config_key_rejected() {
    let dir = workspace();
    fs::write(dir.path().join("regrun.toml"), "extenson = \"stig\"\n").unwrap();

    regrun(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown field"));
}

#[test]
fn test_zero_workers_rejected() {
    let dir = workspace();

    regrun(dir.path())
        .args(["-w", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("worker count"));
}

#[test]
fn test_missing_root_fails() {
    let dir = TempDir::new().unwrap();

    regrun(dir.path())
        .args(["--root", "missing"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("scan root"));
}
