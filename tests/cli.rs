//! CLI exit-code contract: help exits 0 doing nothing, usage errors exit 1
//! before any side effect.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_top_level_help_exits_zero() {
    Command::cargo_bin("stevedore")
        .unwrap()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("import"));
}

#[test]
fn test_export_help_exits_zero() {
    Command::cargo_bin("stevedore")
        .unwrap()
        .args(["export", "-h"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--apps"))
        .stdout(predicate::str::contains("--certs"));
}

#[test]
fn test_help_short_circuits_other_flags() {
    Command::cargo_bin("stevedore")
        .unwrap()
        .args(["export", "-a", "-b", "-h"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_missing_backup_dir_is_a_usage_error() {
    Command::cargo_bin("stevedore")
        .unwrap()
        .arg("import")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("backup-dir"));
}

#[test]
fn test_unknown_flag_is_a_usage_error() {
    Command::cargo_bin("stevedore")
        .unwrap()
        .args(["export", "-z"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_missing_subcommand_is_a_usage_error() {
    Command::cargo_bin("stevedore")
        .unwrap()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage"));
}
