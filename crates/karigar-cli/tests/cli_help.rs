//! Smoke tests for CLI surface and help output.

use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    Command::cargo_bin("karigar")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("services"))
        .stdout(predicate::str::contains("bookings"))
        .stdout(predicate::str::contains("payments"));
}

#[test]
fn test_services_help_shows_subcommands() {
    Command::cargo_bin("karigar")
        .unwrap()
        .args(["services", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("categories"))
        .stdout(predicate::str::contains("stats"));
}

#[test]
fn test_bookings_help_shows_subcommands() {
    Command::cargo_bin("karigar")
        .unwrap()
        .args(["bookings", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("set-status"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn test_payments_help_shows_subcommands() {
    Command::cargo_bin("karigar")
        .unwrap()
        .args(["payments", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("confirm"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("karigar")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}

#[test]
fn test_unknown_booking_status_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    Command::cargo_bin("karigar")
        .unwrap()
        .env("KARIGAR_HOME", temp.path())
        .args(["bookings", "list", "--status", "shipped"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown booking status"));
}
