use assert_cmd::Command;
use predicates::prelude::*;

/// Helper to get a Command for the capguard binary.
#[allow(deprecated)]
fn capguard_cmd() -> Command {
    Command::cargo_bin("capguard").unwrap()
}

#[test]
fn help_works() {
    capguard_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("annotations"));
}

#[test]
fn check_requires_an_input_document() {
    capguard_cmd()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--input"));
}

#[test]
fn stdlib_list_conflicts_with_disabling_the_filter() {
    capguard_cmd()
        .args([
            "check",
            "--input",
            "caps.json",
            "--stdlib-list",
            "std.txt",
            "--no-stdlib-filter",
        ])
        .assert()
        .failure();
}
