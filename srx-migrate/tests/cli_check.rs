use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn check_lists_map_rules_in_order() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("srx-migrate"));
    cmd.arg("check")
        .arg(fixture("fixtures/legacy/shared_rules.conf"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "map[1] pattern=\"EN.*\" group=English\nmap[2] pattern=\"DE.*\" group=English\nmap[3] pattern=\".*\" group=Default",
        ))
        .stdout(predicate::str::contains(
            "group English rules=3 breaking=2 exceptions=1 references=2",
        ));
}

#[test]
fn check_normalizes_localized_names() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("srx-migrate"));
    cmd.arg("check")
        .arg(fixture("fixtures/legacy/localized_ja.conf"))
        .assert()
        .success()
        .stdout(predicate::str::contains("group=Japanese"));
}

#[test]
fn check_json_carries_verbatim_patterns() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("srx-migrate"));
    cmd.arg("check")
        .arg(fixture("fixtures/legacy/shared_rules.conf"))
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""before": " ""#))
        .stdout(predicate::str::contains(r#""after": """#))
        .stdout(predicate::str::contains(r#""before": "\\b(Mr|Mrs|Dr)\\.""#));
}

#[test]
fn check_reports_dangling_reference_with_line() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("srx-migrate"));
    cmd.arg("check")
        .arg(fixture("fixtures/legacy/dangling_ref.conf"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "line 14: reference to undefined rule group 'ArrayList7'",
        ));
}

#[test]
fn check_missing_file_exits_with_one() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("srx-migrate"));
    cmd.arg("check")
        .arg(fixture("fixtures/legacy/does_not_exist.conf"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to read"));
}
