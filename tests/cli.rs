#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn cli(data: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rota-cli").unwrap();
    cmd.arg("--data").arg(data);
    cmd
}

#[test]
fn auto_assign_then_check() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("rota.json");

    for (name, region) in [("alice", "us"), ("bob", "uk")] {
        cli(&data)
            .args(["add-member", "--name", name, "--region", region])
            .arg("--email")
            .arg(format!("{name}@example.com"))
            .assert()
            .success();
    }

    cli(&data)
        .args(["auto-assign", "--start", "2024-12-09", "--end", "2024-12-13"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 assignment(s) created"));

    cli(&data)
        .args(["check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: no conflicts"));

    cli(&data)
        .args(["coverage", "--date", "2024-12-11"])
        .assert()
        .success()
        .stdout(predicate::str::contains("US | alice"))
        .stdout(predicate::str::contains("UK | bob"));

    // congé posé après coup : l'astreinte existante devient conflictuelle
    cli(&data)
        .args(["add-holiday", "--email", "bob@example.com"])
        .args(["--start", "2024-12-11", "--end", "2024-12-12"])
        .assert()
        .success();

    cli(&data).args(["check"]).assert().code(2);
}

#[test]
fn partial_week_exits_with_warning() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("rota.json");

    cli(&data)
        .args(["add-member", "--name", "alice", "--email", "alice@example.com", "--region", "us"])
        .assert()
        .success();
    cli(&data)
        .args(["add-member", "--name", "bob", "--email", "bob@example.com", "--region", "uk"])
        .assert()
        .success();
    cli(&data)
        .args(["add-holiday", "--email", "alice@example.com"])
        .args(["--start", "2024-12-11", "--end", "2024-12-11"])
        .assert()
        .success();

    cli(&data)
        .args(["auto-assign", "--start", "2024-12-09", "--end", "2024-12-13"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("4 assignment(s) created"))
        .stderr(predicate::str::contains("No US members available"));
}

#[test]
fn rejects_timestamps_and_exhausted_horizon() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("rota.json");

    cli(&data)
        .args(["add-member", "--name", "alice", "--email", "alice@example.com", "--region", "us"])
        .assert()
        .success();

    cli(&data)
        .args(["auto-assign", "--start", "2024-12-09T00:00:00Z", "--end", "2024-12-13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected YYYY-MM-DD"));

    // aucun membre UK : aucune semaine exploitable
    cli(&data)
        .args(["find-week", "--today", "2024-12-11", "--weeks", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("assign manually"));
}

#[test]
fn upcoming_and_horizon_take_explicit_values() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("rota.json");

    for (name, region) in [("alice", "us"), ("bob", "uk")] {
        cli(&data)
            .args(["add-member", "--name", name, "--region", region])
            .arg("--email")
            .arg(format!("{name}@example.com"))
            .assert()
            .success();
    }
    cli(&data)
        .args(["assign", "--start", "2024-12-02", "--end", "2024-12-06"])
        .args(["--us", "alice@example.com"])
        .assert()
        .success();
    cli(&data)
        .args(["assign", "--start", "2024-12-16", "--end", "2024-12-20"])
        .args(["--uk", "bob@example.com"])
        .assert()
        .success();

    cli(&data)
        .args(["list", "--upcoming", "--today", "2024-12-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-12-16"))
        .stdout(predicate::str::contains("2024-12-02").not());

    cli(&data)
        .args(["find-week", "--today", "2024-12-11", "--weeks", "4294967295"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}
