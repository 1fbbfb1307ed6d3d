use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::TempDir;

fn write_roster(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("roster.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn validate_accepts_a_well_formed_roster() {
    let dir = TempDir::new().unwrap();
    let roster = write_roster(
        &dir,
        "team,user,role\n\
         Platform,alice,owner\n\
         Platform,bob,member\n\
         Data,carol,owner\n",
    );

    Command::cargo_bin("rosterctl")
        .unwrap()
        .env_remove("RUST_LOG")
        .arg("validate")
        .arg(&roster)
        .assert()
        .success()
        .stdout(predicate::str::contains("Roster OK: 3 rows across 2 teams"))
        .stdout(predicate::str::contains("Platform"))
        .stdout(predicate::str::contains("Data"));
}

#[test]
fn validate_rejects_an_invalid_role_with_the_row_number() {
    let dir = TempDir::new().unwrap();
    let roster = write_roster(
        &dir,
        "team,user,role\n\
         Platform,alice,owner\n\
         Platform,bob,admin\n",
    );

    Command::cargo_bin("rosterctl")
        .unwrap()
        .env_remove("RUST_LOG")
        .arg("validate")
        .arg(&roster)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid role at data row 2"));
}

#[test]
fn validate_rejects_a_team_without_an_owner() {
    let dir = TempDir::new().unwrap();
    let roster = write_roster(
        &dir,
        "team,user,role\n\
         Platform,alice,owner\n\
         Orphans,bob,member\n",
    );

    Command::cargo_bin("rosterctl")
        .unwrap()
        .env_remove("RUST_LOG")
        .arg("validate")
        .arg(&roster)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Team 'Orphans' has no owner row"));
}

#[test]
fn validate_rejects_a_missing_file() {
    Command::cargo_bin("rosterctl")
        .unwrap()
        .env_remove("RUST_LOG")
        .arg("validate")
        .arg("does-not-exist.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read roster file"));
}

#[test]
fn version_prints_the_crate_version() {
    Command::cargo_bin("rosterctl")
        .unwrap()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
