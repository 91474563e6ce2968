use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn umapi() -> Command {
    let mut cmd = Command::cargo_bin("umapi").unwrap();
    cmd.env_clear();
    cmd
}

/// Credentials that let the connection be built without touching the network.
fn with_credentials(cmd: &mut Command) -> &mut Command {
    cmd.env("UMAPI_CLIENT_ID", "client")
        .env("UMAPI_CLIENT_SECRET", "secret")
        .env("UMAPI_ORG_ID", "org@AdobeOrg")
        .env("UMAPI_URL", "http://127.0.0.1:9")
}

#[test]
fn help_lists_commands() {
    umapi()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("user-create-bulk"))
        .stdout(predicate::str::contains("group-read-all"));
}

#[test]
fn version_is_printed() {
    umapi()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_credentials_fail() {
    umapi()
        .args(["user-read", "-e", "jdoe@example.com"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Setting 'UMAPI_CLIENT_ID' is required"));
}

#[test]
fn config_file_fills_credentials() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "client_id: client").unwrap();
    writeln!(file, "client_secret: secret").unwrap();

    umapi()
        .args(["--config"])
        .arg(file.path())
        .args(["group-read", "-g", "Designers"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Setting 'UMAPI_ORG_ID' is required"));
}

#[test]
fn missing_input_file_fails_before_sending() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.csv");

    with_credentials(&mut umapi())
        .args(["user-delete-bulk", "-i"])
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}

#[test]
fn invalid_record_names_the_row() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "email,hard_delete").unwrap();
    writeln!(file, "a@example.com,Y").unwrap();
    writeln!(file, "b@example.com,sometimes").unwrap();

    with_credentials(&mut umapi())
        .args(["user-delete-bulk", "-i"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("record 2"))
        .stderr(predicate::str::contains("hard_delete must be Y or N"));
}

#[test]
fn invalid_country_is_rejected() {
    with_credentials(&mut umapi())
        .args(["user-create", "--email", "jdoe@example.com", "--country", "USA"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'USA' is not a valid two-letter country code"));
}

#[test]
fn completions_need_no_credentials() {
    umapi()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("umapi"));
}
