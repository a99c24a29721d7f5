//! Tests for the compiled `bootstrap` binary

use super::common::home_fixtures::{archive_members, TestHome};
use assert_cmd::Command;
use predicates::prelude::*;

fn bootstrap(home: &TestHome) -> Command {
    let mut cmd = Command::cargo_bin("bootstrap").unwrap();
    cmd.arg("--home").arg(&home.path).env("RUST_LOG", "warn");
    cmd
}

#[test]
fn test_success_exits_zero() {
    let home = TestHome::new();
    home.stub_config(0, 0);
    home.manifest(&["foo/bar.conf"]);
    home.write("foo/bar.conf", "x");

    bootstrap(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 members"));

    assert_eq!(
        archive_members(&home.path.join("provides.tar")),
        vec!["foo/bar.conf"]
    );
}

#[test]
fn test_install_failure_exit_code() {
    let home = TestHome::new();
    home.stub_config(1, 0);
    home.manifest(&["a.txt"]);

    bootstrap(&home)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error: install failed"));
    assert!(!home.fragment_path().exists());
}

#[test]
fn test_setup_failure_exit_code() {
    let home = TestHome::new();
    home.stub_config(0, 5);
    home.manifest(&["a.txt"]);

    bootstrap(&home)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("error: setup failed"));
    assert!(home.fragment_path().exists());
}

#[test]
fn test_missing_manifest_exit_code() {
    let home = TestHome::new();
    home.stub_config(0, 0);

    bootstrap(&home)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("error: archive failed"));
    assert!(!home.exists("provides.tar"));
}

#[test]
fn test_archive_write_failure_exit_code() {
    let home = TestHome::new();
    home.manifest(&["a.txt"]);
    home.write("a.txt", "a");
    home.write("blocker", "not a directory");
    home.write(
        ".config/bootstrap/config.toml",
        "[archive]\noutput = \"blocker/provides.tar\"\n",
    );

    bootstrap(&home)
        .args(["--only", "archive"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("error: archive failed"));
    assert!(!home.exists("blocker/provides.tar"));
}

#[test]
fn test_output_inside_listed_directory_exit_code() {
    let home = TestHome::new();
    home.manifest(&["w"]);
    home.write(
        ".config/bootstrap/config.toml",
        "[archive]\noutput = \"w/out.tar\"\n",
    );

    bootstrap(&home)
        .args(["--only", "archive"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("contains the output archive"));
    assert!(!home.exists("w/out.tar"));
}

#[test]
fn test_only_archive_stage() {
    let home = TestHome::new();
    home.manifest(&["a.txt"]);
    home.write("a.txt", "a");

    bootstrap(&home).args(["--only", "archive"]).assert().success();

    assert!(home.exists("provides.tar"));
    assert!(!home.fragment_path().exists());
}

#[test]
fn test_unknown_stage_rejected() {
    let home = TestHome::new();
    bootstrap(&home)
        .args(["--only", "deploy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown stage `deploy`"));
}

#[test]
fn test_explicit_missing_config_exit_code() {
    let home = TestHome::new();
    bootstrap(&home)
        .args(["--config", "nowhere.toml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn test_example_config_printed() {
    let home = TestHome::new();
    bootstrap(&home)
        .arg("--example-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[archive]"));
}

#[test]
fn test_log_file_receives_logs() {
    let home = TestHome::new();
    home.manifest(&["a.txt"]);
    home.write("a.txt", "a");
    let log = home.path.join("logs/bootstrap.log");

    bootstrap(&home)
        .env("RUST_LOG", "info")
        .args(["--only", "archive", "--log-file"])
        .arg(&log)
        .assert()
        .success();

    let contents = std::fs::read_to_string(log).unwrap();
    assert!(contents.contains("Archive written"));
}
