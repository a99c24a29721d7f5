//! End-to-end runs of the bootstrapper with real (stubbed) child processes

use super::common::home_fixtures::{archive_members, TestHome};
use bootstrap::{BootstrapError, Bootstrapper, Stage, SystemRunner};
use std::fs;
use std::io::Read;

/// Full run: stub install and setup succeed, archive holds exactly the manifest
#[test]
fn test_end_to_end_single_member() {
    let home = TestHome::new();
    home.stub_config(0, 0);
    home.manifest(&["foo/bar.conf"]);
    home.write("foo/bar.conf", "[keyboard]\nlayout = \"colemak\"\n");
    home.write("foo/unlisted.conf", "ignored");

    let report = Bootstrapper::new(home.config(), SystemRunner::new())
        .run()
        .expect("run should succeed");

    assert_eq!(report.completed, Stage::ALL.to_vec());
    assert_eq!(home.calls("manager"), vec!["install --user qmk"]);
    assert_eq!(
        home.calls("tool"),
        vec![format!("setup -H {} -y", home.path.join("qmk_firmware").display())]
    );
    assert_eq!(
        home.read(".config/path.d/bootstrap"),
        format!("{}\n", home.install_dir().display())
    );

    let output = home.path.join("provides.tar");
    assert_eq!(archive_members(&output), vec!["foo/bar.conf"]);

    let mut archive = tar::Archive::new(fs::File::open(&output).unwrap());
    let mut entry = archive.entries().unwrap().next().unwrap().unwrap();
    let mut contents = String::new();
    entry.read_to_string(&mut contents).unwrap();
    assert_eq!(contents, home.read("foo/bar.conf"));
}

/// Two manifest entries give exactly two members regardless of other files
#[test]
fn test_archive_has_exactly_listed_members() {
    let home = TestHome::new();
    home.stub_config(0, 0);
    home.manifest(&["a.txt", "dir/b.txt"]);
    home.write("a.txt", "a");
    home.write("dir/b.txt", "b");
    home.write("dir/c.txt", "c");
    home.write(".bashrc", "export X=1");

    let report = Bootstrapper::new(home.config(), SystemRunner::new())
        .run()
        .unwrap();

    let mut members = archive_members(&home.path.join("provides.tar"));
    members.sort();
    assert_eq!(members, vec!["a.txt", "dir/b.txt"]);
    assert_eq!(report.archive.unwrap().members, 2);
}

/// A failing package manager leaves no stage 2-4 side effects
#[test]
fn test_install_failure_touches_nothing() {
    let home = TestHome::new();
    home.stub_config(1, 0);
    home.manifest(&["a.txt"]);
    home.write("a.txt", "a");

    let err = Bootstrapper::new(home.config(), SystemRunner::new())
        .run()
        .unwrap_err();

    assert!(matches!(err, BootstrapError::DependencyInstallFailed { .. }));
    assert_eq!(err.stage(), Some(Stage::InstallDependency));
    assert!(!home.fragment_path().exists());
    assert!(home.calls("tool").is_empty());
    assert!(!home.exists("provides.tar"));
}

/// A failing setup leaves the path registration in place (no rollback)
#[test]
fn test_setup_failure_keeps_path_registration() {
    let home = TestHome::new();
    home.stub_config(0, 2);
    home.manifest(&["a.txt"]);
    home.write("a.txt", "a");

    let err = Bootstrapper::new(home.config(), SystemRunner::new())
        .run()
        .unwrap_err();

    assert!(matches!(err, BootstrapError::ToolSetupFailed { .. }));
    assert_eq!(home.calls("manager").len(), 1);
    assert_eq!(
        home.read(".config/path.d/bootstrap"),
        format!("{}\n", home.install_dir().display())
    );
    assert!(!home.exists("provides.tar"));
}

/// Running twice appends the install directory twice
#[test]
fn test_repeated_runs_duplicate_path_line() {
    let home = TestHome::new();
    home.stub_config(0, 0);
    home.manifest(&["a.txt"]);
    home.write("a.txt", "a");

    let bootstrapper = Bootstrapper::new(home.config(), SystemRunner::new());
    bootstrapper.run().unwrap();
    bootstrapper.run().unwrap();

    let line = home.install_dir().display().to_string();
    assert_eq!(
        home.read(".config/path.d/bootstrap"),
        format!("{line}\n{line}\n")
    );
    assert_eq!(home.calls("manager").len(), 2);
}

/// A manifest naming a missing file fails the archive stage without output
#[test]
fn test_missing_manifest_entry_leaves_no_archive() {
    let home = TestHome::new();
    home.stub_config(0, 0);
    home.manifest(&["a.txt", "gone.txt"]);
    home.write("a.txt", "a");

    let err = Bootstrapper::new(home.config(), SystemRunner::new())
        .run()
        .unwrap_err();

    assert!(matches!(err, BootstrapError::ManifestReadFailed { .. }));
    assert!(!home.exists("provides.tar"));
    // earlier stages already ran
    assert!(home.fragment_path().exists());
    assert_eq!(home.calls("tool").len(), 1);
}

/// Missing package manager binary is an install failure, not a panic
#[test]
fn test_unspawnable_package_manager() {
    let home = TestHome::new();
    home.write(
        ".config/bootstrap/config.toml",
        "[package]\nmanager = [\"no-such-package-manager-e41f\", \"install\"]\n",
    );

    let err = Bootstrapper::new(home.config(), SystemRunner::new())
        .run()
        .unwrap_err();

    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("could not spawn"));
}
