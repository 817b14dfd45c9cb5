//! Exit codes and suggestions for failed runs.

use std::path::{Path, PathBuf};

use assert_cmd::cargo;
use predicates::prelude::*;
use tempfile::TempDir;

fn rails_template() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates/rails")
}

fn appstrap(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo::cargo_bin_cmd!("appstrap");
    cmd.env("XDG_CONFIG_HOME", home.join("config"))
        .env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .current_dir(home);
    cmd
}

#[test]
fn unsupported_option_exits_with_two() {
    let tmp = TempDir::new().unwrap();
    appstrap(tmp.path())
        .args(["new", "blog", "--non-interactive", "--skip-git=true", "--template"])
        .arg(rails_template())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unsupported option: skip_git=true"));

    assert!(!tmp.path().join("blog").exists());
}

#[test]
fn old_toolchain_exits_with_two() {
    let tmp = TempDir::new().unwrap();
    appstrap(tmp.path())
        .args([
            "new",
            "blog",
            "--non-interactive",
            "--toolchain-version",
            "5.2.0",
            "--template",
        ])
        .arg(rails_template())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("requires Rails ~> 6.0.0"))
        .stderr(predicate::str::contains("You are using 5.2.0"));
}

#[test]
fn missing_template_exits_with_three() {
    let tmp = TempDir::new().unwrap();
    appstrap(tmp.path())
        .args([
            "new",
            "blog",
            "--non-interactive",
            "--toolchain-version",
            "6.0.3",
            "--template",
        ])
        .arg(tmp.path().join("no-such-template"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Could not resolve template source"));
}

#[test]
fn invalid_app_name_exits_with_two() {
    let tmp = TempDir::new().unwrap();
    appstrap(tmp.path())
        .args(["new", ".hidden"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid application name"));
}

#[test]
fn missing_config_file_exits_with_four() {
    let tmp = TempDir::new().unwrap();
    appstrap(tmp.path())
        .arg("--config")
        .arg(tmp.path().join("absent.toml"))
        .args(["config", "show"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn malformed_flag_value_exits_with_two() {
    let tmp = TempDir::new().unwrap();
    appstrap(tmp.path())
        .args(["new", "blog", "--skip-bundle=maybe"])
        .assert()
        .code(2);
}
