//! Integration tests for maschine-plugin

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture_config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("config.toml")
}

fn plugin_cmd(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("maschine-plugin");
    cmd.current_dir(dir)
        .env("MASCHINE_CONFIG", fixture_config_path())
        .env_remove("MASCHINE_PLUGIN_LOG_LEVEL")
        .env_remove("MASCHINE_LOG_FORMAT")
        .env("NO_COLOR", "1");
    cmd
}

fn generate_mail_plugin(dir: &Path) {
    plugin_cmd(dir)
        .args([
            "generate",
            "--id",
            "io.maschine.plugins.mail",
            "--name",
            "mail-plugin",
            "--author",
            "Ada",
            "--email",
            "ada@example.com",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Generated manifest"));
}

#[test]
fn test_version() {
    let Ok(dir) = TempDir::new() else {
        return;
    };
    plugin_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("maschine-plugin"));
}

#[test]
fn test_help() {
    let Ok(dir) = TempDir::new() else {
        return;
    };
    plugin_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generate, validate and update"));
}

#[test]
fn test_invalid_command() {
    let Ok(dir) = TempDir::new() else {
        return;
    };
    plugin_cmd(dir.path()).arg("invalid").assert().failure();
}

#[test]
fn test_generate_then_validate() {
    let Ok(dir) = TempDir::new() else {
        return;
    };
    generate_mail_plugin(dir.path());

    let path = dir.path().join("plugin-manifest.json");
    let content = fs::read_to_string(&path).unwrap_or_default();
    assert!(content.contains("\"manifestVersion\": \"2.0\""));
    assert!(content.contains("\"startup_timeout\": \"30s\""));
    assert!(content.contains("mrn:mail:example:action"));

    plugin_cmd(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Plugin ID: io.maschine.plugins.mail"))
        .stdout(predicate::str::contains("1. mrn:mail:example:action (action)"));
}

#[test]
fn test_validate_verbose_shows_resource_detail() {
    let Ok(dir) = TempDir::new() else {
        return;
    };
    generate_mail_plugin(dir.path());

    plugin_cmd(dir.path())
        .args(["-v", "validate"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Example Action: 1 parameters (1 required)"));

    plugin_cmd(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stderr(predicate::str::contains("parameters (1 required)").not());
}

#[test]
fn test_generate_rejects_invalid_id() {
    let Ok(dir) = TempDir::new() else {
        return;
    };
    plugin_cmd(dir.path())
        .args(["generate", "--id", "invalid_id", "--name", "mail-plugin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reverse domain notation"));
    assert!(!dir.path().join("plugin-manifest.json").exists());
}

#[test]
fn test_validate_reports_every_violation() {
    let Ok(dir) = TempDir::new() else {
        return;
    };
    let path = dir.path().join("broken.json");
    assert!(fs::write(&path, r#"{"plugin": {"id": "invalid_id"}}"#).is_ok());

    plugin_cmd(dir.path())
        .args(["validate", "--manifest", "broken.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("manifestVersion: is required"))
        .stderr(predicate::str::contains("plugin.id: must follow reverse domain notation"))
        .stderr(predicate::str::contains("resources: at least one resource must be defined"));
}

#[test]
fn test_validate_without_manifest() {
    let Ok(dir) = TempDir::new() else {
        return;
    };
    plugin_cmd(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No manifest file found"));
}

#[test]
fn test_update_version_and_checksums() {
    let Ok(dir) = TempDir::new() else {
        return;
    };
    generate_mail_plugin(dir.path());

    let hash = "0f".repeat(32);
    let listing = format!(
        "{hash}  mail-plugin_1.2.0_linux_x86_64.tar.gz\n{hash}  mail-plugin_1.2.0_darwin_arm64.tar.gz\n"
    );
    assert!(fs::write(dir.path().join("checksums.txt"), listing).is_ok());

    plugin_cmd(dir.path())
        .args([
            "update",
            "--version",
            "v1.2.0",
            "--project",
            "mail-plugin",
            "--checksums",
            "checksums.txt",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Version: 1.2.0"))
        .stdout(predicate::str::contains("Checksums: 2 platforms"));

    let content = fs::read_to_string(dir.path().join("plugin-manifest.json")).unwrap_or_default();
    assert!(content.contains("\"version\": \"1.2.0\""));
    assert!(content.contains(&format!("\"linux-amd64\": \"sha256:{}\"", hash)));
}

#[test]
fn test_update_checksums_requires_project() {
    let Ok(dir) = TempDir::new() else {
        return;
    };
    plugin_cmd(dir.path())
        .args(["update", "--checksums", "checksums.txt"])
        .assert()
        .failure();
}

#[test]
fn test_resources_listing() {
    let Ok(dir) = TempDir::new() else {
        return;
    };
    generate_mail_plugin(dir.path());

    plugin_cmd(dir.path())
        .arg("resources")
        .assert()
        .success()
        .stdout(predicate::str::contains("mrn:mail:example:action - Example Action"))
        .stdout(predicate::str::contains("parameters: input*"));
}
