//! Integration tests for the mixer binary.

use super::test_utils::{current_config, write_file};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn mixer(workdir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mixer"))
        .current_dir(workdir)
        .env_remove("MIXER_LOG")
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_config_init_writes_default_config() {
    let temp_dir = TempDir::new().unwrap();

    let output = mixer(temp_dir.path(), &["config", "init"]);
    assert!(output.status.success(), "{:?}", output);

    let text = std::fs::read_to_string(temp_dir.path().join("builder.conf")).unwrap();
    assert!(text.starts_with("#VERSION 1.0\n\n"));
    assert!(text.contains("Swupd_Root.pem"));

    // A second init leaves the file alone without --force.
    std::fs::write(temp_dir.path().join("builder.conf"), "custom").unwrap();
    let output = mixer(temp_dir.path(), &["config", "init"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("already exists"));
    assert_eq!(
        std::fs::read_to_string(temp_dir.path().join("builder.conf")).unwrap(),
        "custom"
    );
}

#[test]
fn test_config_get_and_validate() {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "builder.conf", &current_config("/srv/mix"));

    let output = mixer(temp_dir.path(), &["config", "get", "builder.cert"]);
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout(&output).trim(), "/srv/mix/Swupd_Root.pem");

    let output = mixer(temp_dir.path(), &["config", "validate"]);
    assert!(output.status.success(), "{:?}", output);

    let output = mixer(temp_dir.path(), &["config", "print"]);
    assert!(output.status.success(), "{:?}", output);
    assert!(stdout(&output).contains("CONTENTURL = \"http://example.com/update\""));
}

#[test]
fn test_config_validate_reports_missing_field() {
    let temp_dir = TempDir::new().unwrap();
    let contents = current_config("/srv/mix").replace("CERT = \"/srv/mix/Swupd_Root.pem\"", "CERT = \"\"");
    let path = write_file(temp_dir.path(), "mix.conf", &contents);

    let output = mixer(
        temp_dir.path(),
        &["--config", path.to_str().unwrap(), "config", "validate"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Missing required field in config file: CERT"));
}

#[test]
fn test_state_show_and_set() {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "builder.conf", "[swupd]\nFORMAT=4\n");

    let output = mixer(temp_dir.path(), &["state", "show"]);
    assert!(output.status.success(), "{:?}", output);
    assert!(stdout(&output).contains("Format: 4"));
    assert!(stdout(&output).contains("Offline: false"));

    let output = mixer(
        temp_dir.path(),
        &["state", "set", "--offline", "true", "--format", "6"],
    );
    assert!(output.status.success(), "{:?}", output);

    let text = std::fs::read_to_string(temp_dir.path().join("mixer.state")).unwrap();
    assert!(text.contains("FORMAT = \"6\""));
    assert!(text.contains("OFFLINE = \"true\""));
}
