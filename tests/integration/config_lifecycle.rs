//! Integration tests for builder.conf load/save

use super::test_utils::{current_config, lock_env, write_file};
use mixer::config::{MixConfig, CURRENT_CONFIG_VERSION};
use mixer::{ConfigError, VersionedDocument};
use tempfile::TempDir;

#[test]
fn test_save_then_load_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = MixConfig::load_defaults_for_path(temp_dir.path());
    config.swupd.content_url = "https://mix.example.com/update".to_string();
    config.swupd.version_url = "https://mix.example.com/version".to_string();
    config.server.debug_info_banned = "false".to_string();
    config.mixer.docker_image_path = String::new();
    config.save().unwrap();

    let loaded = MixConfig::load(Some(config.filename())).unwrap();
    assert_eq!(loaded.builder, config.builder);
    assert_eq!(loaded.swupd, config.swupd);
    assert_eq!(loaded.server, config.server);
    assert_eq!(loaded.mixer, config.mixer);
    assert_eq!(loaded.version(), CURRENT_CONFIG_VERSION);
    assert_eq!(loaded.filename(), config.filename());
}

#[test]
fn test_saved_file_starts_with_version_header() {
    let temp_dir = TempDir::new().unwrap();
    let config = MixConfig::load_defaults_for_path(temp_dir.path());
    config.save().unwrap();

    let text = std::fs::read_to_string(temp_dir.path().join("builder.conf")).unwrap();
    assert!(text.starts_with("#VERSION 1.0\n\n["));
}

#[test]
fn test_loading_current_file_does_not_rewrite_it() {
    let temp_dir = TempDir::new().unwrap();
    let contents = current_config("/srv/mix");
    let path = write_file(temp_dir.path(), "builder.conf", &contents);

    let config = MixConfig::load(Some(&path)).unwrap();
    assert_eq!(config.builder.cert, "/srv/mix/Swupd_Root.pem");
    assert_eq!(config.swupd.content_url, "http://example.com/update");
    assert!(!config.has_format_field());

    // Comments and layout survive: no conversion happened.
    assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);

    MixConfig::load(Some(&path)).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);
}

#[test]
fn test_absent_keys_keep_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        temp_dir.path(),
        "builder.conf",
        "#VERSION 1.0\n\n[Builder]\nCERT = \"/etc/mix/cert.pem\"\n",
    );

    let mut config = MixConfig::load_defaults_for_path(temp_dir.path());
    let defaults = config.clone();
    config.load_from(Some(&path)).unwrap();

    assert_eq!(config.builder.cert, "/etc/mix/cert.pem");
    assert_eq!(config.builder.server_state_dir, defaults.builder.server_state_dir);
    assert_eq!(config.swupd, defaults.swupd);
    assert_eq!(config.mixer, defaults.mixer);
}

#[test]
fn test_missing_required_field_fails_load() {
    let temp_dir = TempDir::new().unwrap();
    let contents = current_config("/srv/mix").replace(
        "LOCAL_RPM_DIR = \"/srv/mix/local-rpms\"",
        "LOCAL_RPM_DIR = \"\"",
    );
    let path = write_file(temp_dir.path(), "builder.conf", &contents);

    match MixConfig::load(Some(&path)) {
        Err(ConfigError::MissingField(name)) => assert_eq!(name, "LOCAL_RPM_DIR"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_env_references_are_expanded() {
    let _guard = lock_env();
    std::env::set_var("MIXER_IT_OPT_ROOT", "/opt");

    let temp_dir = TempDir::new().unwrap();
    let contents = current_config("/srv/mix")
        .replace("\"/srv/mix/local-rpms\"", "\"$MIXER_IT_OPT_ROOT/bin\"")
        .replace("\"/srv/mix/update\"", "\"${MIXER_IT_OPT_ROOT}/update\"");
    let path = write_file(temp_dir.path(), "builder.conf", &contents);

    let config = MixConfig::load(Some(&path)).unwrap();
    assert_eq!(config.mixer.local_rpm_dir, "/opt/bin");
    assert_eq!(config.builder.server_state_dir, "/opt/update");

    // The file keeps the references.
    assert!(std::fs::read_to_string(&path)
        .unwrap()
        .contains("$MIXER_IT_OPT_ROOT/bin"));

    std::env::remove_var("MIXER_IT_OPT_ROOT");
}

#[test]
fn test_undefined_env_reference_fails_load() {
    let _guard = lock_env();
    std::env::remove_var("MIXER_IT_UNDEFINED_ROOT");

    let temp_dir = TempDir::new().unwrap();
    let contents =
        current_config("/srv/mix").replace("\"/srv/mix/local-rpms\"", "\"$MIXER_IT_UNDEFINED_ROOT/bin\"");
    let path = write_file(temp_dir.path(), "builder.conf", &contents);

    let err = MixConfig::load(Some(&path)).unwrap_err();
    match &err {
        ConfigError::UndefinedEnvVar(name) => assert_eq!(name, "MIXER_IT_UNDEFINED_ROOT"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("MIXER_IT_UNDEFINED_ROOT"));
}

#[test]
fn test_missing_config_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = MixConfig::load(Some(&temp_dir.path().join("builder.conf"))).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_malformed_body_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        temp_dir.path(),
        "builder.conf",
        "#VERSION 1.0\n\n[Builder]\nCERT = \"unterminated\n",
    );

    let err = MixConfig::load(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_newer_version_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let contents = current_config("/srv/mix").replace("#VERSION 1.0", "#VERSION 3.2");
    let path = write_file(temp_dir.path(), "builder.conf", &contents);

    let err = MixConfig::load(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedVersion { .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);
}

#[test]
fn test_convert_skips_current_file() {
    let temp_dir = TempDir::new().unwrap();
    let contents = current_config("/srv/mix");
    let path = write_file(temp_dir.path(), "builder.conf", &contents);

    let mut config = MixConfig::load_defaults_for_path(temp_dir.path());
    assert!(!config.convert(Some(&path)).unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);
}
