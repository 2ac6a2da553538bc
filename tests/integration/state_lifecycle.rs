//! Integration tests for mixer.state load/save and format resolution

use super::test_utils::write_file;
use mixer::state::{FormatResolver, FormatSource, MixState, CURRENT_STATE_VERSION};
use mixer::VersionedDocument;
use tempfile::TempDir;

#[test]
fn test_first_load_creates_state_file() {
    let temp_dir = TempDir::new().unwrap();
    let system = write_file(temp_dir.path(), "format", "25\n");
    let resolver = FormatResolver::new(temp_dir.path().join("builder.conf"), &system);
    let state_path = temp_dir.path().join("mixer.state");

    let state = MixState::load_with(Some(&state_path), &resolver).unwrap();
    assert_eq!(state.format(), "25");
    assert!(!state.is_offline());
    assert_eq!(state.format_source(), &FormatSource::System(system.clone()));

    let text = std::fs::read_to_string(&state_path).unwrap();
    assert_eq!(
        text,
        format!(
            "#VERSION {}\n\n[Mix]\nFORMAT = \"25\"\nOFFLINE = \"false\"\n",
            CURRENT_STATE_VERSION
        )
    );
}

#[test]
fn test_second_load_reads_persisted_format() {
    let temp_dir = TempDir::new().unwrap();
    let system = write_file(temp_dir.path(), "format", "25\n");
    let resolver = FormatResolver::new(temp_dir.path().join("builder.conf"), &system);
    let state_path = temp_dir.path().join("mixer.state");

    MixState::load_with(Some(&state_path), &resolver).unwrap();
    std::fs::write(&system, "30\n").unwrap();

    let state = MixState::load_with(Some(&state_path), &resolver).unwrap();
    assert_eq!(state.format(), "25");
    assert!(!state.is_offline());
    assert_eq!(
        state.format_source(),
        &FormatSource::State(state_path.clone())
    );
}

#[test]
fn test_config_format_wins_over_system_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_file(temp_dir.path(), "builder.conf", "[swupd]\nFORMAT=3\n");
    let system = write_file(temp_dir.path(), "format", "7\n");
    let resolver = FormatResolver::new(&config, &system);

    let state =
        MixState::load_with(Some(&temp_dir.path().join("mixer.state")), &resolver).unwrap();
    assert_eq!(state.format(), "3");
    assert_eq!(state.format_source(), &FormatSource::Config(config));
}

#[test]
fn test_updates_survive_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let resolver = FormatResolver::new(
        temp_dir.path().join("builder.conf"),
        temp_dir.path().join("format"),
    );
    let state_path = temp_dir.path().join("mixer.state");

    let mut state = MixState::load_with(Some(&state_path), &resolver).unwrap();
    state.set_format("31");
    state.set_offline(true);
    state.save().unwrap();

    let loaded = MixState::load_with(Some(&state_path), &resolver).unwrap();
    assert_eq!(loaded.mix, state.mix);
    assert!(loaded.is_offline());
    assert_eq!(loaded.version(), CURRENT_STATE_VERSION);
}

#[test]
fn test_state_io_errors_are_surfaced() {
    let temp_dir = TempDir::new().unwrap();
    let resolver = FormatResolver::new(
        temp_dir.path().join("builder.conf"),
        temp_dir.path().join("format"),
    );

    // A directory cannot be read as a state file.
    let err = MixState::load_with(Some(temp_dir.path()), &resolver).unwrap_err();
    assert!(!err.is_not_found());
}
