use gruvtty::modes::ModeKind;
use gruvtty::pipeline::{Config, ConfigError, ModeSlot, Preset, config_file_path, load_config, save_config};
use gruvtty::sequencer::Sequencer;

#[test]
fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(dir.path()).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        bpm: 98.5,
        preset: Preset::Breakbeat,
        midi_clock: true,
        modes: vec![
            ModeSlot { slot: 0, kind: ModeKind::PatternSequencer, channel: 10 },
            ModeSlot { slot: 4, kind: ModeKind::MetaArp, channel: 12 },
        ],
        ..Config::default()
    };
    save_config(dir.path(), &config).unwrap();
    assert!(config_file_path(dir.path()).exists());

    let loaded = load_config(dir.path()).unwrap();
    assert_eq!(loaded, config);

    let seq = Sequencer::from_config(&loaded).unwrap();
    assert_eq!(seq.modes().len(), 2);
    assert_eq!(seq.modes().name(4), "MetaArp");
    assert_eq!(seq.modes().name(1), "Empty");
    assert_eq!(seq.bpm(), 98.5);
}

#[test]
fn broken_json_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = config_file_path(dir.path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ \"bpm\": ").unwrap();
    assert!(matches!(load_config(dir.path()), Err(ConfigError::Parse(_))));
}

#[test]
fn invalid_layout_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = config_file_path(dir.path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{ "modes": [ { "slot": 3, "kind": "acid_bass", "channel": 0 } ] }"#).unwrap();
    assert!(matches!(
        load_config(dir.path()),
        Err(ConfigError::InvalidChannel { slot: 3, channel: 0 })
    ));
}
