// startup settings: tempo, which preset to load, and which mode lives in which
// slot on which channel. read once on startup, written back on quit.
// song content is never saved here, only the name of the preset to start from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::presets::Preset;
use crate::modes::{Mode, ModeKind, ModeRegistry};
use crate::shared::{DEFAULT_BPM, MAX_CHANNEL, MIN_CHANNEL, NUM_MODES, is_valid_channel};

const GRUVTTY_DIR: &str = ".gruvtty";
const CONFIG_FILE: &str = "config.json";
const DEFAULT_SAMPLE_RATE: u32 = 44_100;
const SEQUENCE_SLOT: usize = 0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("mode slot {0} is out of range (0-{max})", max = NUM_MODES - 1)]
    InvalidSlot(usize),
    #[error("slot {slot}: channel {channel} is out of range ({min}-{max})", min = MIN_CHANNEL, max = MAX_CHANNEL)]
    InvalidChannel { slot: usize, channel: u8 },
    #[error("mode slot {0} is assigned twice")]
    DuplicateSlot(usize),
    #[error("slot {slot}: {kind:?} can't go here (slot 0 is the pattern sequencer, and only slot 0)")]
    WrongSlotKind { slot: usize, kind: ModeKind },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSlot {
    pub slot: usize,
    pub kind: ModeKind,
    pub channel: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bpm: f32,
    pub preset: Preset,
    pub midi_clock: bool,
    pub debug_feedback: bool,
    pub sample_rate: u32,
    pub modes: Vec<ModeSlot>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            preset: Preset::default(),
            midi_clock: false,
            debug_feedback: false,
            sample_rate: DEFAULT_SAMPLE_RATE,
            // slot n plays on channel n + 1
            modes: ModeKind::ALL
                .into_iter()
                .enumerate()
                .map(|(slot, kind)| ModeSlot { slot, kind, channel: slot as u8 + 1 })
                .collect(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = [false; NUM_MODES];
        for entry in &self.modes {
            let Some(taken) = seen.get_mut(entry.slot) else {
                return Err(ConfigError::InvalidSlot(entry.slot));
            };
            if *taken {
                return Err(ConfigError::DuplicateSlot(entry.slot));
            }
            if !is_valid_channel(entry.channel) {
                return Err(ConfigError::InvalidChannel { slot: entry.slot, channel: entry.channel });
            }
            // slot 0 holds the chaining playlist, never a sounding lane
            if (entry.slot == SEQUENCE_SLOT) != (entry.kind == ModeKind::PatternSequencer) {
                return Err(ConfigError::WrongSlotKind { slot: entry.slot, kind: entry.kind });
            }
            *taken = true;
        }
        Ok(())
    }

    pub fn build_registry(&self) -> Result<ModeRegistry, ConfigError> {
        self.validate()?;
        let mut registry = ModeRegistry::new();
        for entry in &self.modes {
            registry.register(entry.slot, Mode::new(entry.kind, entry.channel));
        }
        Ok(registry)
    }
}

// <project_dir>/.gruvtty/config.json
pub fn config_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(GRUVTTY_DIR).join(CONFIG_FILE)
}

// <project_dir>/.gruvtty/, also where the log goes
pub fn config_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(GRUVTTY_DIR)
}

// a missing file is fine, you get the defaults. a broken one is an error.
pub fn load_config(project_dir: &Path) -> Result<Config, ConfigError> {
    let path = config_file_path(project_dir);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        Err(e) => return Err(e.into()),
    };
    let config: Config = serde_json::from_str(&data)?;
    config.validate()?;
    tracing::info!(path = %path.display(), modes = config.modes.len(), "loaded config");
    Ok(config)
}

// makes .gruvtty/ if it isn't there yet
pub fn save_config(project_dir: &Path, config: &Config) -> Result<(), ConfigError> {
    let path = config_file_path(project_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
