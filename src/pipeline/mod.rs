// data model plus the two ways content gets in: presets and the config file

pub mod config;
pub mod event;
pub mod pattern;
pub mod presets;
pub mod song;
pub mod track;

pub use config::{Config, ConfigError, ModeSlot, config_dir, config_file_path, load_config, save_config};
pub use event::Event;
pub use pattern::Pattern;
pub use presets::Preset;
pub use song::Song;
pub use track::Track;
