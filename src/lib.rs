pub mod audio;
pub mod audio_api;
pub mod core;
pub mod message;
pub mod middle;
pub mod modes;
pub mod pipeline;
pub mod sequencer;
pub mod shared;
pub mod tui;
