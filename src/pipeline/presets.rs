// Factory content. Presets write straight into a Song; the sequencer never
// parses or persists song data itself.

use serde::{Deserialize, Serialize};

use super::event::Event;
use super::pattern::Pattern;
use super::song::Song;

const SEQUENCE_MODE: usize = 0;
const DRUM_MODE: usize = 1;

// drum machine track lanes
const KICK: usize = 0;
const SNARE: usize = 1;
const CLOSED_HAT: usize = 2;
const OPEN_HAT: usize = 3;
const LOW_TOM: usize = 4;
const MID_TOM: usize = 5;
const CRASH: usize = 6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Demo,
    Techno,
    Breakbeat,
    Empty,
}

impl Preset {
    pub fn name(self) -> &'static str {
        match self {
            Preset::Demo => "demo",
            Preset::Techno => "techno",
            Preset::Breakbeat => "breakbeat",
            Preset::Empty => "empty",
        }
    }

    /// Clears `song` and writes this preset into it.
    pub fn load(self, song: &mut Song) {
        song.clear();
        match self {
            Preset::Demo => load_demo(song),
            Preset::Techno => load_techno(song.pattern_mut(DRUM_MODE, 0)),
            Preset::Breakbeat => load_breakbeat(song.pattern_mut(DRUM_MODE, 0)),
            Preset::Empty => {}
        }
        tracing::info!(preset = self.name(), "loaded preset");
    }

    pub fn build(self) -> Box<Song> {
        let mut song = Song::boxed();
        self.load(&mut song);
        song
    }
}

// drum params: velocity, flam, length, pan
fn hit(pattern: &mut Pattern, track: usize, step: usize, velocity: u8, flam: u8, length: u8, pan: u8) {
    pattern[track].set_event(step, Event::new(true, velocity, flam, length, pan));
}

fn load_demo(song: &mut Song) {
    // sequence slot 0 -> pattern 0, forever
    song.pattern_mut(SEQUENCE_MODE, 0)[0].set_event(0, Event::new(true, 0, 0, 0, 0));

    let drums = song.pattern_mut(DRUM_MODE, 0);
    hit(drums, KICK, 0, 127, 64, 0, 0);
    hit(drums, SNARE, 8, 127, 64, 0, 0);
    // acid bass pattern 0 stays blank
}

fn load_techno(drums: &mut Pattern) {
    for step in (0..16).step_by(4) {
        hit(drums, KICK, step, 127, 64, 0, 0);
    }

    hit(drums, SNARE, 4, 100, 64, 0, 40);
    hit(drums, SNARE, 12, 100, 64, 0, 40);

    for step in 0..16 {
        let velocity = if step % 4 == 0 { 110 } else { 70 };
        hit(drums, CLOSED_HAT, step, velocity, 64, 30, 0);
    }

    hit(drums, OPEN_HAT, 2, 80, 64, 0, 0);
    hit(drums, OPEN_HAT, 10, 75, 64, 0, 0);

    hit(drums, CRASH, 0, 120, 64, 0, 50);
    hit(drums, CRASH, 8, 100, 64, 0, 40);
}

fn load_breakbeat(drums: &mut Pattern) {
    hit(drums, KICK, 0, 127, 64, 0, 0);
    hit(drums, KICK, 3, 100, 64, 0, 0);
    hit(drums, KICK, 8, 120, 64, 0, 0);
    hit(drums, KICK, 13, 90, 64, 0, 0); // ghost

    hit(drums, SNARE, 4, 120, 64, 0, 20);
    hit(drums, SNARE, 12, 127, 64, 0, 20);
    hit(drums, SNARE, 14, 100, 64, 0, 15);

    for step in [0, 1, 2, 3, 4, 6, 8, 9, 10, 11, 12, 14, 15] {
        let velocity = if step % 4 == 0 { 100 } else { 75 };
        hit(drums, CLOSED_HAT, step, velocity, 64, 0, 0);
    }

    hit(drums, OPEN_HAT, 2, 90, 64, 0, 10);
    hit(drums, OPEN_HAT, 10, 85, 64, 0, 10);

    hit(drums, LOW_TOM, 7, 100, 64, 0, 0);
    hit(drums, MID_TOM, 15, 110, 64, 0, 0);
}
