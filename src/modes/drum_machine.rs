// Eight GM drum lanes.
//
// param 0: velocity (0 plays at 100)
// param 1: flam, a 60% grace hit 5-50 ms ahead of the main hit
// param 2: note length, 10-2000 ms
// param 3: pan, sent as CC10 when non-zero

use super::scale::map_param;
use crate::message::{CC_PAN, OutputBuffer};
use crate::pipeline::Event;
use crate::shared::NUM_TRACKS;

pub const DRUM_NOTES: [u8; NUM_TRACKS] = [
    36, // kick
    38, // snare
    42, // closed hat
    46, // open hat
    43, // low tom
    47, // mid tom
    49, // crash
    51, // ride
];

const DEFAULT_VELOCITY: u8 = 100;
const FLAM_VELOCITY_PERCENT: u16 = 60;
const MIN_NOTE_LENGTH: u32 = 10;
const MAX_NOTE_LENGTH: u32 = 2000;
const MIN_FLAM_DELAY: u32 = 5;
const MAX_FLAM_DELAY: u32 = 50;

pub const MAX_OUTPUT: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrumMachine {
    channel: u8,
}

impl DrumMachine {
    pub fn new(channel: u8) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn transform(&self, track: usize, event: Event, out: &mut OutputBuffer) {
        let Some(&note) = DRUM_NOTES.get(track) else {
            return;
        };
        if !event.switch() {
            return;
        }
        let [velocity, flam, length, pan] = event.params();
        let velocity = if velocity == 0 { DEFAULT_VELOCITY } else { velocity };
        let length = map_param(length, MIN_NOTE_LENGTH, MAX_NOTE_LENGTH);
        let ch = self.channel;

        if flam > 0 {
            let flam_delay = map_param(flam, MIN_FLAM_DELAY, MAX_FLAM_DELAY);
            let flam_velocity = (u16::from(velocity) * FLAM_VELOCITY_PERCENT / 100) as u8;
            out.note_on(ch, note, flam_velocity, 0);
            out.note_off(ch, note, length / 3);
            out.note_on(ch, note, velocity, flam_delay);
            out.note_off(ch, note, flam_delay + length);
        } else {
            out.note_on(ch, note, velocity, 0);
            out.note_off(ch, note, length);
        }

        if pan > 0 {
            out.control_change(ch, CC_PAN, pan, 0);
        }
    }
}
