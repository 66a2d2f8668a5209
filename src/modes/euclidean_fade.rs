// Generative echoes: one trigger becomes up to eight notes, spaced
// geometrically (d, 2d, 4d, ...) and fading 20% each time.
//
// param 0: pitch, C1..C7 (24-96)
// param 1: spacing, 1-16 reference steps of 125 ms
// param 2: echo count, 1-8
// param 3: semitone shift per echo, -12..+12 centred on 64

use super::scale::map_param;
use crate::message::OutputBuffer;
use crate::pipeline::Event;
use crate::shared::{MAX_DATA, NUM_TRACKS};

const MIN_NOTE: u32 = 24;
const MAX_NOTE: u32 = 96;
const MIN_SPACING_STEPS: u32 = 1;
const MAX_SPACING_STEPS: u32 = 16;
const MAX_ECHOES: u32 = 8;
const REFERENCE_STEP_MS: u32 = 125;
const BASE_VELOCITY: u32 = 100;
const MIN_VELOCITY: u32 = 10;
const MIN_NOTE_LENGTH: u32 = 50;
const SHIFT_CENTER: i16 = 64;
const MAX_SHIFT: i16 = 12;

pub const MAX_OUTPUT: usize = 2 * MAX_ECHOES as usize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EuclideanFade {
    channel: u8,
}

impl EuclideanFade {
    pub fn new(channel: u8) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn transform(&self, track: usize, event: Event, out: &mut OutputBuffer) {
        if track >= NUM_TRACKS || !event.switch() {
            return;
        }

        let [pitch, spacing, count, shift] = event.params();
        let base = map_param(pitch, MIN_NOTE, MAX_NOTE).min(MAX_NOTE) as i16;
        let spacing = map_param(spacing, MIN_SPACING_STEPS, MAX_SPACING_STEPS) * REFERENCE_STEP_MS;
        let count = map_param(count, 1, MAX_ECHOES);
        let shift = (i16::from(shift) - SHIFT_CENTER) * MAX_SHIFT / SHIFT_CENTER;
        let length = (spacing / 2).max(MIN_NOTE_LENGTH);

        let mut velocity = BASE_VELOCITY;
        let mut delay = 0;
        let mut multiplier = 1;
        for echo in 0..count as i16 {
            let note = (base + shift * echo).clamp(0, i16::from(MAX_DATA)) as u8;
            let echo_velocity = velocity.max(MIN_VELOCITY) as u8;
            out.note_on(self.channel, note, echo_velocity, delay);
            out.note_off(self.channel, note, delay + length);

            delay += spacing * multiplier;
            multiplier *= 2;
            velocity = velocity * 4 / 5;
        }
    }
}
