// Mode slot 0. Its events are pattern-selection commands read by the
// sequencer at loop boundaries, so the transform itself never emits anything.

use crate::pipeline::Event;
use crate::shared::NUM_PATTERNS;

const END_OF_LOOP_THRESHOLD: u8 = 43;
const CROSSFADE_THRESHOLD: u8 = 85;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionType {
    Immediate,
    EndOfLoop,
    Crossfade,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternSequencer {
    channel: u8,
}

impl PatternSequencer {
    pub fn new(channel: u8) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }
}

/// Param 0 scaled from 0-127 onto the 32 patterns.
pub fn target_pattern(event: Event) -> u8 {
    let pattern = usize::from(event.param(0)) * NUM_PATTERNS / 128;
    pattern.min(NUM_PATTERNS - 1) as u8
}

pub fn transition_type(event: Event) -> TransitionType {
    match event.param(1) {
        v if v < END_OF_LOOP_THRESHOLD => TransitionType::Immediate,
        v if v < CROSSFADE_THRESHOLD => TransitionType::EndOfLoop,
        _ => TransitionType::Crossfade,
    }
}

/// Which mode slots a command targets: param 2 is the low seven bits,
/// param 3 supplies the bits above.
pub fn mode_bitmask(event: Event) -> u16 {
    (u16::from(event.param(3)) << 7) | u16::from(event.param(2))
}
