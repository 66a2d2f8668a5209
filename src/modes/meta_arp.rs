// Scale arpeggiator that turns around every time a track fires: up, down,
// up, ... Each track keeps its own direction.
//
// param 0: root, C1..C7 (24-96)
// param 1: scale band (see scale::ARP_SCALES)
// param 2: note duration, 20-400 ms
// param 3: note count, 2-16

use super::scale::{ARP_SCALES, map_param, select};
use crate::message::OutputBuffer;
use crate::pipeline::Event;
use crate::shared::NUM_TRACKS;

const MIN_ROOT: u32 = 24;
const MAX_ROOT: u32 = 96;
const MIN_DURATION: u32 = 20;
const MAX_DURATION: u32 = 400;
const MIN_NOTES: u32 = 2;
const MAX_NOTES: u32 = 16;
const OCTAVE_SPAN: usize = 3;
const BASE_VELOCITY: u8 = 100;
const VELOCITY_STEP: u8 = 5;
const MIN_VELOCITY: u8 = 60;

pub const MAX_OUTPUT: usize = 2 * MAX_NOTES as usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    fn flipped(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetaArp {
    channel: u8,
    direction: [Direction; NUM_TRACKS],
}

impl MetaArp {
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            direction: [Direction::Up; NUM_TRACKS],
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Direction the track will run the next time it fires.
    pub fn direction(&self, track: usize) -> Option<Direction> {
        self.direction.get(track).copied()
    }

    pub fn reset(&mut self) {
        self.direction = [Direction::Up; NUM_TRACKS];
    }

    pub fn transform(&mut self, track: usize, event: Event, out: &mut OutputBuffer) {
        let Some(direction) = self.direction.get_mut(track) else {
            return;
        };
        // rests leave the direction alone
        if !event.switch() {
            return;
        }

        let [root, scale, duration, count] = event.params();
        let root = map_param(root, MIN_ROOT, MAX_ROOT).min(MAX_ROOT) as u8;
        let scale = select(&ARP_SCALES, scale);
        let duration = map_param(duration, MIN_DURATION, MAX_DURATION);
        let count = map_param(count, MIN_NOTES, MAX_NOTES).clamp(MIN_NOTES, MAX_NOTES) as usize;
        let span = scale.len() * OCTAVE_SPAN;

        let mut delay = 0;
        for i in 0..count {
            let degree = match *direction {
                Direction::Up => i % span,
                Direction::Down => (count - 1 - i) % span,
            };
            let note = scale.note(root, degree);
            let velocity = BASE_VELOCITY
                .saturating_sub(i as u8 * VELOCITY_STEP)
                .max(MIN_VELOCITY);
            out.note_on(self.channel, note, velocity, delay);
            out.note_off(self.channel, note, delay + duration);
            delay += duration;
        }

        *direction = direction.flipped();
    }
}
