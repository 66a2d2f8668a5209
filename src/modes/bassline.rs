// Bassline figures over a chosen scale. Each trigger plays one short figure
// laid out inside a 125 ms reference step.
//
// param 0: root, C1..C4 (36-72)
// param 1: scale band (see scale::BASS_SCALES)
// param 2: figure band (see Figure)
// param 3: note duration, 50-1000 ms

use super::scale::{BASS_SCALES, Scale, band, map_param, select};
use crate::message::OutputBuffer;
use crate::pipeline::Event;
use crate::shared::NUM_TRACKS;

const MIN_ROOT: u32 = 36;
const MAX_ROOT: u32 = 72;
const MIN_DURATION: u32 = 50;
const MAX_DURATION: u32 = 1000;
const STEP_MS: u32 = 125;
const BASE_VELOCITY: u8 = 110;
const ACCENT_VELOCITY: u8 = 127;
const APPROACH_VELOCITY: u8 = BASE_VELOCITY - 20;

// scale degrees
const ROOT: usize = 0;
const THIRD: usize = 2;
const FIFTH: usize = 4;
const SEVENTH: usize = 6;
const OCTAVE: usize = 7;

pub const MAX_OUTPUT: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Figure {
    RootOnly,
    RootFifth,
    RootFifthOctave,
    Triad,
    SeventhWalk,
    OctaveBounce,
    ChromaticApproach,
    FifthPedal,
}

impl Figure {
    const ALL: [Figure; 8] = [
        Figure::RootOnly,
        Figure::RootFifth,
        Figure::RootFifthOctave,
        Figure::Triad,
        Figure::SeventhWalk,
        Figure::OctaveBounce,
        Figure::ChromaticApproach,
        Figure::FifthPedal,
    ];

    pub fn from_param(value: u8) -> Self {
        Self::ALL[band(value)]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bassline {
    channel: u8,
}

impl Bassline {
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

        let [root, scale, figure, duration] = event.params();
        let root = map_param(root, MIN_ROOT, MAX_ROOT).min(MAX_ROOT) as u8;
        let scale = select(&BASS_SCALES, scale);
        let duration = map_param(duration, MIN_DURATION, MAX_DURATION);
        let mut play = |note: u8, velocity: u8, at: u32| {
            out.note_on(self.channel, note, velocity, at);
            out.note_off(self.channel, note, at + duration);
        };
        let degree = |d: usize| Scale::note(scale, root, d);

        match Figure::from_param(figure) {
            Figure::RootOnly => {
                play(degree(ROOT), ACCENT_VELOCITY, 0);
            }
            Figure::RootFifth => {
                play(degree(ROOT), ACCENT_VELOCITY, 0);
                play(degree(FIFTH), BASE_VELOCITY, STEP_MS / 2);
            }
            Figure::RootFifthOctave => {
                play(degree(ROOT), ACCENT_VELOCITY, 0);
                play(degree(FIFTH), BASE_VELOCITY, STEP_MS / 3);
                play(degree(OCTAVE), BASE_VELOCITY, STEP_MS * 2 / 3);
            }
            Figure::Triad => {
                play(degree(ROOT), ACCENT_VELOCITY, 0);
                play(degree(THIRD), BASE_VELOCITY, STEP_MS / 3);
                play(degree(FIFTH), BASE_VELOCITY, STEP_MS * 2 / 3);
            }
            Figure::SeventhWalk => {
                play(degree(ROOT), ACCENT_VELOCITY, 0);
                play(degree(THIRD), BASE_VELOCITY, STEP_MS / 4);
                play(degree(FIFTH), BASE_VELOCITY, STEP_MS / 2);
                play(degree(SEVENTH), BASE_VELOCITY, STEP_MS * 3 / 4);
            }
            Figure::OctaveBounce => {
                play(degree(ROOT), ACCENT_VELOCITY, 0);
                play(degree(OCTAVE), BASE_VELOCITY, STEP_MS / 2);
            }
            Figure::ChromaticApproach => {
                // half-step below, released early
                let approach = root - 1;
                out.note_on(self.channel, approach, APPROACH_VELOCITY, 0);
                out.note_off(self.channel, approach, duration / 2);
                out.note_on(self.channel, degree(ROOT), ACCENT_VELOCITY, STEP_MS / 4);
                out.note_off(self.channel, degree(ROOT), STEP_MS / 4 + duration);
            }
            Figure::FifthPedal => {
                play(degree(FIFTH), BASE_VELOCITY, 0);
                play(degree(ROOT), ACCENT_VELOCITY, STEP_MS / 2);
            }
        }
    }
}
