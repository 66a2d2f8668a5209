// Monophonic 303-style bass, one voice per track.
//
// param 0: pitch, C1..C4 (36-72)
// param 1: accent, adds 0-47 to a base velocity of 80
// param 2: gate, 10-2000 ms
// param 3: slide; glides from the track's previous note when non-zero

use super::scale::map_param;
use crate::message::{CC_PORTAMENTO, CC_PORTAMENTO_TIME, OutputBuffer};
use crate::pipeline::Event;
use crate::shared::{MAX_DATA, NUM_TRACKS};

const MIN_NOTE: u32 = 36;
const MAX_NOTE: u32 = 72;
const BASE_VELOCITY: u32 = 80;
const MAX_ACCENT: u32 = 47;
const MIN_GATE: u32 = 10;
const MAX_GATE: u32 = 2000;

pub const MAX_OUTPUT: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcidBass {
    channel: u8,
    last_note: [Option<u8>; NUM_TRACKS],
}

impl AcidBass {
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            last_note: [None; NUM_TRACKS],
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// The note this track would slide from, if any.
    pub fn last_note(&self, track: usize) -> Option<u8> {
        self.last_note.get(track).copied().flatten()
    }

    pub fn reset(&mut self) {
        self.last_note = [None; NUM_TRACKS];
    }

    pub fn transform(&mut self, track: usize, event: Event, out: &mut OutputBuffer) {
        let Some(last) = self.last_note.get_mut(track) else {
            return;
        };
        if !event.switch() {
            // a rest breaks the slide chain
            *last = None;
            return;
        }

        let [pitch, accent, gate, slide] = event.params();
        let note = map_param(pitch, MIN_NOTE, MAX_NOTE).min(MAX_NOTE) as u8;
        let velocity = (BASE_VELOCITY + map_param(accent, 0, MAX_ACCENT)).min(u32::from(MAX_DATA)) as u8;
        let gate = map_param(gate, MIN_GATE, MAX_GATE);
        let ch = self.channel;

        if slide > 0 && last.is_some() {
            out.control_change(ch, CC_PORTAMENTO, MAX_DATA, 0);
            out.control_change(ch, CC_PORTAMENTO_TIME, slide, 0);
        } else {
            out.control_change(ch, CC_PORTAMENTO, 0, 0);
        }

        out.note_on(ch, note, velocity, 0);
        out.note_off(ch, note, gate);
        *last = Some(note);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageKind, OutputMessage};

    fn collect(out: &OutputBuffer) -> Vec<OutputMessage> {
        out.iter().copied().collect()
    }

    #[test]
    fn first_note_never_slides() {
        let mut bass = AcidBass::new(3);
        let mut out = OutputBuffer::new();
        bass.transform(0, Event::new(true, 0, 0, 0, 100), &mut out);
        let msgs = collect(&out);
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[0], OutputMessage::control_change(3, CC_PORTAMENTO, 0, 0));
        assert_eq!(msgs[1], OutputMessage::note_on(3, 36, 80, 0));
        assert_eq!(msgs[2], OutputMessage::note_off(3, 36, 10));
        assert_eq!(bass.last_note(0), Some(36));
    }

    #[test]
    fn second_note_slides() {
        let mut bass = AcidBass::new(3);
        let mut out = OutputBuffer::new();
        bass.transform(1, Event::new(true, 127, 127, 127, 0), &mut out);
        out.clear();
        bass.transform(1, Event::new(true, 64, 0, 0, 90), &mut out);
        let msgs = collect(&out);
        assert_eq!(msgs.len(), 4);
        assert_eq!(msgs[0], OutputMessage::control_change(3, CC_PORTAMENTO, 127, 0));
        assert_eq!(msgs[1], OutputMessage::control_change(3, CC_PORTAMENTO_TIME, 90, 0));
        assert_eq!(msgs[2].data1, (36 + 64 * 36 / 127) as u8);
    }

    #[test]
    fn extremes_clamp() {
        let mut bass = AcidBass::new(1);
        let mut out = OutputBuffer::new();
        bass.transform(0, Event::new(true, 127, 127, 127, 0), &mut out);
        let on = out.iter().find(|m| m.kind == MessageKind::NoteOn).copied();
        assert_eq!(on.map(|m| (m.data1, m.data2)), Some((72, 127)));
        assert_eq!(out.get(2).map(|m| m.delay), Some(2000));
    }

    #[test]
    fn rest_clears_slide_memory() {
        let mut bass = AcidBass::new(3);
        let mut out = OutputBuffer::new();
        bass.transform(2, Event::new(true, 10, 0, 0, 50), &mut out);
        bass.transform(2, Event::new(false, 10, 0, 0, 50), &mut out);
        assert_eq!(bass.last_note(2), None);
        out.clear();
        bass.transform(2, Event::new(true, 10, 0, 0, 50), &mut out);
        assert_eq!(out.get(0).map(|m| m.data2), Some(0));
    }

    #[test]
    fn tracks_keep_separate_memory() {
        let mut bass = AcidBass::new(3);
        let mut out = OutputBuffer::new();
        bass.transform(0, Event::new(true, 10, 0, 0, 0), &mut out);
        assert!(bass.last_note(0).is_some());
        assert_eq!(bass.last_note(1), None);
        bass.reset();
        assert_eq!(bass.last_note(0), None);
    }

    #[test]
    fn identical_state_gives_identical_output() {
        let event = Event::new(true, 40, 60, 80, 100);
        let mut a = AcidBass::new(4);
        let mut b = a.clone();
        let (mut out_a, mut out_b) = (OutputBuffer::new(), OutputBuffer::new());
        a.transform(5, event, &mut out_a);
        b.transform(5, event, &mut out_b);
        assert_eq!(out_a, out_b);
    }
}
