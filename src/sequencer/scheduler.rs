// Delay line between "a mode produced this" and "this goes out the door".
// Fixed slot table, linear scan, no allocation after construction.

use crate::message::{CC_ALL_NOTES_OFF, MessageKind, OutputBuffer, OutputMessage};
use crate::shared::is_valid_channel;

pub const SCHEDULER_CAPACITY: usize = 64;

/// Where fired messages end up: a MIDI port, the built-in synth, a test
/// recorder.
pub trait Transport {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
    fn control_change(&mut self, channel: u8, control: u8, value: u8);

    fn all_notes_off(&mut self, channel: u8) {
        self.control_change(channel, CC_ALL_NOTES_OFF, 0);
    }

    // realtime messages
    fn clock(&mut self) {}
    fn start(&mut self) {}
    fn stop(&mut self) {}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScheduledMessage {
    pub message: OutputMessage,
    pub fire_time: u64,
    pub active: bool,
}

#[derive(Clone, Debug)]
pub struct Scheduler {
    slots: [ScheduledMessage; SCHEDULER_CAPACITY],
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            slots: [ScheduledMessage::default(); SCHEDULER_CAPACITY],
        }
    }

    /// Schedule `message` for `now + message.delay`. False if the channel is
    /// outside 1-16 or every slot is taken; either way the message is gone.
    pub fn enqueue(&mut self, message: OutputMessage, now: u64) -> bool {
        if !is_valid_channel(message.channel) {
            tracing::trace!(channel = message.channel, "dropped message on invalid channel");
            return false;
        }
        let Some(slot) = self.slots.iter_mut().find(|s| !s.active) else {
            tracing::debug!(kind = ?message.kind, channel = message.channel, "scheduler full, message dropped");
            return false;
        };
        *slot = ScheduledMessage {
            message,
            fire_time: now.saturating_add(u64::from(message.delay)),
            active: true,
        };
        true
    }

    /// Schedule a whole buffer in order. Invalid channels are skipped; once the
    /// table fills, the rest of the buffer is left unscheduled. Returns how many
    /// made it in.
    pub fn enqueue_all(&mut self, buffer: &OutputBuffer, now: u64) -> usize {
        let mut scheduled = 0;
        for (i, message) in buffer.iter().enumerate() {
            if !is_valid_channel(message.channel) {
                continue;
            }
            if !self.enqueue(*message, now) {
                tracing::debug!(dropped = buffer.len() - i, "scheduler full, rest of buffer dropped");
                break;
            }
            scheduled += 1;
        }
        scheduled
    }

    /// Fire everything due at `now`, in slot order. Returns how many fired.
    pub fn tick<T: Transport + ?Sized>(&mut self, now: u64, transport: &mut T) -> usize {
        let mut fired = 0;
        for slot in self.slots.iter_mut().filter(|s| s.active && s.fire_time <= now) {
            let m = slot.message;
            match m.kind {
                MessageKind::NoteOn => transport.note_on(m.channel, m.data1, m.data2),
                MessageKind::NoteOff => transport.note_off(m.channel, m.data1),
                MessageKind::ControlChange => transport.control_change(m.channel, m.data1, m.data2),
                MessageKind::AllNotesOff => transport.all_notes_off(m.channel),
            }
            slot.active = false;
            fired += 1;
        }
        fired
    }

    /// Drop everything pending.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| s.active = false);
    }

    pub fn pending(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    pub const fn capacity() -> usize {
        SCHEDULER_CAPACITY
    }
}

/// Records everything it is sent; for tests and offline rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingTransport {
    pub messages: Vec<OutputMessage>,
    pub clocks: usize,
    pub starts: usize,
    pub stops: usize,
}

impl Transport for RecordingTransport {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        self.messages.push(OutputMessage::note_on(channel, note, velocity, 0));
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        self.messages.push(OutputMessage::note_off(channel, note, 0));
    }

    fn control_change(&mut self, channel: u8, control: u8, value: u8) {
        self.messages.push(OutputMessage::control_change(channel, control, value, 0));
    }

    fn all_notes_off(&mut self, channel: u8) {
        self.messages.push(OutputMessage::all_notes_off(channel, 0));
    }

    fn clock(&mut self) {
        self.clocks += 1;
    }

    fn start(&mut self) {
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.stops += 1;
    }
}
