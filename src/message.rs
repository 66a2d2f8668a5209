// Outbound musical messages, as produced by modes and consumed by the scheduler.

use crate::shared::MAX_DATA;

pub const OUTPUT_BUFFER_CAPACITY: usize = 32;

pub const CC_PAN: u8 = 10;
pub const CC_PORTAMENTO_TIME: u8 = 5;
pub const CC_PORTAMENTO: u8 = 65;
pub const CC_VOLUME: u8 = 7;
pub const CC_ALL_NOTES_OFF: u8 = 123;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MessageKind {
    #[default]
    NoteOn,
    NoteOff,
    ControlChange,
    AllNotesOff,
}

/// One message, `delay` milliseconds after the moment it was produced.
///
/// `data1`/`data2` are note/velocity for notes, controller/value for control
/// changes and unused for all-notes-off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct OutputMessage {
    pub kind: MessageKind,
    pub channel: u8,
    pub data1: u8,
    pub data2: u8,
    pub delay: u32,
}

impl OutputMessage {
    pub fn new(kind: MessageKind, channel: u8, data1: u8, data2: u8, delay: u32) -> Self {
        Self {
            kind,
            channel,
            data1: data1 & MAX_DATA,
            data2: data2 & MAX_DATA,
            delay,
        }
    }

    pub fn note_on(channel: u8, note: u8, velocity: u8, delay: u32) -> Self {
        Self::new(MessageKind::NoteOn, channel, note, velocity, delay)
    }

    pub fn note_off(channel: u8, note: u8, delay: u32) -> Self {
        Self::new(MessageKind::NoteOff, channel, note, 0, delay)
    }

    pub fn control_change(channel: u8, control: u8, value: u8, delay: u32) -> Self {
        Self::new(MessageKind::ControlChange, channel, control, value, delay)
    }

    pub fn all_notes_off(channel: u8, delay: u32) -> Self {
        Self::new(MessageKind::AllNotesOff, channel, 0, 0, delay)
    }
}

/// Fixed-capacity message list. Pushing into a full buffer fails instead of
/// growing; the caller drains it and carries on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputBuffer {
    messages: [OutputMessage; OUTPUT_BUFFER_CAPACITY],
    len: usize,
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputBuffer {
    pub const fn new() -> Self {
        Self {
            messages: [OutputMessage {
                kind: MessageKind::NoteOn,
                channel: 0,
                data1: 0,
                data2: 0,
                delay: 0,
            }; OUTPUT_BUFFER_CAPACITY],
            len: 0,
        }
    }

    pub fn push(&mut self, message: OutputMessage) -> bool {
        if self.len >= OUTPUT_BUFFER_CAPACITY {
            return false;
        }
        self.messages[self.len] = message;
        self.len += 1;
        true
    }

    pub fn note_on(&mut self, channel: u8, note: u8, velocity: u8, delay: u32) -> bool {
        self.push(OutputMessage::note_on(channel, note, velocity, delay))
    }

    pub fn note_off(&mut self, channel: u8, note: u8, delay: u32) -> bool {
        self.push(OutputMessage::note_off(channel, note, delay))
    }

    pub fn control_change(&mut self, channel: u8, control: u8, value: u8, delay: u32) -> bool {
        self.push(OutputMessage::control_change(channel, control, value, delay))
    }

    pub fn all_notes_off(&mut self, channel: u8, delay: u32) -> bool {
        self.push(OutputMessage::all_notes_off(channel, delay))
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= OUTPUT_BUFFER_CAPACITY
    }

    pub fn remaining(&self) -> usize {
        OUTPUT_BUFFER_CAPACITY - self.len
    }

    pub fn get(&self, index: usize) -> Option<&OutputMessage> {
        self.as_slice().get(index)
    }

    pub fn as_slice(&self) -> &[OutputMessage] {
        &self.messages[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OutputMessage> {
        self.as_slice().iter()
    }

    pub const fn capacity() -> usize {
        OUTPUT_BUFFER_CAPACITY
    }
}

impl<'a> IntoIterator for &'a OutputBuffer {
    type Item = &'a OutputMessage;
    type IntoIter = std::slice::Iter<'a, OutputMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
