// What the built-in synth understands. The engine runs inside the audio
// callback, so everything it needs arrives as one of these over a channel;
// nothing here allocates.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCommand {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },

    // CC7 volume, CC10 pan, CC65/CC5 portamento, CC123 all notes off
    Control { channel: u8, control: u8, value: u8 },

    // panic, without going through CC123
    AllNotesOff { channel: u8 },
}

impl AudioCommand {
    pub fn channel(&self) -> u8 {
        match *self {
            AudioCommand::NoteOn { channel, .. }
            | AudioCommand::NoteOff { channel, .. }
            | AudioCommand::Control { channel, .. }
            | AudioCommand::AllNotesOff { channel } => channel,
        }
    }
}
