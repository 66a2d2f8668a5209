use super::frame::StereoFrame;
use super::voice::{Voice, Waveform, glide_ms};
use crate::audio_api::AudioCommand;
use crate::message::{CC_ALL_NOTES_OFF, CC_PAN, CC_PORTAMENTO, CC_PORTAMENTO_TIME, CC_VOLUME};
use crate::modes::ModeKind;
use crate::pipeline::Config;
use crate::sequencer::Transport;
use crate::shared::{MAX_CHANNEL, is_valid_channel};

pub const MAX_VOICES: usize = 32; // hard cap so we wont malloc in audio callback

const CHANNEL_SLOTS: usize = MAX_CHANNEL as usize + 1;

/// What a mode sounds like on the built-in synth. Pattern sequencer slots are
/// silent anyway.
pub fn voicing(kind: ModeKind) -> Waveform {
    match kind {
        ModeKind::DrumMachine => Waveform::Drum,
        ModeKind::AcidBass | ModeKind::Bassline => Waveform::Saw,
        ModeKind::EuclideanFade => Waveform::Triangle,
        ModeKind::MetaArp => Waveform::Square,
        ModeKind::PatternSequencer => Waveform::Sine,
    }
}

#[derive(Clone, Copy, Debug)]
struct ChannelState {
    waveform: Waveform,
    pan: f32,
    volume: f32,
    portamento: bool,
    glide_ms: f32,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            pan: 0.5,
            volume: 100.0 / 127.0,
            portamento: false,
            glide_ms: glide_ms(0),
        }
    }
}

pub struct Engine {
    sample_rate: f32,
    voices: [Voice; MAX_VOICES], // fixed pool of voices
    channels: [ChannelState; CHANNEL_SLOTS],
    note_count: u64,
}

impl Engine {
    pub fn new(sample_rate: u32) -> Self {
        let sample_rate = sample_rate as f32;
        Self {
            sample_rate,
            voices: [Voice::idle(sample_rate); MAX_VOICES],
            channels: [ChannelState::default(); CHANNEL_SLOTS],
            note_count: 0,
        }
    }

    /// One voicing per configured mode channel.
    pub fn for_config(sample_rate: u32, config: &Config) -> Self {
        let mut engine = Self::new(sample_rate);
        for slot in &config.modes {
            engine.set_waveform(slot.channel, voicing(slot.kind));
        }
        engine
    }

    pub fn set_waveform(&mut self, channel: u8, waveform: Waveform) {
        if let Some(state) = self.channel_mut(channel) {
            state.waveform = waveform;
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    fn channel_mut(&mut self, channel: u8) -> Option<&mut ChannelState> {
        if is_valid_channel(channel) {
            self.channels.get_mut(usize::from(channel))
        } else {
            None
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        if !is_valid_channel(cmd.channel()) {
            return;
        }
        match cmd {
            AudioCommand::NoteOn { channel, note, velocity: 0 } => self.release_note(channel, note),
            AudioCommand::NoteOn { channel, note, velocity } => self.start_note(channel, note, velocity),
            AudioCommand::NoteOff { channel, note } => self.release_note(channel, note),
            AudioCommand::Control { channel, control, value } => self.control(channel, control, value),
            AudioCommand::AllNotesOff { channel } => self.release_channel(channel),
        }
    }

    fn start_note(&mut self, channel: u8, note: u8, velocity: u8) {
        let state = self.channels[usize::from(channel)];

        // legato: bend the sounding note over instead of striking a new one
        if state.portamento && state.waveform != Waveform::Drum {
            if let Some(v) = self.voices.iter_mut().find(|v| v.channel == channel && v.is_held()) {
                v.glide_to(note, velocity, state.glide_ms);
                return;
            }
        }

        self.note_count += 1;
        let slot = self
            .voices
            .iter()
            .position(|v| !v.is_active())
            .unwrap_or_else(|| self.oldest_voice());
        self.voices[slot].start(channel, note, velocity, state.waveform, self.note_count);
    }

    // what slot do we steal?
    fn oldest_voice(&self) -> usize {
        self.voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| v.age())
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn release_note(&mut self, channel: u8, note: u8) {
        for v in self.voices.iter_mut().filter(|v| v.channel == channel && v.note == note) {
            v.release();
        }
    }

    fn release_channel(&mut self, channel: u8) {
        for v in self.voices.iter_mut().filter(|v| v.channel == channel) {
            v.release();
        }
    }

    fn control(&mut self, channel: u8, control: u8, value: u8) {
        if control == CC_ALL_NOTES_OFF {
            self.release_channel(channel);
            return;
        }
        let Some(state) = self.channel_mut(channel) else {
            return;
        };
        match control {
            CC_VOLUME => state.volume = f32::from(value) / 127.0,
            CC_PAN => state.pan = f32::from(value) / 127.0,
            CC_PORTAMENTO => state.portamento = value >= 64,
            CC_PORTAMENTO_TIME => state.glide_ms = glide_ms(value),
            _ => {}
        }
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::zero());
        for v in self.voices.iter_mut().filter(|v| v.is_active()) {
            let state = self.channels[usize::from(v.channel)];
            v.render_into(out, state.pan, state.volume);
        }
        for frame in out.iter_mut() {
            *frame = frame.clamp();
        }
    }
}

// offline rendering drives the engine straight from the scheduler
impl Transport for Engine {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        self.handle_cmd(AudioCommand::NoteOn { channel, note, velocity });
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        self.handle_cmd(AudioCommand::NoteOff { channel, note });
    }

    fn control_change(&mut self, channel: u8, control: u8, value: u8) {
        self.handle_cmd(AudioCommand::Control { channel, control, value });
    }

    fn all_notes_off(&mut self, channel: u8) {
        self.handle_cmd(AudioCommand::AllNotesOff { channel });
    }
}
