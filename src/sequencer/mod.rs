// The step sequencer: owns the song, the modes and the scheduler, and is
// driven by one polling loop calling `tick` with a millisecond timestamp.

pub mod clock;
pub mod scheduler;

pub use clock::{Clock, Tempo};
pub use scheduler::{RecordingTransport, SCHEDULER_CAPACITY, ScheduledMessage, Scheduler, Transport};

use crate::message::{OutputBuffer, OutputMessage};
use crate::modes::ModeRegistry;
use crate::modes::pattern_sequencer::target_pattern;
use crate::pipeline::{Config, ConfigError, Song};
use crate::shared::{
    CC_EDIT_MODE, CC_EDIT_PATTERN, CC_EDIT_TRACK, CC_SLIDER_BASE, ControlSnapshot,
    DOWNBEAT_BRIGHTNESS, FEEDBACK_CHANNEL, MAX_BPM, MIN_BPM, NUM_BUTTONS, NUM_MODES, NUM_PATTERNS,
    NUM_SLIDERS, NUM_TRACKS, OFFBEAT_BRIGHTNESS, SLIDER_FEEDBACK_CHANNEL, SLIDER_FEEDBACK_INTERVAL_MS,
    STEPS_PER_TRACK,
};

// where the chaining sequence lives
const SEQUENCE_MODE: usize = 0;
const SEQUENCE_PATTERN: usize = 0;
const SEQUENCE_TRACK: usize = 0;

const DEFAULT_EDIT_MODE: usize = 1;

// pot 0: lower half linear up to 120, upper half quadratic up to 800
const TEMPO_CENTER_BPM: f32 = 120.0;

pub fn pot_to_bpm(value: u8) -> f32 {
    let n = f32::from(value.min(127)) / 127.0;
    if n < 0.5 {
        MIN_BPM + n * 2.0 * (TEMPO_CENTER_BPM - MIN_BPM)
    } else {
        TEMPO_CENTER_BPM + ((n - 0.5) * 2.0).powi(2) * (MAX_BPM - TEMPO_CENTER_BPM)
    }
}

/// Scale a 0-127 control onto `0..count`. Dividing by 128 keeps 127 inside.
fn pot_to_index(value: u8, count: usize) -> usize {
    (usize::from(value) * count / 128).min(count - 1)
}

pub struct Sequencer {
    song: Box<Song>,
    modes: ModeRegistry,
    scheduler: Scheduler,

    current_step: usize,
    current_patterns: [usize; NUM_MODES],
    sequence_position: usize,
    edit_mode: usize,
    edit_track: usize,

    tempo: Tempo,
    step_clock: Clock,
    pulse_clock: Clock,
    playing: bool,

    midi_clock: bool,
    debug_feedback: bool,
    last_slider_feedback: u64,
}

impl Sequencer {
    pub fn new(song: Box<Song>, modes: ModeRegistry) -> Self {
        let tempo = Tempo::default();
        Self {
            song,
            modes,
            scheduler: Scheduler::new(),
            current_step: 0,
            current_patterns: [0; NUM_MODES],
            sequence_position: 0,
            edit_mode: DEFAULT_EDIT_MODE,
            edit_track: 0,
            tempo,
            step_clock: Clock::new(tempo.step_interval_ms()),
            pulse_clock: Clock::new(tempo.clock_interval_ms()),
            playing: false,
            midi_clock: false,
            debug_feedback: false,
            last_slider_feedback: 0,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let modes = config.build_registry()?;
        let mut seq = Self::new(config.preset.build(), modes);
        seq.set_bpm(config.bpm);
        seq.midi_clock = config.midi_clock;
        seq.debug_feedback = config.debug_feedback;
        Ok(seq)
    }

    // ---- transport ----

    pub fn start<T: Transport + ?Sized>(&mut self, now: u64, transport: &mut T) {
        self.playing = true;
        self.current_step = 0;
        self.modes.iter_mut().for_each(|(_, mode)| mode.reset());
        self.step_clock.restart(now);
        self.pulse_clock.restart(now);
        transport.start();
        tracing::info!(bpm = self.tempo.bpm(), "sequencer started");
        self.process_step(now);
    }

    /// Stops stepping and queues a panic for every mode's channel. Messages
    /// already scheduled still fire.
    pub fn stop<T: Transport + ?Sized>(&mut self, now: u64, transport: &mut T) {
        self.playing = false;
        transport.stop();
        let mut panic = OutputBuffer::new();
        for (_, mode) in self.modes.iter() {
            panic.all_notes_off(mode.channel(), 0);
        }
        self.scheduler.enqueue_all(&panic, now);
        tracing::info!(step = self.current_step, "sequencer stopped");
    }

    /// Drive everything forward to `now`: clock pulses, any steps that came
    /// due, then whatever the scheduler has ready. Returns the number of steps
    /// advanced.
    pub fn tick<T: Transport + ?Sized>(&mut self, now: u64, transport: &mut T) -> usize {
        let mut steps = 0;
        if self.playing {
            if self.midi_clock {
                for _ in 0..self.pulse_clock.poll(now) {
                    transport.clock();
                }
            }
            for _ in 0..self.step_clock.poll(now) {
                self.advance_step();
                self.process_step(now);
                steps += 1;
            }
        }
        self.scheduler.tick(now, transport);
        steps
    }

    pub fn set_bpm(&mut self, bpm: f32) {
        self.tempo = Tempo::new(bpm);
        self.step_clock.set_interval(self.tempo.step_interval_ms());
        self.pulse_clock.set_interval(self.tempo.clock_interval_ms());
        tracing::debug!(bpm = self.tempo.bpm(), step_ms = self.tempo.step_interval_ms(), "tempo changed");
    }

    // ---- stepping ----

    pub fn advance_step(&mut self) {
        self.current_step = (self.current_step + 1) % STEPS_PER_TRACK;
        if self.current_step == 0 {
            self.chain_patterns();
        }
    }

    /// Run every mode over its current pattern at the current step and hand
    /// the result to the scheduler. The scratch buffer is flushed before any
    /// transform that might not fit, so nothing is lost locally. Returns the
    /// number of messages scheduled.
    pub fn process_step(&mut self, now: u64) -> usize {
        let mut buffer = OutputBuffer::new();
        let mut scheduled = 0;
        let step = self.current_step;

        // slot 0 is the chaining playlist, read by chain_patterns, never played
        for (slot, mode) in self.modes.iter_mut().filter(|(slot, _)| *slot != SEQUENCE_MODE) {
            let pattern = self.song.pattern(slot, self.current_patterns[slot]);
            for track in 0..NUM_TRACKS {
                if buffer.remaining() < mode.max_output() {
                    scheduled += self.scheduler.enqueue_all(&buffer, now);
                    buffer.clear();
                }
                mode.transform(track, pattern.track(track).event(step), now, &mut buffer);
            }
        }
        if !buffer.is_empty() {
            scheduled += self.scheduler.enqueue_all(&buffer, now);
        }
        scheduled
    }

    // Mode 0 / pattern 0 / track 0 is a 16-slot playlist. Each loop wrap reads
    // one slot: on => switch every other mode to that pattern and move along,
    // off => back to the top.
    fn chain_patterns(&mut self) {
        let sequence = *self
            .song
            .pattern(SEQUENCE_MODE, SEQUENCE_PATTERN)
            .track(SEQUENCE_TRACK);
        let event = sequence.event(self.sequence_position);

        if event.switch() {
            self.apply_chained_pattern(usize::from(target_pattern(event)));
            self.sequence_position = (self.sequence_position + 1) % STEPS_PER_TRACK;
        } else {
            self.sequence_position = 0;
            let first = sequence.event(0);
            if first.switch() {
                self.apply_chained_pattern(usize::from(target_pattern(first)));
            }
        }
    }

    fn apply_chained_pattern(&mut self, pattern: usize) {
        for current in &mut self.current_patterns[SEQUENCE_MODE + 1..] {
            *current = pattern;
        }
        tracing::debug!(pattern, position = self.sequence_position, "pattern chained");
    }

    // ---- editing ----

    /// Apply one hardware snapshot: step presses record, pots navigate.
    pub fn handle_input(&mut self, input: &ControlSnapshot, now: u64) {
        for button in 0..NUM_BUTTONS {
            if input.just_pressed(button) {
                self.record_step(button, input.sliders);
            }
        }

        if let Some(v) = input.pot_moved(0) {
            self.set_bpm(pot_to_bpm(v));
        }
        if let Some(v) = input.pot_moved(1) {
            self.set_edit_mode(pot_to_index(v, NUM_MODES));
            self.feedback(CC_EDIT_MODE, self.edit_mode, now);
        }
        if let Some(v) = input.pot_moved(2) {
            self.select_pattern(pot_to_index(v, NUM_PATTERNS));
            self.feedback(CC_EDIT_PATTERN, self.edit_pattern(), now);
        }
        if let Some(v) = input.pot_moved(3) {
            self.set_edit_track(pot_to_index(v, NUM_TRACKS));
            self.feedback(CC_EDIT_TRACK, self.edit_track, now);
        }

        if self.debug_feedback && now.saturating_sub(self.last_slider_feedback) > SLIDER_FEEDBACK_INTERVAL_MS {
            self.last_slider_feedback = now;
            let mut echo = OutputBuffer::new();
            for (i, &value) in input.sliders.iter().enumerate().take(NUM_SLIDERS) {
                echo.control_change(SLIDER_FEEDBACK_CHANNEL, CC_SLIDER_BASE + i as u8, value, 0);
            }
            self.scheduler.enqueue_all(&echo, now);
        }
    }

    fn feedback(&mut self, control: u8, value: usize, now: u64) {
        if self.debug_feedback {
            let msg = OutputMessage::control_change(FEEDBACK_CHANNEL, control, value as u8, 0);
            self.scheduler.enqueue(msg, now);
        }
    }

    /// Toggle the edited track's event at `step` and store the slider values
    /// in its params. What the params mean is up to the mode at playback.
    pub fn record_step(&mut self, step: usize, sliders: [u8; NUM_SLIDERS]) {
        let pattern = self.edit_pattern();
        let event = self.song.event_mut(self.edit_mode, pattern, self.edit_track, step);
        event.toggle_switch();
        for (i, value) in sliders.into_iter().enumerate() {
            event.set_param(i, value);
        }
        tracing::debug!(
            mode = self.edit_mode,
            pattern,
            track = self.edit_track,
            step,
            on = event.switch(),
            "recorded step"
        );
    }

    pub fn set_edit_mode(&mut self, mode: usize) {
        self.edit_mode = mode.min(NUM_MODES - 1);
    }

    pub fn set_edit_track(&mut self, track: usize) {
        self.edit_track = track.min(NUM_TRACKS - 1);
    }

    /// Point the edited mode at `pattern`.
    pub fn select_pattern(&mut self, pattern: usize) {
        self.current_patterns[self.edit_mode] = pattern.min(NUM_PATTERNS - 1);
    }

    pub fn clear_edit_track(&mut self) {
        let pattern = self.edit_pattern();
        self.song
            .pattern_mut(self.edit_mode, pattern)
            .track_mut(self.edit_track)
            .clear();
        tracing::debug!(mode = self.edit_mode, pattern, track = self.edit_track, "cleared track");
    }

    /// Swap in new song content. Playback position and pattern choices carry
    /// on; the chaining sequence starts again from the top.
    pub fn load_song(&mut self, song: Box<Song>) {
        self.song = song;
        self.sequence_position = 0;
        tracing::info!("song loaded");
    }

    // ---- state ----

    /// LED level for the current step: bright on the downbeat, dim otherwise.
    pub fn beat_brightness(&self) -> u8 {
        if self.current_step == 0 {
            DOWNBEAT_BRIGHTNESS
        } else {
            OFFBEAT_BRIGHTNESS
        }
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn current_pattern(&self, mode: usize) -> usize {
        self.current_patterns[mode % NUM_MODES]
    }

    pub fn sequence_position(&self) -> usize {
        self.sequence_position
    }

    pub fn edit_mode(&self) -> usize {
        self.edit_mode
    }

    pub fn edit_track(&self) -> usize {
        self.edit_track
    }

    pub fn edit_pattern(&self) -> usize {
        self.current_patterns[self.edit_mode]
    }

    pub fn bpm(&self) -> f32 {
        self.tempo.bpm()
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn song_mut(&mut self) -> &mut Song {
        &mut self.song
    }

    pub fn modes(&self) -> &ModeRegistry {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut ModeRegistry {
        &mut self.modes
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    pub fn set_midi_clock(&mut self, enabled: bool) {
        self.midi_clock = enabled;
    }

    pub fn set_debug_feedback(&mut self, enabled: bool) {
        self.debug_feedback = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageKind;
    use crate::modes::{Mode, ModeKind};
    use crate::pipeline::Event;

    fn drums_only() -> Sequencer {
        let mut modes = ModeRegistry::new();
        modes.register(0, Mode::new(ModeKind::PatternSequencer, 1));
        modes.register(1, Mode::new(ModeKind::DrumMachine, 2));
        Sequencer::new(Song::boxed(), modes)
    }

    #[test]
    fn pot_curves() {
        assert_eq!(pot_to_bpm(0), 20.0);
        assert_eq!(pot_to_bpm(127), 800.0);
        let mid = pot_to_bpm(63);
        assert!(mid > 118.0 && mid < 120.0, "{mid}");
        assert!(pot_to_bpm(64) >= 120.0);

        assert_eq!(pot_to_index(127, NUM_MODES), 14);
        assert_eq!(pot_to_index(127, NUM_PATTERNS), 31);
        assert_eq!(pot_to_index(127, NUM_TRACKS), 7);
        assert_eq!(pot_to_index(16, NUM_TRACKS), 1);
    }

    #[test]
    fn steps_follow_the_clock() {
        let mut seq = drums_only();
        let mut out = RecordingTransport::default();
        seq.start(0, &mut out);
        assert_eq!(seq.tick(124, &mut out), 0);
        assert_eq!(seq.tick(125, &mut out), 1);
        assert_eq!(seq.current_step(), 1);
        // a late poll catches up on every step it missed
        assert_eq!(seq.tick(125 * 5, &mut out), 4);
        assert_eq!(seq.current_step(), 5);
    }

    #[test]
    fn stopped_sequencer_does_not_step() {
        let mut seq = drums_only();
        let mut out = RecordingTransport::default();
        assert_eq!(seq.tick(10_000, &mut out), 0);
        assert_eq!(seq.current_step(), 0);
    }

    #[test]
    fn start_plays_step_zero_right_away() {
        let mut seq = drums_only();
        seq.song_mut().event_mut(1, 0, 0, 0).set_raw(Event::new(true, 100, 0, 0, 0).raw());
        let mut out = RecordingTransport::default();
        seq.start(0, &mut out);
        seq.tick(0, &mut out);
        assert_eq!(out.starts, 1);
        assert_eq!(out.messages, vec![OutputMessage::note_on(2, 36, 100, 0)]);
    }

    #[test]
    fn stop_panics_every_mode_channel() {
        let mut seq = drums_only();
        let mut out = RecordingTransport::default();
        seq.start(0, &mut out);
        seq.stop(10, &mut out);
        seq.tick(10, &mut out);
        assert_eq!(out.stops, 1);
        let panics: Vec<u8> = out
            .messages
            .iter()
            .filter(|m| m.kind == MessageKind::AllNotesOff)
            .map(|m| m.channel)
            .collect();
        assert_eq!(panics, vec![1, 2]);
        assert!(!seq.is_playing());
    }

    #[test]
    fn midi_clock_pulses_when_enabled() {
        let mut seq = drums_only();
        seq.set_midi_clock(true);
        let mut out = RecordingTransport::default();
        seq.start(0, &mut out);
        seq.tick(500, &mut out);
        // 20 ms per pulse at 120 BPM
        assert_eq!(out.clocks, 25);
    }

    #[test]
    fn recording_toggles_and_snapshots_sliders() {
        let mut seq = drums_only();
        seq.set_edit_track(2);
        seq.record_step(5, [10, 20, 30, 40]);
        let event = seq.song().event(1, 0, 2, 5);
        assert!(event.switch());
        assert_eq!(event.params(), [10, 20, 30, 40]);

        seq.record_step(5, [1, 2, 3, 4]);
        let event = seq.song().event(1, 0, 2, 5);
        assert!(!event.switch());
        assert_eq!(event.params(), [1, 2, 3, 4]);
    }

    #[test]
    fn snapshot_navigation_and_recording() {
        let mut seq = drums_only();
        let mut snap = ControlSnapshot::default();
        snap.set_pot(1, 127);
        snap.set_pot(2, 40);
        snap.set_pot(3, 127);
        seq.handle_input(&snap, 0);
        assert_eq!(seq.edit_mode(), 14);
        assert_eq!(seq.edit_pattern(), 10);
        assert_eq!(seq.current_pattern(14), 10);
        assert_eq!(seq.current_pattern(1), 0);
        assert_eq!(seq.edit_track(), 7);

        snap.clear_edges();
        snap.set_slider(0, 99);
        snap.press(3);
        seq.handle_input(&snap, 0);
        assert!(seq.song().event(14, 10, 7, 3).switch());
        assert_eq!(seq.song().event(14, 10, 7, 3).param(0), 99);
    }

    #[test]
    fn tempo_pot_sets_bpm() {
        let mut seq = drums_only();
        let mut snap = ControlSnapshot::default();
        snap.set_pot(0, 127);
        seq.handle_input(&snap, 0);
        assert_eq!(seq.bpm(), 800.0);
        assert_eq!(seq.tempo().step_interval_ms(), 18);
    }

    #[test]
    fn debug_feedback_echoes_navigation() {
        let mut seq = drums_only();
        seq.set_debug_feedback(true);
        let mut snap = ControlSnapshot::default();
        snap.set_pot(3, 64);
        seq.handle_input(&snap, 100);
        let mut out = RecordingTransport::default();
        seq.tick(100, &mut out);
        assert!(out.messages.contains(&OutputMessage::control_change(16, CC_EDIT_TRACK, 4, 0)));
        let sliders = out.messages.iter().filter(|m| m.channel == 2).count();
        assert_eq!(sliders, 4);

        // slider echo is rate limited
        snap.clear_edges();
        seq.handle_input(&snap, 120);
        assert!(seq.scheduler().is_idle());
    }

    #[test]
    fn feedback_is_off_by_default() {
        let mut seq = drums_only();
        let mut snap = ControlSnapshot::default();
        snap.set_pot(1, 30);
        seq.handle_input(&snap, 100);
        assert!(seq.scheduler().is_idle());
    }

    #[test]
    fn brightness_follows_the_beat() {
        let mut seq = drums_only();
        assert_eq!(seq.beat_brightness(), 255);
        seq.advance_step();
        assert_eq!(seq.beat_brightness(), 5);
        for _ in 0..3 {
            seq.advance_step();
        }
        // quarter beats get no accent
        assert_eq!(seq.beat_brightness(), 5);
        for _ in 0..12 {
            seq.advance_step();
        }
        assert_eq!(seq.beat_brightness(), 255);
    }

    #[test]
    fn busy_step_loses_nothing_to_the_scratch_buffer() {
        let mut modes = ModeRegistry::new();
        modes.register(4, Mode::new(ModeKind::MetaArp, 5));
        let mut seq = Sequencer::new(Song::boxed(), modes);
        // two tracks of 16-note arps: 64 messages, more than one buffer
        for track in 0..2 {
            seq.song_mut()
                .pattern_mut(4, 0)
                .track_mut(track)
                .set_event(0, Event::new(true, 60, 0, 0, 127));
        }
        assert_eq!(seq.process_step(0), 64);
        assert_eq!(seq.scheduler().pending(), 64);
    }

    #[test]
    fn slot_zero_never_sounds_even_with_a_sounding_mode() {
        let mut modes = ModeRegistry::new();
        modes.register(0, Mode::new(ModeKind::DrumMachine, 2));
        let mut seq = Sequencer::new(Song::boxed(), modes);
        seq.song_mut()
            .pattern_mut(0, 0)
            .track_mut(0)
            .set_event(0, Event::new(true, 64, 0, 0, 0));
        assert_eq!(seq.process_step(0), 0);
        assert!(seq.scheduler().is_idle());
    }

    #[test]
    fn clearing_the_edit_track() {
        let mut seq = drums_only();
        seq.record_step(0, [1, 1, 1, 1]);
        seq.record_step(8, [1, 1, 1, 1]);
        seq.clear_edit_track();
        assert!(!seq.song().pattern(1, 0).has_active_events());
    }

    #[test]
    fn from_config_uses_layout_and_preset() {
        let config = Config { bpm: 5000.0, ..Config::default() };
        let seq = Sequencer::from_config(&config).unwrap();
        assert_eq!(seq.modes().len(), 6);
        assert_eq!(seq.bpm(), 800.0);
        assert!(seq.song().event(1, 0, 0, 0).switch());
    }
}
