// sits between the front end and the sequencer. the tui hands it semantic
// input events; it folds them into the hardware-style control snapshot the
// sequencer reads, and builds the display state back out.

use crate::sequencer::{Sequencer, Transport, pot_to_bpm};
use crate::shared::{
    Control, ControlPage, ControlSnapshot, DisplayState, InputEvent, LedState, MAX_DATA, NUM_MODES,
    NUM_PATTERNS, NUM_TRACKS, STEPS_PER_TRACK,
};

// one detent of a knob
const KNOB_STEP: i16 = 4;

// smallest pot value that lands on `index` when scaled back over `count`
fn index_to_pot(index: usize, count: usize) -> u8 {
    ((index * 128).div_ceil(count)).min(usize::from(MAX_DATA)) as u8
}

fn bpm_to_pot(bpm: f32) -> u8 {
    (0..=MAX_DATA)
        .min_by(|&a, &b| (pot_to_bpm(a) - bpm).abs().total_cmp(&(pot_to_bpm(b) - bpm).abs()))
        .unwrap_or(0)
}

pub struct Middle {
    sequencer: Sequencer,
    controls: ControlSnapshot,
    page: ControlPage,
    play_requested: bool,
    clear_requested: bool,
    quit: bool,
}

impl Middle {
    pub fn new(sequencer: Sequencer) -> Self {
        let mut controls = ControlSnapshot::default();
        // park the pots where the sequencer already is, so the first turn
        // doesn't jump
        controls.pots[0] = bpm_to_pot(sequencer.bpm());
        controls.pots[1] = index_to_pot(sequencer.edit_mode(), NUM_MODES);
        controls.pots[2] = index_to_pot(sequencer.edit_pattern(), NUM_PATTERNS);
        controls.pots[3] = index_to_pot(sequencer.edit_track(), NUM_TRACKS);
        Self {
            sequencer,
            controls,
            page: ControlPage::TempoMode,
            play_requested: false,
            clear_requested: false,
            quit: false,
        }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn sequencer_mut(&mut self) -> &mut Sequencer {
        &mut self.sequencer
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::GridDown(n) => self.controls.press(usize::from(n)),
            InputEvent::GridUp(n) => self.controls.release(usize::from(n)),
            InputEvent::PlayPress => self.play_requested = !self.play_requested,
            InputEvent::NextPage => self.page = self.page.next(),
            InputEvent::KnobTurnA(d) => self.turn(self.page.controls().0, d),
            InputEvent::KnobTurnB(d) => self.turn(self.page.controls().1, d),
            InputEvent::ClearTrack => self.clear_requested = true,
            InputEvent::Quit => self.quit = true,
        }
    }

    fn control_value(&self, control: Control) -> u8 {
        match control {
            Control::Pot(i) => self.controls.pots[i],
            Control::Slider(i) => self.controls.sliders[i],
        }
    }

    fn turn(&mut self, control: Control, detents: i8) {
        let value = i16::from(self.control_value(control)) + i16::from(detents) * KNOB_STEP;
        let value = value.clamp(0, i16::from(MAX_DATA)) as u8;
        match control {
            Control::Pot(i) => self.controls.set_pot(i, value),
            Control::Slider(i) => self.controls.set_slider(i, value),
        }
    }

    /// Apply whatever input arrived since the last call, then run the
    /// sequencer. Returns how many steps played.
    pub fn tick<T: Transport + ?Sized>(&mut self, now: u64, transport: &mut T) -> usize {
        if std::mem::take(&mut self.play_requested) {
            if self.sequencer.is_playing() {
                self.sequencer.stop(now, transport);
            } else {
                self.sequencer.start(now, transport);
            }
        }
        if std::mem::take(&mut self.clear_requested) {
            self.sequencer.clear_edit_track();
        }

        self.sequencer.handle_input(&self.controls, now);
        self.controls.clear_edges();

        self.sequencer.tick(now, transport)
    }

    pub fn display_state(&self) -> DisplayState {
        let seq = &self.sequencer;
        let pattern = seq.song().pattern(seq.edit_mode(), seq.edit_pattern());
        let track = pattern.track(seq.edit_track());
        let playing_step = seq.is_playing().then_some(seq.current_step());

        let mut leds = [LedState::Off; STEPS_PER_TRACK];
        for (step, led) in leds.iter_mut().enumerate() {
            let on = track.event(step).switch();
            *led = match (on, playing_step == Some(step)) {
                (true, true) => LedState::Blink,
                (false, true) => LedState::OnHigh,
                (true, false) => LedState::OnMedium,
                (false, false) => LedState::Off,
            };
        }

        let (knob_a, knob_b) = self.page.controls();
        let (knob_a_label, knob_b_label) = self.page.knob_labels();
        DisplayState {
            leds,
            playing_step: playing_step.map(|s| s as u8),
            playing: seq.is_playing(),
            page: self.page,
            edit_mode: seq.edit_mode() as u8,
            edit_pattern: seq.edit_pattern() as u8,
            edit_track: seq.edit_track() as u8,
            sequence_position: seq.sequence_position() as u8,
            bpm: seq.bpm(),
            beat_brightness: seq.beat_brightness(),
            display_text: seq.modes().name(seq.edit_mode()),
            knob_a_label,
            knob_b_label,
            knob_a_value: self.control_value(knob_a),
            knob_b_value: self.control_value(knob_b),
            pending_messages: seq.scheduler().pending(),
        }
    }
}
