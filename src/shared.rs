// Shared constants and the types that cross the core/collaborator boundary.
//
// Control layout of the box:
//   16 step buttons        //  record at that step of the edited track
//   pot 0..3               //  tempo, edit mode, edit pattern, edit track
//   slider 0..3            //  snapshotted into the four event params on record
//
// The terminal front-end emulates these with keys (see tui/input.rs):
//   1 2 3 4 / q w e r / a s d f / z x c v   //  GridDown(0..15)
//   Space                                   //  PlayPress
//   Tab                                     //  NextPage
//   [ / ]   - / =                           //  KnobTurnA / KnobTurnB
//   0                                       //  ClearTrack
//   Esc                                     //  Quit

pub const NUM_MODES: usize = 15;
pub const NUM_PATTERNS: usize = 32;
pub const NUM_TRACKS: usize = 8;
pub const STEPS_PER_TRACK: usize = 16;

pub const NUM_BUTTONS: usize = 16;
pub const NUM_POTS: usize = 4;
pub const NUM_SLIDERS: usize = 4;

pub const MIN_CHANNEL: u8 = 1;
pub const MAX_CHANNEL: u8 = 16;
pub const MAX_DATA: u8 = 127;

pub const MIN_BPM: f32 = 20.0;
pub const MAX_BPM: f32 = 800.0;
pub const DEFAULT_BPM: f32 = 120.0;
pub const STEPS_PER_BEAT: f32 = 4.0;
pub const PULSES_PER_QUARTER: f32 = 24.0;

// debug feedback
pub const FEEDBACK_CHANNEL: u8 = 16;
pub const CC_EDIT_MODE: u8 = 1;
pub const CC_EDIT_PATTERN: u8 = 2;
pub const CC_EDIT_TRACK: u8 = 3;
pub const CC_SLIDER_BASE: u8 = 20;
pub const SLIDER_FEEDBACK_CHANNEL: u8 = 2;
pub const SLIDER_FEEDBACK_INTERVAL_MS: u64 = 50;

pub const DOWNBEAT_BRIGHTNESS: u8 = 255;
pub const OFFBEAT_BRIGHTNESS: u8 = 5;

pub fn is_valid_channel(channel: u8) -> bool {
    (MIN_CHANNEL..=MAX_CHANNEL).contains(&channel)
}

/// One poll's worth of hardware state, already debounced and smoothed by
/// whoever produced it.
///
/// `pressed` and `moved` are edges since the previous snapshot; the producer
/// clears them with [`ControlSnapshot::clear_edges`] once consumed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlSnapshot {
    pub buttons: [bool; NUM_BUTTONS],
    pub pots: [u8; NUM_POTS],
    pub sliders: [u8; NUM_SLIDERS],
    pressed: u16,
    moved: u8,
}

impl ControlSnapshot {
    pub fn just_pressed(&self, button: usize) -> bool {
        button < NUM_BUTTONS && self.pressed & (1 << button) != 0
    }

    /// The pot's value if it moved since the last snapshot.
    pub fn pot_moved(&self, pot: usize) -> Option<u8> {
        if pot < NUM_POTS && self.moved & (1 << pot) != 0 {
            Some(self.pots[pot])
        } else {
            None
        }
    }

    pub fn press(&mut self, button: usize) {
        if button < NUM_BUTTONS {
            self.buttons[button] = true;
            self.pressed |= 1 << button;
        }
    }

    pub fn release(&mut self, button: usize) {
        if button < NUM_BUTTONS {
            self.buttons[button] = false;
        }
    }

    pub fn set_pot(&mut self, pot: usize, value: u8) {
        if pot < NUM_POTS {
            self.pots[pot] = value & MAX_DATA;
            self.moved |= 1 << pot;
        }
    }

    pub fn set_slider(&mut self, slider: usize, value: u8) {
        if slider < NUM_SLIDERS {
            self.sliders[slider] = value & MAX_DATA;
        }
    }

    pub fn has_edges(&self) -> bool {
        self.pressed != 0 || self.moved != 0
    }

    pub fn clear_edges(&mut self) {
        self.pressed = 0;
        self.moved = 0;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // step buttons
    GridDown(u8), // index 0-15
    GridUp(u8),

    // "play/stop" (space)
    PlayPress,

    // cycles which controls the two knobs drive
    NextPage,

    // knobs, signed detent count
    KnobTurnA(i8),
    KnobTurnB(i8),

    // wipe the edited track
    ClearTrack,

    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlPage {
    TempoMode,
    PatternTrack,
    Sliders12,
    Sliders34,
}

/// Which physical control a knob drives on a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Pot(usize),
    Slider(usize),
}

impl ControlPage {
    pub fn next(self) -> Self {
        match self {
            ControlPage::TempoMode => ControlPage::PatternTrack,
            ControlPage::PatternTrack => ControlPage::Sliders12,
            ControlPage::Sliders12 => ControlPage::Sliders34,
            ControlPage::Sliders34 => ControlPage::TempoMode,
        }
    }

    pub fn knob_labels(self) -> (&'static str, &'static str) {
        match self {
            ControlPage::TempoMode => ("TEMPO", "MODE"),
            ControlPage::PatternTrack => ("PATTERN", "TRACK"),
            ControlPage::Sliders12 => ("SLIDER1", "SLIDER2"),
            ControlPage::Sliders34 => ("SLIDER3", "SLIDER4"),
        }
    }

    pub fn controls(self) -> (Control, Control) {
        match self {
            ControlPage::TempoMode => (Control::Pot(0), Control::Pot(1)),
            ControlPage::PatternTrack => (Control::Pot(2), Control::Pot(3)),
            ControlPage::Sliders12 => (Control::Slider(0), Control::Slider(1)),
            ControlPage::Sliders34 => (Control::Slider(2), Control::Slider(3)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedState {
    Off,
    OnMedium,
    OnHigh,
    Blink,
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub leds: [LedState; STEPS_PER_TRACK],
    pub playing_step: Option<u8>,
    pub playing: bool,
    pub page: ControlPage,
    pub edit_mode: u8,
    pub edit_pattern: u8,
    pub edit_track: u8,
    pub sequence_position: u8,
    pub bpm: f32,
    pub beat_brightness: u8,
    pub display_text: &'static str, // name of the edited mode
    pub knob_a_label: &'static str,
    pub knob_b_label: &'static str,
    pub knob_a_value: u8,
    pub knob_b_value: u8,
    pub pending_messages: usize,
}

impl Default for DisplayState {
    fn default() -> Self {
        let (knob_a_label, knob_b_label) = ControlPage::TempoMode.knob_labels();
        Self {
            leds: [LedState::Off; STEPS_PER_TRACK],
            playing_step: None,
            playing: false,
            page: ControlPage::TempoMode,
            edit_mode: 0,
            edit_pattern: 0,
            edit_track: 0,
            sequence_position: 0,
            bpm: DEFAULT_BPM,
            beat_brightness: OFFBEAT_BRIGHTNESS,
            display_text: "",
            knob_a_label,
            knob_b_label,
            knob_a_value: 0,
            knob_b_value: 0,
            pending_messages: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_edges_clear_but_values_stay() {
        let mut snap = ControlSnapshot::default();
        snap.press(3);
        snap.set_pot(1, 99);
        snap.set_slider(2, 200);
        assert!(snap.just_pressed(3));
        assert!(!snap.just_pressed(4));
        assert_eq!(snap.pot_moved(1), Some(99));
        assert_eq!(snap.pot_moved(0), None);
        assert_eq!(snap.sliders[2], 200 & 0x7F);

        snap.clear_edges();
        assert!(!snap.has_edges());
        assert!(!snap.just_pressed(3));
        assert!(snap.buttons[3]);
        assert_eq!(snap.pots[1], 99);
    }

    #[test]
    fn out_of_range_controls_are_ignored() {
        let mut snap = ControlSnapshot::default();
        snap.press(16);
        snap.set_pot(4, 10);
        assert!(!snap.has_edges());
        assert!(!snap.just_pressed(16));
        assert_eq!(snap.pot_moved(4), None);
    }

    #[test]
    fn pages_cycle() {
        let mut page = ControlPage::TempoMode;
        for _ in 0..4 {
            page = page.next();
        }
        assert_eq!(page, ControlPage::TempoMode);
        assert_eq!(ControlPage::Sliders34.controls().1, Control::Slider(3));
    }
}
