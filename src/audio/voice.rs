use super::frame::StereoFrame;

// shortest glide, so an instant portamento doesn't click
const MIN_GLIDE_MS: f32 = 1.0;
const MAX_GLIDE_MS: f32 = 500.0;

const ATTACK_MS: f32 = 3.0;
const RELEASE_MS: f32 = 80.0;
const SILENCE: f32 = 0.0005;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Saw,
    Triangle,
    // note number picks the instrument, GM-ish
    Drum,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Attack,
    Hold,
    Release,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DrumKind {
    Kick,
    Snare,
    ClosedHat,
    OpenHat,
    Tom,
    Cymbal,
}

impl DrumKind {
    fn from_note(note: u8) -> Self {
        match note {
            35 | 36 => DrumKind::Kick,
            37..=40 => DrumKind::Snare,
            42 | 44 => DrumKind::ClosedHat,
            46 => DrumKind::OpenHat,
            41 | 43 | 45 | 47 | 48 | 50 => DrumKind::Tom,
            _ => DrumKind::Cymbal,
        }
    }

    // seconds to fall to about 1/e
    fn decay_s(self) -> f32 {
        match self {
            DrumKind::Kick => 0.18,
            DrumKind::Snare => 0.09,
            DrumKind::ClosedHat => 0.03,
            DrumKind::OpenHat => 0.2,
            DrumKind::Tom => 0.15,
            DrumKind::Cymbal => 0.45,
        }
    }
}

pub fn note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((f32::from(note) - 69.0) / 12.0)
}

// 0-127 onto 1-500 ms
pub fn glide_ms(cc: u8) -> f32 {
    MIN_GLIDE_MS + f32::from(cc) * (MAX_GLIDE_MS - MIN_GLIDE_MS) / 127.0
}

#[derive(Clone, Copy, Debug)]
pub struct Voice {
    pub channel: u8,
    pub note: u8,
    waveform: Waveform,
    sample_rate: f32,
    phase: f32,
    freq: f32,
    target_freq: f32,
    glide_coef: f32,
    gain: f32,
    env: f32,
    stage: Stage,
    decay_coef: f32,
    pitch_drop: f32,
    noise: u32,
    age: u64,
}

impl Voice {
    pub fn idle(sample_rate: f32) -> Self {
        Self {
            channel: 0,
            note: 0,
            waveform: Waveform::Sine,
            sample_rate,
            phase: 0.0,
            freq: 0.0,
            target_freq: 0.0,
            glide_coef: 0.0,
            gain: 0.0,
            env: 0.0,
            stage: Stage::Done,
            decay_coef: 1.0,
            pitch_drop: 1.0,
            noise: 0x9E37_79B9,
            age: 0,
        }
    }

    pub fn start(&mut self, channel: u8, note: u8, velocity: u8, waveform: Waveform, age: u64) {
        let freq = note_to_freq(note);
        self.channel = channel;
        self.note = note;
        self.waveform = waveform;
        self.phase = 0.0;
        self.freq = freq;
        self.target_freq = freq;
        self.glide_coef = 0.0;
        self.gain = f32::from(velocity) / 127.0 * 0.3;
        self.env = 0.0;
        self.stage = Stage::Attack;
        self.age = age;
        self.noise ^= (u32::from(note) << 16) | u32::from(velocity);
        if self.noise == 0 {
            self.noise = 0x9E37_79B9;
        }

        if waveform == Waveform::Drum {
            let kind = DrumKind::from_note(note);
            self.decay_coef = (-1.0 / (kind.decay_s() * self.sample_rate)).exp();
            self.pitch_drop = match kind {
                DrumKind::Kick => 3.0,
                DrumKind::Tom => 1.6,
                _ => 1.0,
            };
            if kind == DrumKind::Kick {
                self.freq = 50.0;
                self.target_freq = 50.0;
            }
        } else {
            self.decay_coef = 1.0;
            self.pitch_drop = 1.0;
        }
    }

    /// Slide from the current pitch to `note` instead of retriggering.
    pub fn glide_to(&mut self, note: u8, velocity: u8, glide_ms: f32) {
        self.note = note;
        self.target_freq = note_to_freq(note);
        self.gain = f32::from(velocity) / 127.0 * 0.3;
        let samples = (glide_ms / 1000.0 * self.sample_rate).max(1.0);
        self.glide_coef = (-1.0 / samples).exp();
        if self.stage == Stage::Release {
            self.stage = Stage::Hold;
        }
    }

    pub fn release(&mut self) {
        // drums ring out on their own decay
        if self.waveform != Waveform::Drum && self.stage != Stage::Done {
            self.stage = Stage::Release;
        }
    }

    pub fn is_active(&self) -> bool {
        self.stage != Stage::Done
    }

    pub fn is_held(&self) -> bool {
        matches!(self.stage, Stage::Attack | Stage::Hold)
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    fn next_noise(&mut self) -> f32 {
        // xorshift32
        let mut x = self.noise;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.noise = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }

    fn advance_env(&mut self) {
        match self.stage {
            Stage::Attack => {
                self.env += 1000.0 / (ATTACK_MS * self.sample_rate);
                if self.env >= 1.0 {
                    self.env = 1.0;
                    self.stage = Stage::Hold;
                }
            }
            Stage::Hold => {
                self.env *= self.decay_coef;
                if self.env < SILENCE {
                    self.stage = Stage::Done;
                }
            }
            Stage::Release => {
                self.env -= 1000.0 / (RELEASE_MS * self.sample_rate);
                if self.env <= 0.0 {
                    self.env = 0.0;
                    self.stage = Stage::Done;
                }
            }
            Stage::Done => {}
        }
    }

    fn oscillator(&mut self) -> f32 {
        let p = self.phase;
        match self.waveform {
            Waveform::Sine => (p * std::f32::consts::TAU).sin(),
            Waveform::Square => {
                if p < 0.5 {
                    0.6
                } else {
                    -0.6
                }
            }
            Waveform::Saw => (2.0 * p - 1.0) * 0.6,
            Waveform::Triangle => 1.0 - 4.0 * (p - 0.5).abs(),
            Waveform::Drum => match DrumKind::from_note(self.note) {
                DrumKind::Kick | DrumKind::Tom => (p * std::f32::consts::TAU).sin(),
                DrumKind::Snare => 0.6 * self.next_noise() + 0.4 * (p * std::f32::consts::TAU).sin(),
                DrumKind::ClosedHat | DrumKind::OpenHat | DrumKind::Cymbal => 0.5 * self.next_noise(),
            },
        }
    }

    /// Mix this voice into `out`, panned.
    pub fn render_into(&mut self, out: &mut [StereoFrame], pan: f32, volume: f32) {
        for frame in out.iter_mut() {
            if self.stage == Stage::Done {
                break;
            }
            if self.glide_coef > 0.0 {
                self.freq = self.target_freq + (self.freq - self.target_freq) * self.glide_coef;
            }
            let s = self.oscillator();
            *frame += StereoFrame::panned(s * self.env * self.gain * volume, pan);

            // drum pitch sweeps down towards the base frequency over the hit
            let freq = self.freq * (1.0 + (self.pitch_drop - 1.0) * self.env);
            self.phase += freq / self.sample_rate;
            self.phase -= self.phase.floor();
            self.advance_env();
        }
    }
}
