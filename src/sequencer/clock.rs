// Tempo and the two clocks derived from it. All time is integer milliseconds
// from whatever monotonic source the caller uses.

use crate::shared::{DEFAULT_BPM, MAX_BPM, MIN_BPM, PULSES_PER_QUARTER, STEPS_PER_BEAT};

const MS_PER_MINUTE: f32 = 60_000.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tempo {
    bpm: f32,
}

impl Default for Tempo {
    fn default() -> Self {
        Self::new(DEFAULT_BPM)
    }
}

impl Tempo {
    /// Clamped to 20-800 BPM. NaN falls back to the default.
    pub fn new(bpm: f32) -> Self {
        let bpm = if bpm.is_nan() { DEFAULT_BPM } else { bpm.clamp(MIN_BPM, MAX_BPM) };
        Self { bpm }
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    /// One sixteenth note.
    pub fn step_interval_ms(&self) -> u64 {
        (MS_PER_MINUTE / self.bpm / STEPS_PER_BEAT) as u64
    }

    /// One 24 PPQN clock pulse.
    pub fn clock_interval_ms(&self) -> u64 {
        (MS_PER_MINUTE / self.bpm / PULSES_PER_QUARTER) as u64
    }
}

/// Fixed-interval ticker. `last` moves forward by whole intervals rather than
/// snapping to `now`, so late polls don't accumulate drift.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Clock {
    interval: u64,
    last: u64,
}

impl Clock {
    pub fn new(interval: u64) -> Self {
        Self { interval, last: 0 }
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    pub fn set_interval(&mut self, interval: u64) {
        self.interval = interval;
    }

    pub fn restart(&mut self, now: u64) {
        self.last = now;
    }

    /// Number of whole intervals that have elapsed since the last one.
    pub fn poll(&mut self, now: u64) -> u64 {
        if self.interval == 0 {
            return 0;
        }
        // clock source went backwards; resync instead of waiting it out
        if now < self.last {
            self.last = now;
            return 0;
        }
        let ticks = (now - self.last) / self.interval;
        self.last += ticks * self.interval;
        ticks
    }
}
