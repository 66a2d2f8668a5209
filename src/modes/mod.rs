// Modes turn recorded events into outbound messages. One mode instance lives in
// each occupied song mode slot; the set of behaviours is closed, so dispatch is
// a plain match.

pub mod acid_bass;
pub mod bassline;
pub mod drum_machine;
pub mod euclidean_fade;
pub mod meta_arp;
pub mod pattern_sequencer;
pub mod registry;
pub mod scale;

use serde::{Deserialize, Serialize};

pub use acid_bass::AcidBass;
pub use bassline::Bassline;
pub use drum_machine::DrumMachine;
pub use euclidean_fade::EuclideanFade;
pub use meta_arp::MetaArp;
pub use pattern_sequencer::{PatternSequencer, TransitionType};
pub use registry::ModeRegistry;

use crate::message::OutputBuffer;
use crate::pipeline::Event;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    PatternSequencer,
    DrumMachine,
    AcidBass,
    EuclideanFade,
    MetaArp,
    Bassline,
}

impl ModeKind {
    pub const ALL: [ModeKind; 6] = [
        ModeKind::PatternSequencer,
        ModeKind::DrumMachine,
        ModeKind::AcidBass,
        ModeKind::EuclideanFade,
        ModeKind::MetaArp,
        ModeKind::Bassline,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModeKind::PatternSequencer => "PatternSeq",
            ModeKind::DrumMachine => "DrumMachine",
            ModeKind::AcidBass => "AcidBass",
            ModeKind::EuclideanFade => "EuclFade",
            ModeKind::MetaArp => "MetaArp",
            ModeKind::Bassline => "BassLine",
        }
    }

    /// Most messages one transform call can append.
    pub fn max_output(self) -> usize {
        match self {
            ModeKind::PatternSequencer => 0,
            ModeKind::DrumMachine => drum_machine::MAX_OUTPUT,
            ModeKind::AcidBass => acid_bass::MAX_OUTPUT,
            ModeKind::EuclideanFade => euclidean_fade::MAX_OUTPUT,
            ModeKind::MetaArp => meta_arp::MAX_OUTPUT,
            ModeKind::Bassline => bassline::MAX_OUTPUT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    PatternSequencer(PatternSequencer),
    DrumMachine(DrumMachine),
    AcidBass(AcidBass),
    EuclideanFade(EuclideanFade),
    MetaArp(MetaArp),
    Bassline(Bassline),
}

impl Mode {
    pub fn new(kind: ModeKind, channel: u8) -> Self {
        match kind {
            ModeKind::PatternSequencer => Mode::PatternSequencer(PatternSequencer::new(channel)),
            ModeKind::DrumMachine => Mode::DrumMachine(DrumMachine::new(channel)),
            ModeKind::AcidBass => Mode::AcidBass(AcidBass::new(channel)),
            ModeKind::EuclideanFade => Mode::EuclideanFade(EuclideanFade::new(channel)),
            ModeKind::MetaArp => Mode::MetaArp(MetaArp::new(channel)),
            ModeKind::Bassline => Mode::Bassline(Bassline::new(channel)),
        }
    }

    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::PatternSequencer(_) => ModeKind::PatternSequencer,
            Mode::DrumMachine(_) => ModeKind::DrumMachine,
            Mode::AcidBass(_) => ModeKind::AcidBass,
            Mode::EuclideanFade(_) => ModeKind::EuclideanFade,
            Mode::MetaArp(_) => ModeKind::MetaArp,
            Mode::Bassline(_) => ModeKind::Bassline,
        }
    }

    pub fn channel(&self) -> u8 {
        match self {
            Mode::PatternSequencer(m) => m.channel(),
            Mode::DrumMachine(m) => m.channel(),
            Mode::AcidBass(m) => m.channel(),
            Mode::EuclideanFade(m) => m.channel(),
            Mode::MetaArp(m) => m.channel(),
            Mode::Bassline(m) => m.channel(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn max_output(&self) -> usize {
        self.kind().max_output()
    }

    /// Interpret one event from `track` into `out`. Delays in the produced
    /// messages are relative to `now_ms`; tracks past 7 are ignored.
    ///
    /// Acid bass and meta arp update their per-track memory as a side effect.
    pub fn transform(&mut self, track: usize, event: Event, _now_ms: u64, out: &mut OutputBuffer) {
        match self {
            Mode::PatternSequencer(_) => {}
            Mode::DrumMachine(m) => m.transform(track, event, out),
            Mode::AcidBass(m) => m.transform(track, event, out),
            Mode::EuclideanFade(m) => m.transform(track, event, out),
            Mode::MetaArp(m) => m.transform(track, event, out),
            Mode::Bassline(m) => m.transform(track, event, out),
        }
    }

    /// Forget slide memory and arp direction.
    pub fn reset(&mut self) {
        match self {
            Mode::AcidBass(m) => m.reset(),
            Mode::MetaArp(m) => m.reset(),
            _ => {}
        }
    }
}
