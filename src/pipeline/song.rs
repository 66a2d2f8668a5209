use super::event::Event;
use super::pattern::Pattern;
use crate::shared::{NUM_MODES, NUM_PATTERNS, NUM_TRACKS, STEPS_PER_TRACK};

const PATTERN_MASK: usize = NUM_PATTERNS - 1;

/// The whole song: 15 mode slots by 32 patterns, stored inline as one block.
///
/// Mode indices alias modulo 15 and pattern indices modulo 32. Mode 0,
/// pattern 0, track 0 holds the pattern-chaining sequence rather than music.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Song {
    patterns: [[Pattern; NUM_PATTERNS]; NUM_MODES],
}

impl Default for Song {
    fn default() -> Self {
        Self::new()
    }
}

impl Song {
    pub const MEMORY_SIZE: usize =
        NUM_MODES * NUM_PATTERNS * NUM_TRACKS * STEPS_PER_TRACK * std::mem::size_of::<Event>();

    pub fn new() -> Self {
        Self {
            patterns: [[Pattern::default(); NUM_PATTERNS]; NUM_MODES],
        }
    }

    /// Heap-allocated empty song; the block is ~240 KB.
    pub fn boxed() -> Box<Self> {
        Box::new(Self::new())
    }

    pub fn pattern(&self, mode: usize, pattern: usize) -> &Pattern {
        &self.patterns[mode % NUM_MODES][pattern & PATTERN_MASK]
    }

    pub fn pattern_mut(&mut self, mode: usize, pattern: usize) -> &mut Pattern {
        &mut self.patterns[mode % NUM_MODES][pattern & PATTERN_MASK]
    }

    pub fn event(&self, mode: usize, pattern: usize, track: usize, step: usize) -> Event {
        self.pattern(mode, pattern).track(track).event(step)
    }

    pub fn event_mut(&mut self, mode: usize, pattern: usize, track: usize, step: usize) -> &mut Event {
        self.pattern_mut(mode, pattern).track_mut(track).event_mut(step)
    }

    pub fn clear(&mut self) {
        self.patterns
            .iter_mut()
            .flatten()
            .for_each(Pattern::clear);
    }

    pub fn has_active_events(&self) -> bool {
        self.patterns.iter().flatten().any(Pattern::has_active_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_is_one_exact_block() {
        assert_eq!(Song::MEMORY_SIZE, 15 * 32 * 8 * 16 * 4);
        assert_eq!(std::mem::size_of::<Song>(), Song::MEMORY_SIZE);
    }

    #[test]
    fn indices_alias_into_range() {
        let mut song = Song::boxed();
        song.event_mut(16, 33, 9, 18).set_switch(true);
        // 16 % 15 = 1, 33 & 31 = 1, 9 & 7 = 1, 18 & 15 = 2
        assert!(song.event(1, 1, 1, 2).switch());
        assert!(song.pattern(1, 1).has_active_events());
        assert!(!song.pattern(1, 0).has_active_events());
    }

    #[test]
    fn clear_reaches_every_pattern() {
        let mut song = Song::boxed();
        song.event_mut(0, 0, 0, 0).set_switch(true);
        song.event_mut(14, 31, 7, 15).set_switch(true);
        assert!(song.has_active_events());
        song.clear();
        assert!(!song.has_active_events());
        assert!(song.event(14, 31, 7, 15).is_empty());
    }
}
