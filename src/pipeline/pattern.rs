use std::ops::{Index, IndexMut};

use super::track::Track;
use crate::shared::NUM_TRACKS;

const TRACK_MASK: usize = NUM_TRACKS - 1;

/// Eight parallel tracks sharing one loop. Track indices wrap at 8.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pattern {
    tracks: [Track; NUM_TRACKS],
}

impl Pattern {
    pub fn track(&self, index: usize) -> &Track {
        &self.tracks[index & TRACK_MASK]
    }

    pub fn track_mut(&mut self, index: usize) -> &mut Track {
        &mut self.tracks[index & TRACK_MASK]
    }

    pub fn clear(&mut self) {
        self.tracks.iter_mut().for_each(Track::clear);
    }

    pub fn has_active_events(&self) -> bool {
        self.tracks.iter().any(Track::has_active_events)
    }

    pub fn count_active_events(&self) -> usize {
        self.tracks.iter().map(Track::count_active_events).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    pub const fn len() -> usize {
        NUM_TRACKS
    }
}

impl Index<usize> for Pattern {
    type Output = Track;

    fn index(&self, index: usize) -> &Track {
        self.track(index)
    }
}

impl IndexMut<usize> for Pattern {
    fn index_mut(&mut self, index: usize) -> &mut Track {
        self.track_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::event::Event;

    #[test]
    fn tracks_wrap_at_eight() {
        let mut pattern = Pattern::default();
        pattern[9][2].set_switch(true);
        assert!(pattern.track(1).event(2).switch());
        assert!(pattern.has_active_events());
    }

    #[test]
    fn counts_across_tracks() {
        let mut pattern = Pattern::default();
        pattern[0].set_event(0, Event::new(true, 0, 0, 0, 0));
        pattern[7].set_event(15, Event::new(true, 0, 0, 0, 0));
        pattern[3].set_event(3, Event::new(false, 9, 9, 9, 9));
        assert_eq!(pattern.count_active_events(), 2);

        pattern.clear();
        assert!(!pattern.has_active_events());
        assert!(pattern.iter().all(|t| t.iter().all(|e| e.is_empty())));
    }
}
