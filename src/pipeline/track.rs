use std::ops::{Index, IndexMut};

use super::event::Event;
use crate::shared::STEPS_PER_TRACK;

const STEP_MASK: usize = STEPS_PER_TRACK - 1;

/// 16 steps of one lane. Step indices wrap, so step 17 is step 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Track {
    events: [Event; STEPS_PER_TRACK],
}

impl Track {
    pub fn event(&self, step: usize) -> Event {
        self.events[step & STEP_MASK]
    }

    pub fn event_mut(&mut self, step: usize) -> &mut Event {
        &mut self.events[step & STEP_MASK]
    }

    pub fn set_event(&mut self, step: usize, event: Event) {
        self.events[step & STEP_MASK] = event;
    }

    pub fn clear(&mut self) {
        self.events.iter_mut().for_each(Event::clear);
    }

    pub fn has_active_events(&self) -> bool {
        self.events.iter().any(|e| e.switch())
    }

    pub fn count_active_events(&self) -> usize {
        self.events.iter().filter(|e| e.switch()).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub const fn len() -> usize {
        STEPS_PER_TRACK
    }
}

impl Index<usize> for Track {
    type Output = Event;

    fn index(&self, step: usize) -> &Event {
        &self.events[step & STEP_MASK]
    }
}

impl IndexMut<usize> for Track {
    fn index_mut(&mut self, step: usize) -> &mut Event {
        self.event_mut(step)
    }
}
