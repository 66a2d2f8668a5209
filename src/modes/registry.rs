use super::Mode;
use crate::shared::NUM_MODES;

/// Owned slot array, one optional mode per song mode slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModeRegistry {
    slots: [Option<Mode>; NUM_MODES],
}

impl ModeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `mode` in slot `index`, dropping whatever was there. Returns false
    /// (and drops `mode`) for an index outside 0-14.
    pub fn register(&mut self, index: usize, mode: Mode) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        if let Some(old) = slot.replace(mode) {
            tracing::debug!(slot = index, replaced = old.name(), "mode replaced");
        }
        true
    }

    pub fn unregister(&mut self, index: usize) -> Option<Mode> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    pub fn get(&self, index: usize) -> Option<&Mode> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Mode> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn name(&self, index: usize) -> &'static str {
        self.get(index).map_or("Empty", Mode::name)
    }

    /// Occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Mode)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|m| (i, m)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut Mode)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|m| (i, m)))
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::ModeKind;

    #[test]
    fn empty_slots_read_as_none() {
        let reg = ModeRegistry::new();
        assert!(reg.get(0).is_none());
        assert!(reg.get(14).is_none());
        assert!(reg.get(15).is_none());
        assert_eq!(reg.name(3), "Empty");
        assert!(reg.is_empty());
    }

    #[test]
    fn register_replaces() {
        let mut reg = ModeRegistry::new();
        assert!(reg.register(1, Mode::new(ModeKind::DrumMachine, 2)));
        assert!(reg.register(1, Mode::new(ModeKind::AcidBass, 3)));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.name(1), "AcidBass");
        assert_eq!(reg.get(1).map(Mode::channel), Some(3));
    }

    #[test]
    fn register_rejects_bad_slot() {
        let mut reg = ModeRegistry::new();
        assert!(!reg.register(15, Mode::new(ModeKind::DrumMachine, 2)));
        assert!(reg.is_empty());
    }

    #[test]
    fn unregister_hands_back_the_mode() {
        let mut reg = ModeRegistry::new();
        reg.register(4, Mode::new(ModeKind::MetaArp, 5));
        let taken = reg.unregister(4);
        assert_eq!(taken.map(|m| m.kind()), Some(ModeKind::MetaArp));
        assert!(!reg.contains(4));
        assert!(reg.unregister(4).is_none());
        assert!(reg.unregister(40).is_none());
    }

    #[test]
    fn iteration_is_in_slot_order() {
        let mut reg = ModeRegistry::new();
        reg.register(5, Mode::new(ModeKind::Bassline, 6));
        reg.register(0, Mode::new(ModeKind::PatternSequencer, 1));
        reg.register(2, Mode::new(ModeKind::AcidBass, 3));
        let slots: Vec<usize> = reg.iter().map(|(i, _)| i).collect();
        assert_eq!(slots, vec![0, 2, 5]);

        for (_, mode) in reg.iter_mut() {
            mode.reset();
        }
        reg.clear();
        assert_eq!(reg.len(), 0);
    }
}
