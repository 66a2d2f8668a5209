// The recorded unit of performance data: one switch bit plus four 7-bit params
// packed into a single word.
//
// [31:29] unused
// [28]    switch
// [27:21] param 0
// [20:14] param 1
// [13:7]  param 2
// [6:0]   param 3

const SWITCH_BIT: u32 = 1 << 28;
const PARAM_MASK: u32 = 0x7F;
const PARAM_SHIFTS: [u32; NUM_PARAMS] = [21, 14, 7, 0];
const USED_BITS: u32 = 0x1FFF_FFFF;

pub const NUM_PARAMS: usize = 4;

#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Event(u32);

impl Event {
    pub fn new(switch: bool, p0: u8, p1: u8, p2: u8, p3: u8) -> Self {
        let mut event = Self::default();
        event.set_switch(switch);
        for (i, value) in [p0, p1, p2, p3].into_iter().enumerate() {
            event.set_param(i, value);
        }
        event
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw & USED_BITS)
    }

    pub fn switch(self) -> bool {
        self.0 & SWITCH_BIT != 0
    }

    pub fn set_switch(&mut self, on: bool) {
        if on {
            self.0 |= SWITCH_BIT;
        } else {
            self.0 &= !SWITCH_BIT;
        }
    }

    pub fn toggle_switch(&mut self) {
        self.0 ^= SWITCH_BIT;
    }

    /// Param 0-3. Anything else reads as 0.
    pub fn param(self, index: usize) -> u8 {
        match PARAM_SHIFTS.get(index) {
            Some(shift) => ((self.0 >> shift) & PARAM_MASK) as u8,
            None => 0,
        }
    }

    /// Keeps only the low 7 bits of `value`. Writes to index 4+ are dropped.
    pub fn set_param(&mut self, index: usize, value: u8) {
        if let Some(shift) = PARAM_SHIFTS.get(index) {
            let value = u32::from(value) & PARAM_MASK;
            self.0 = (self.0 & !(PARAM_MASK << shift)) | (value << shift);
        }
    }

    pub fn params(self) -> [u8; NUM_PARAMS] {
        std::array::from_fn(|i| self.param(i))
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn set_raw(&mut self, raw: u32) {
        self.0 = raw & USED_BITS;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        let e = Event::default();
        assert!(e.is_empty());
        assert!(!e.switch());
        assert_eq!(e.params(), [0; 4]);
    }

    #[test]
    fn truncation_law_holds_for_every_value() {
        for index in 0..NUM_PARAMS {
            for value in 0..=u8::MAX {
                let mut e = Event::default();
                e.set_param(index, value);
                assert_eq!(e.param(index), value & 0x7F);
            }
        }
    }

    #[test]
    fn params_do_not_bleed_into_neighbours() {
        let mut e = Event::new(true, 0, 0, 0, 0);
        e.set_param(1, 127);
        assert_eq!(e.params(), [0, 127, 0, 0]);
        assert!(e.switch());
        e.set_param(1, 0);
        e.set_param(3, 127);
        assert_eq!(e.params(), [0, 0, 0, 127]);
    }

    #[test]
    fn bit_layout_matches_packing() {
        let e = Event::new(true, 1, 2, 3, 4);
        assert_eq!(e.raw(), (1 << 28) | (1 << 21) | (2 << 14) | (3 << 7) | 4);
    }

    #[test]
    fn raw_round_trip() {
        let e = Event::new(true, 100, 20, 50, 64);
        let copy = Event::from_raw(e.raw());
        assert_eq!(copy, e);
        assert!(copy.switch());
        assert_eq!(copy.params(), [100, 20, 50, 64]);

        let mut masked = Event::default();
        masked.set_raw(0xFFFF_FFFF);
        assert_eq!(masked.raw(), 0x1FFF_FFFF);
    }

    #[test]
    fn clear_then_empty() {
        let mut e = Event::new(true, 127, 127, 127, 127);
        e.clear();
        assert!(e.is_empty());
    }

    #[test]
    fn toggle_flips_only_switch() {
        let mut e = Event::new(false, 10, 20, 30, 40);
        e.toggle_switch();
        assert!(e.switch());
        e.toggle_switch();
        assert!(!e.switch());
        assert_eq!(e.params(), [10, 20, 30, 40]);
    }

    #[test]
    fn out_of_range_param_index() {
        let mut e = Event::new(true, 1, 2, 3, 4);
        let before = e.raw();
        e.set_param(4, 99);
        assert_eq!(e.raw(), before);
        assert_eq!(e.param(7), 0);
    }
}
