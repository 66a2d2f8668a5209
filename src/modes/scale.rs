// Scale tables and the banded selectors that pick them from a 0-127 param.

use crate::shared::MAX_DATA;

const BAND_WIDTH: u8 = 16;
pub const NUM_BANDS: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scale {
    Major,
    Minor,
    Dorian,
    Phrygian,
    Mixolydian,
    Locrian,
    PentatonicMajor,
    PentatonicMinor,
    Blues,
    Chromatic,
}

/// Band order used by the arpeggiator.
pub const ARP_SCALES: [Scale; NUM_BANDS] = [
    Scale::Major,
    Scale::Minor,
    Scale::Dorian,
    Scale::Phrygian,
    Scale::Mixolydian,
    Scale::PentatonicMajor,
    Scale::PentatonicMinor,
    Scale::Chromatic,
];

/// Band order used by the bassline generator.
pub const BASS_SCALES: [Scale; NUM_BANDS] = [
    Scale::Major,
    Scale::Minor,
    Scale::Dorian,
    Scale::Mixolydian,
    Scale::Blues,
    Scale::Phrygian,
    Scale::Locrian,
    Scale::Chromatic,
];

impl Scale {
    pub fn intervals(self) -> &'static [u8] {
        match self {
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Scale::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            Scale::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            Scale::Locrian => &[0, 1, 3, 5, 6, 8, 10],
            Scale::PentatonicMajor => &[0, 2, 4, 7, 9],
            Scale::PentatonicMinor => &[0, 3, 5, 7, 10],
            Scale::Blues => &[0, 3, 5, 6, 7, 10],
            Scale::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }

    pub fn len(self) -> usize {
        self.intervals().len()
    }

    /// Note `degree` steps up the scale from `root`, climbing octaves as
    /// needed, clamped to 127.
    pub fn note(self, root: u8, degree: usize) -> u8 {
        let intervals = self.intervals();
        let octave = degree / intervals.len();
        let position = degree % intervals.len();
        let note = u32::from(root) + octave as u32 * 12 + u32::from(intervals[position]);
        note.min(u32::from(MAX_DATA)) as u8
    }
}

/// Band index for a 0-127 value: [0,16), [16,32), ... with the last band
/// running open-ended to 127.
pub fn band(value: u8) -> usize {
    usize::from(value / BAND_WIDTH).min(NUM_BANDS - 1)
}

pub fn select(table: &[Scale; NUM_BANDS], value: u8) -> Scale {
    table[band(value)]
}

/// Linear map of a 0-127 param onto `min..=max` using integer math.
pub fn map_param(value: u8, min: u32, max: u32) -> u32 {
    min + u32::from(value & MAX_DATA) * (max - min) / u32::from(MAX_DATA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_half_open() {
        assert_eq!(band(0), 0);
        assert_eq!(band(15), 0);
        assert_eq!(band(16), 1);
        assert_eq!(band(111), 6);
        assert_eq!(band(112), 7);
        assert_eq!(band(127), 7);
    }

    #[test]
    fn tables_differ_where_they_should() {
        assert_eq!(select(&ARP_SCALES, 50), Scale::Phrygian);
        assert_eq!(select(&BASS_SCALES, 50), Scale::Mixolydian);
        assert_eq!(select(&BASS_SCALES, 70), Scale::Blues);
        assert_eq!(select(&ARP_SCALES, 127), Scale::Chromatic);
    }

    #[test]
    fn degrees_climb_octaves() {
        assert_eq!(Scale::Major.note(60, 0), 60);
        assert_eq!(Scale::Major.note(60, 4), 67);
        assert_eq!(Scale::Major.note(60, 7), 72);
        assert_eq!(Scale::PentatonicMinor.note(48, 6), 48 + 12 + 3);
        assert_eq!(Scale::Chromatic.note(120, 20), 127);
    }

    #[test]
    fn param_mapping_hits_endpoints() {
        assert_eq!(map_param(0, 10, 2000), 10);
        assert_eq!(map_param(127, 10, 2000), 2000);
        assert_eq!(map_param(64, 10, 2000), 10 + 64 * 1990 / 127);
    }
}
