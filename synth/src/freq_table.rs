//! Note number to square/wave channel frequency divisor.
//!
//! A channel with divisor `x` oscillates at `131072 / (2048 - x)` Hz. The table covers six
//! equal-tempered octaves plus a final C, starting from note number 24.

/// Lowest note number with a table entry
pub const NOTE_MIN: u8 = 24;
/// Highest note number the driver will play; it clamps to the last table entry
pub const NOTE_MAX: u8 = 97;

#[rustfmt::skip]
pub const FREQUENCY_TABLE: [u16; 73] = [
    // C    C#     D    D#     E     F    F#     G    G#     A    A#     B   // Oct
      44,  156,  262,  363,  457,  547,  631,  710,  786,  854,  923,  986,  // 0
    1046, 1102, 1155, 1205, 1253, 1297, 1339, 1379, 1417, 1452, 1486, 1517,  // 1
    1546, 1575, 1602, 1627, 1650, 1673, 1694, 1714, 1732, 1750, 1767, 1783,  // 2
    1798, 1812, 1825, 1837, 1849, 1860, 1871, 1881, 1890, 1899, 1907, 1915,  // 3
    1923, 1930, 1936, 1943, 1949, 1954, 1959, 1964, 1969, 1974, 1978, 1982,  // 4
    1985, 1988, 1992, 1995, 1998, 2001, 2004, 2006, 2009, 2011, 2013, 2015,  // 5
    2017,
];

const LAST_INDEX: usize = FREQUENCY_TABLE.len() - 1;

/// Returns the divisor for a semitone index in `0..=72`.
///
/// Panics on an index past the table; callers range-check through [`note_index`] first.
pub fn lookup(index: usize) -> u16 {
    FREQUENCY_TABLE[index]
}

/// Maps a note number to its table index, or `None` when the note is outside
/// [`NOTE_MIN`]..=[`NOTE_MAX`]. Note 97 lies one past the table and clamps to the last entry.
pub fn note_index(number: u8) -> Option<usize> {
    if !(NOTE_MIN..=NOTE_MAX).contains(&number) {
        return None;
    }
    Some(((number - NOTE_MIN) as usize).min(LAST_INDEX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn golden_values() {
        let expected: [u16; 73] = [
            44, 156, 262, 363, 457, 547, 631, 710, 786, 854, 923, 986, 1046, 1102, 1155, 1205,
            1253, 1297, 1339, 1379, 1417, 1452, 1486, 1517, 1546, 1575, 1602, 1627, 1650, 1673,
            1694, 1714, 1732, 1750, 1767, 1783, 1798, 1812, 1825, 1837, 1849, 1860, 1871, 1881,
            1890, 1899, 1907, 1915, 1923, 1930, 1936, 1943, 1949, 1954, 1959, 1964, 1969, 1974,
            1978, 1982, 1985, 1988, 1992, 1995, 1998, 2001, 2004, 2006, 2009, 2011, 2013, 2015,
            2017,
        ];
        for (index, &period) in expected.iter().enumerate() {
            assert_eq!(lookup(index), period, "index {}", index);
        }
    }

    #[test]
    fn periods_fit_eleven_bits_and_rise() {
        for pair in FREQUENCY_TABLE.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert!(FREQUENCY_TABLE.iter().all(|&period| period <= 0x7FF));
    }

    #[test]
    fn lowest_a_is_near_110_hz() {
        let hz = 131072.0 / (2048.0 - lookup(9) as f64);
        assert!((hz - 110.0).abs() < 0.5, "{}", hz);
    }

    #[test]
    fn note_index_range() {
        assert_eq!(note_index(0), None);
        assert_eq!(note_index(23), None);
        assert_eq!(note_index(24), Some(0));
        assert_eq!(note_index(33), Some(9));
        assert_eq!(note_index(96), Some(72));
        assert_eq!(note_index(97), Some(72));
        assert_eq!(note_index(98), None);
        assert_eq!(note_index(255), None);
    }
}
