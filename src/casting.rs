//! Coin casting and the line-pattern reference table.
//!
//! A cast produces six lines, each from a toss of three coins. Patterns are written as six
//! characters in toss order, `L` for a solid line and `G` for a broken one, and looked up in
//! [`LINE_PATTERNS`] to find the hexagram number.
//!
//! The table is the traditional lookup carried over as-is. It has 63 entries: `LGLLLL` maps to
//! 14 Possession and no pattern maps to 9. A cast that lands on the missing pattern fails with
//! [`OracleError::NotFound`] rather than guessing a number.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Arc};

use crate::{cache::CorpusCache, error::OracleError, hexagram::HexagramRecord};

/// Pattern, hexagram number, short name.
pub const LINE_PATTERNS: [(&str, u8, &str); 63] = [
    ("LLLLLL", 1, "Creative"),
    ("GGGGGG", 2, "Receptive"),
    ("GLGGGL", 3, "Difficulty"),
    ("LGGGLG", 4, "Folly"),
    ("GLGLLL", 5, "Waiting"),
    ("LLLGLG", 6, "Conflict"),
    ("GGGGLG", 7, "Army"),
    ("GLGGGG", 8, "Union"),
    ("LGLLLL", 14, "Possession"),
    ("LLLGLL", 10, "Treading"),
    ("GGGLLL", 11, "Peace"),
    ("LLLGGG", 12, "Standstill"),
    ("LLLLGL", 13, "Fellowship"),
    ("GGGLGG", 15, "Modesty"),
    ("GGLGGG", 16, "Enthusiasm"),
    ("GLLGGL", 17, "Following"),
    ("LGGLLG", 18, "Decay"),
    ("GGGGLL", 19, "Approach"),
    ("LLGGGG", 20, "View"),
    ("LGLGGL", 21, "Biting"),
    ("LGGLGL", 22, "Grace"),
    ("LGGGGG", 23, "Splitting"),
    ("GGGGGL", 24, "Return"),
    ("LLLGGL", 25, "Innocence"),
    ("LGGLLL", 26, "Taming"),
    ("LGGGGL", 27, "Mouth"),
    ("GLLLLG", 28, "Preponderance"),
    ("GLGGLG", 29, "Abysmal"),
    ("LGLLGL", 30, "Clinging"),
    ("GLLLGG", 31, "Influence"),
    ("GGLLLG", 32, "Duration"),
    ("LLLLGG", 33, "Retreat"),
    ("GGLLLL", 34, "Power"),
    ("LGLGGG", 35, "Progress"),
    ("GGGLGL", 36, "Darkening"),
    ("LLGLGL", 37, "Family"),
    ("LGLGLL", 38, "Opposition"),
    ("GLGLGG", 39, "Obstruction"),
    ("GGLGLG", 40, "Deliverance"),
    ("LGGGLL", 41, "Decrease"),
    ("LLGGGL", 42, "Increase"),
    ("GLLLLL", 43, "Resoluteness"),
    ("LLLLLG", 44, "Coming"),
    ("GLLGGG", 45, "Gathering"),
    ("GGGLLG", 46, "Pushing"),
    ("GLLGLG", 47, "Oppression"),
    ("GLGLLG", 48, "Well"),
    ("GLLLGL", 49, "Revolution"),
    ("LGLLLG", 50, "Caldron"),
    ("GGLGGL", 51, "Arousing"),
    ("LGGLGG", 52, "Still"),
    ("LLGLGG", 53, "Development"),
    ("GGLGLL", 54, "Marrying"),
    ("GGLLGL", 55, "Abundance"),
    ("LGLLGG", 56, "Wanderer"),
    ("LLGLLG", 57, "Gentle"),
    ("GLLGLL", 58, "Joyous"),
    ("LLGGLG", 59, "Dispersion"),
    ("GLGGLL", 60, "Limitation"),
    ("LLGGLL", 61, "Truth"),
    ("GGLLGG", 62, "Small"),
    ("GLGLGL", 63, "After"),
    ("LGLGLG", 64, "Before"),
];

/// Hexagram number and short name for a six-character pattern.
pub fn lookup_pattern(pattern: &str) -> Option<(u8, &'static str)> {
    LINE_PATTERNS
        .iter()
        .find(|(key, _, _)| *key == pattern)
        .map(|(_, number, name)| (*number, *name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineKind {
    /// Yang, `L`.
    Solid,
    /// Yin, `G`.
    Broken,
}

impl LineKind {
    pub fn code(self) -> char {
        match self {
            LineKind::Solid => 'L',
            LineKind::Broken => 'G',
        }
    }

    pub fn from_code(code: char) -> Option<LineKind> {
        match code {
            'L' => Some(LineKind::Solid),
            'G' => Some(LineKind::Broken),
            _ => None,
        }
    }
}

/// Six lines in toss order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinePattern(pub [LineKind; 6]);

impl LinePattern {
    pub fn lookup(&self) -> Option<(u8, &'static str)> {
        lookup_pattern(&self.to_string())
    }
}

impl fmt::Display for LinePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|line| write!(f, "{}", line.code()))
    }
}

impl FromStr for LinePattern {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kinds = s
            .chars()
            .map(LineKind::from_code)
            .collect::<Option<Vec<LineKind>>>()
            .ok_or_else(|| OracleError::Codec(format!("'{s}' is not an L/G line pattern")))?;
        let lines: [LineKind; 6] = kinds
            .try_into()
            .map_err(|_| OracleError::Codec(format!("'{s}' does not have six lines")))?;
        Ok(LinePattern(lines))
    }
}

/// One line of a cast: what it is now and what it becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastLine {
    pub current: LineKind,
    pub future: LineKind,
}

impl CastLine {
    /// Three heads: a broken line changing to solid. Three tails: a solid line changing to
    /// broken. Two heads: solid. One head: broken.
    pub fn from_coins(coins: [bool; 3]) -> CastLine {
        let (current, future) = match coins.iter().filter(|heads| **heads).count() {
            3 => (LineKind::Broken, LineKind::Solid),
            0 => (LineKind::Solid, LineKind::Broken),
            2 => (LineKind::Solid, LineKind::Solid),
            _ => (LineKind::Broken, LineKind::Broken),
        };
        CastLine { current, future }
    }

    pub fn is_changing(&self) -> bool {
        self.current != self.future
    }
}

/// The outcome of a cast, as hexagram numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub lines: [CastLine; 6],
    pub current: u8,
    /// Present only when at least one line is changing.
    pub future: Option<u8>,
}

impl Reading {
    pub fn from_lines(lines: [CastLine; 6]) -> Result<Reading, OracleError> {
        let current = LinePattern(lines.map(|line| line.current));
        let future = LinePattern(lines.map(|line| line.future));
        let number_of = |pattern: LinePattern| {
            pattern.lookup().map(|(number, _)| number).ok_or_else(|| {
                OracleError::NotFound(format!("no hexagram for line pattern {pattern}"))
            })
        };
        let current_number = number_of(current)?;
        let future_number = if future != current {
            Some(number_of(future)?)
        } else {
            None
        };
        Ok(Reading {
            lines,
            current: current_number,
            future: future_number,
        })
    }

    pub fn has_transition(&self) -> bool {
        self.future.is_some()
    }

    /// Positions (0-based, toss order) of the changing lines.
    pub fn changing_lines(&self) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.is_changing())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Fetch the records for this reading from `cache`.
    pub fn resolve(&self, cache: &CorpusCache) -> Result<ResolvedReading, OracleError> {
        let fetch = |number: u8| {
            cache
                .get_hexagram(number as i64)
                .ok_or_else(|| OracleError::NotFound(format!("hexagram {number} is not loaded")))
        };
        Ok(ResolvedReading {
            current: fetch(self.current)?,
            future: self.future.map(fetch).transpose()?,
        })
    }
}

/// A reading with its hexagram records attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReading {
    pub current: Arc<HexagramRecord>,
    pub future: Option<Arc<HexagramRecord>>,
}

impl ResolvedReading {
    pub fn has_transition(&self) -> bool {
        self.future.is_some()
    }
}

fn write_summary(f: &mut fmt::Formatter<'_>, record: &HexagramRecord) -> fmt::Result {
    write!(
        f,
        "*{} {}*\n{}\n{}\n{}",
        record.number, record.title, record.trigram_above, record.trigram_below, record.description
    )
}

impl fmt::Display for ResolvedReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_summary(f, &self.current)?;
        if let Some(future) = &self.future {
            f.write_str("\ntransitioning to\n")?;
            write_summary(f, future)?;
        }
        Ok(())
    }
}

/// Cast with a caller-supplied toss, `true` meaning heads.
pub fn cast_with<F: FnMut() -> [bool; 3]>(mut toss: F) -> Result<Reading, OracleError> {
    let lines: [CastLine; 6] = std::array::from_fn(|_| CastLine::from_coins(toss()));
    Reading::from_lines(lines)
}

/// Cast with coins drawn from the operating system's random source.
pub fn cast() -> Result<Reading, OracleError> {
    let mut entropy = [0u8; 6];
    getrandom::getrandom(&mut entropy)
        .map_err(|e| OracleError::Io(format!("random source unavailable: {e}")))?;
    let mut bytes = entropy.into_iter();
    cast_with(|| {
        let byte = bytes.next().unwrap_or_default();
        [byte & 1 != 0, byte & 2 != 0, byte & 4 != 0]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    const TWO_HEADS: [bool; 3] = [false, true, true];

    #[test]
    fn table_is_preserved_including_the_possession_entry() {
        assert_eq!(LINE_PATTERNS.len(), 63);
        assert_eq!(lookup_pattern("LLLLLL"), Some((1, "Creative")));
        assert_eq!(lookup_pattern("GGGGGG"), Some((2, "Receptive")));
        assert_eq!(lookup_pattern("LGLLLL"), Some((14, "Possession")));
        assert_eq!(lookup_pattern("LLLGLL"), Some((10, "Treading")));
        assert_eq!(lookup_pattern("LLGLLL"), None);
        assert_eq!(lookup_pattern("UNKNOWN"), None);

        let numbers: BTreeSet<u8> = LINE_PATTERNS.iter().map(|(_, n, _)| *n).collect();
        let patterns: BTreeSet<&str> = LINE_PATTERNS.iter().map(|(p, _, _)| *p).collect();
        assert_eq!(numbers.len(), 63);
        assert_eq!(patterns.len(), 63);
        assert!(!numbers.contains(&9));
    }

    #[test]
    fn coins_to_lines() {
        let changing_yin = CastLine::from_coins([true, true, true]);
        assert_eq!(changing_yin.current, LineKind::Broken);
        assert_eq!(changing_yin.future, LineKind::Solid);
        assert!(changing_yin.is_changing());

        let changing_yang = CastLine::from_coins([false, false, false]);
        assert_eq!(changing_yang.current, LineKind::Solid);
        assert_eq!(changing_yang.future, LineKind::Broken);

        assert!(!CastLine::from_coins(TWO_HEADS).is_changing());
        assert_eq!(CastLine::from_coins(TWO_HEADS).current, LineKind::Solid);
        assert_eq!(CastLine::from_coins([true, false, false]).current, LineKind::Broken);
    }

    #[test]
    fn stable_cast_has_no_transition() {
        let reading = cast_with(|| TWO_HEADS).unwrap();
        assert_eq!(reading.current, 1);
        assert_eq!(reading.future, None);
        assert!(!reading.has_transition());
        assert!(reading.changing_lines().is_empty());
    }

    #[test]
    fn changing_first_line_transitions() {
        let mut tosses = vec![[true, true, true]];
        tosses.extend([TWO_HEADS; 5]);
        let mut tosses = tosses.into_iter();
        let reading = cast_with(|| tosses.next().unwrap()).unwrap();
        assert_eq!(reading.current, 43);
        assert_eq!(reading.future, Some(1));
        assert_eq!(reading.changing_lines(), vec![0]);
    }

    #[test]
    fn missing_pattern_is_not_found() {
        // L L G L L L
        let mut tosses = [
            TWO_HEADS,
            TWO_HEADS,
            [true, false, false],
            TWO_HEADS,
            TWO_HEADS,
            TWO_HEADS,
        ]
        .into_iter();
        let err = cast_with(|| tosses.next().unwrap()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn pattern_round_trip() {
        let pattern: LinePattern = "LGLLLL".parse().unwrap();
        assert_eq!(pattern.to_string(), "LGLLLL");
        assert_eq!(pattern.lookup(), Some((14, "Possession")));
        assert!("LGL".parse::<LinePattern>().is_err());
        assert!("LGLLLX".parse::<LinePattern>().is_err());
    }

    #[test]
    fn random_cast_lands_on_a_table_entry_or_the_gap() {
        for _ in 0..32 {
            match cast() {
                Ok(reading) => assert!((1..=64).contains(&reading.current)),
                Err(e) => assert!(e.is_not_found()),
            }
        }
    }
}
