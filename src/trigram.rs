//! The eight trigrams and resolution of the corpus' free-text trigram fields.
//!
//! Corpus sections name their trigrams in prose, e.g. `"above CH'IEN THE CREATIVE, HEAVEN"`.
//! [`Trigram::from_description`] maps such text onto the canonical trigram so pages can link a
//! hexagram to its constituent figures.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::OracleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigram {
    Heaven,
    Earth,
    Thunder,
    Water,
    Mountain,
    Wind,
    Fire,
    Lake,
}

/// Romanized first words used by the corpus, after lowercasing and stripping non-alphanumerics.
const ROMANIZED: [(&str, Trigram); 10] = [
    ("chien", Trigram::Heaven),
    ("kun", Trigram::Earth),
    ("chen", Trigram::Thunder),
    ("kan", Trigram::Water),
    ("ken", Trigram::Mountain),
    ("kn", Trigram::Mountain),
    ("sun", Trigram::Wind),
    ("li", Trigram::Fire),
    ("tui", Trigram::Lake),
    ("qian", Trigram::Heaven),
];

impl Trigram {
    pub const ALL: [Trigram; 8] = [
        Trigram::Heaven,
        Trigram::Earth,
        Trigram::Thunder,
        Trigram::Water,
        Trigram::Mountain,
        Trigram::Wind,
        Trigram::Fire,
        Trigram::Lake,
    ];

    /// Stable lowercase identifier, also the serde representation.
    pub fn id(self) -> &'static str {
        match self {
            Trigram::Heaven => "heaven",
            Trigram::Earth => "earth",
            Trigram::Thunder => "thunder",
            Trigram::Water => "water",
            Trigram::Mountain => "mountain",
            Trigram::Wind => "wind",
            Trigram::Fire => "fire",
            Trigram::Lake => "lake",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Trigram::Heaven => "Heaven",
            Trigram::Earth => "Earth",
            Trigram::Thunder => "Thunder",
            Trigram::Water => "Water",
            Trigram::Mountain => "Mountain",
            Trigram::Wind => "Wind",
            Trigram::Fire => "Fire",
            Trigram::Lake => "Lake",
        }
    }

    pub fn chinese(self) -> &'static str {
        match self {
            Trigram::Heaven => "干 | qián",
            Trigram::Earth => "坤 | kūn",
            Trigram::Thunder => "震 | zhèn",
            Trigram::Water => "坎 | kǎn",
            Trigram::Mountain => "艮 | gèn",
            Trigram::Wind => "巽 | xùn",
            Trigram::Fire => "离 | lí",
            Trigram::Lake => "兑 | duì",
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Trigram::Heaven => '☰',
            Trigram::Lake => '☱',
            Trigram::Fire => '☲',
            Trigram::Thunder => '☳',
            Trigram::Wind => '☴',
            Trigram::Water => '☵',
            Trigram::Mountain => '☶',
            Trigram::Earth => '☷',
        }
    }

    /// The figure's lines from top to bottom, `true` for a solid (yang) line.
    pub fn lines(self) -> [bool; 3] {
        match self {
            Trigram::Heaven => [true, true, true],
            Trigram::Lake => [false, true, true],
            Trigram::Fire => [true, false, true],
            Trigram::Thunder => [false, false, true],
            Trigram::Wind => [true, true, false],
            Trigram::Water => [false, true, false],
            Trigram::Mountain => [true, false, false],
            Trigram::Earth => [false, false, false],
        }
    }

    pub fn attributes(self) -> &'static [&'static str] {
        match self {
            Trigram::Heaven => &[
                "Creative",
                "Strong",
                "Active",
                "Light-giving",
                "Warming",
                "Summer",
            ],
            Trigram::Earth => &[
                "Receptive",
                "Yielding",
                "Nurturing",
                "Devoted",
                "Resting",
                "Winter",
            ],
            Trigram::Thunder => &[
                "Arousing",
                "Movement",
                "Initiative",
                "Eldest Son",
                "Storming",
                "Winter",
            ],
            Trigram::Water => &[
                "Abysmal",
                "Dangerous",
                "Flowing",
                "Middle Son",
                "Pooling",
                "Autumn",
            ],
            Trigram::Mountain => &[
                "Keeping Still",
                "Meditation",
                "Youngest Son",
                "Stillness",
                "Jutting",
                "Autumn",
            ],
            Trigram::Wind => &[
                "Gentle",
                "Penetrating",
                "Eldest Daughter",
                "Wood",
                "Dispersing",
                "Summer",
            ],
            Trigram::Fire => &[
                "Clinging",
                "Light",
                "Middle Daughter",
                "Brightness",
                "Dancing",
                "Spring",
            ],
            Trigram::Lake => &[
                "Joyous",
                "Youngest Daughter",
                "Pleasure",
                "Marsh",
                "Engulfing",
                "Spring",
            ],
        }
    }

    /// Resolve a corpus trigram field.
    ///
    /// The romanized first word wins (`"K'an"`, `"Kên"`, ...); otherwise the first English
    /// element name found anywhere in the text is used.
    pub fn from_description(text: &str) -> Option<Trigram> {
        let first_word: String = text
            .split_whitespace()
            .next()?
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        if let Some((_, trigram)) = ROMANIZED.iter().find(|(word, _)| *word == first_word) {
            return Some(*trigram);
        }
        let lower = text.to_lowercase();
        Trigram::ALL
            .into_iter()
            .find(|trigram| lower.contains(trigram.id()))
    }
}

impl fmt::Display for Trigram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Trigram {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Trigram::ALL
            .into_iter()
            .find(|trigram| trigram.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| OracleError::NotFound(format!("no trigram named '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn romanized_names_resolve() {
        assert_eq!(
            Trigram::from_description("CH'IEN THE CREATIVE, HEAVEN"),
            Some(Trigram::Heaven)
        );
        assert_eq!(Trigram::from_description("K'an the Abysmal"), Some(Trigram::Water));
        assert_eq!(Trigram::from_description("Kên Keeping Still"), Some(Trigram::Mountain));
        assert_eq!(Trigram::from_description("TUI THE JOYOUS, LAKE"), Some(Trigram::Lake));
    }

    #[test]
    fn english_keyword_fallback() {
        assert_eq!(Trigram::from_description("The gentle wind"), Some(Trigram::Wind));
        assert_eq!(Trigram::from_description("nothing recognisable"), None);
        assert_eq!(Trigram::from_description(""), None);
    }

    #[test]
    fn glyphs_and_lines_agree() {
        // The trigram block is ordered by binary value with the top line least significant and
        // a broken line counted as 1.
        for trigram in Trigram::ALL {
            let [top, middle, bottom] = trigram.lines();
            let value = (!top) as u32 | (((!middle) as u32) << 1) | (((!bottom) as u32) << 2);
            assert_eq!(trigram.glyph() as u32, 0x2630 + value, "{trigram}");
        }
    }

    #[test]
    fn parse_by_id() {
        assert_eq!("FIRE".parse::<Trigram>(), Ok(Trigram::Fire));
        assert!("smoke".parse::<Trigram>().is_err());
    }
}
