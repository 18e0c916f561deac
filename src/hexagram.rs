//! Structured hexagram records produced by the corpus codec.
//!
//! A [`HexagramRecord`] is immutable once built. The cache hands records out behind an `Arc`, so
//! route handlers and the reading generator share one allocation per hexagram per load cycle.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::trigram::Trigram;

/// First codepoint of the Yijing hexagram symbols block (䷀, hexagram 1 in King Wen order).
pub const GLYPH_FIRST: char = '\u{4DC0}';
/// Last codepoint of the block (䷿, hexagram 64).
pub const GLYPH_LAST: char = '\u{4DFF}';

/// Hexagrams are numbered 1..=64 in the received sequence.
pub const HEXAGRAM_COUNT: u8 = 64;

/// Whether `number` names one of the 64 hexagrams.
pub fn is_valid_number(number: i64) -> bool {
    (1..=HEXAGRAM_COUNT as i64).contains(&number)
}

/// Whether `c` lies in the hexagram symbol block.
pub fn is_hexagram_glyph(c: char) -> bool {
    (GLYPH_FIRST..=GLYPH_LAST).contains(&c)
}

/// The glyph the Unicode block assigns to `number`, or None outside 1..=64.
///
/// The block is laid out in King Wen order, so this is the glyph a well-formed corpus header
/// carries for that number.
pub fn glyph_for(number: u8) -> Option<char> {
    if number == 0 || number > HEXAGRAM_COUNT {
        return None;
    }
    char::from_u32(GLYPH_FIRST as u32 + (number as u32 - 1))
}

/// A quotation from the classical text paired with its commentary.
///
/// Used for the judgment, the image, and each changing-line entry of a hexagram.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexagramLine {
    /// Quoted lines of the classic text, cleaned of quotation markers and newline-joined in
    /// source order.
    pub quotation: String,
    /// Commentary lines, newline-joined in source order.
    pub gloss: String,
}

impl HexagramLine {
    pub fn new(quotation: impl Into<String>, gloss: impl Into<String>) -> Self {
        HexagramLine {
            quotation: quotation.into(),
            gloss: gloss.into(),
        }
    }

    pub fn quotation_lines(&self) -> impl Iterator<Item = &str> {
        self.quotation.lines()
    }

    pub fn is_empty(&self) -> bool {
        self.quotation.is_empty() && self.gloss.is_empty()
    }
}

impl fmt::Display for HexagramLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ">> {}\n{}", self.quotation, self.gloss)
    }
}

/// The structured form of one hexagram section of the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexagramRecord {
    pub number: u8,
    /// Usually `"<Romanized name> / <English name>"`, sometimes with a parenthetical alternate.
    pub title: String,
    pub symbol_glyph: char,
    pub trigram_above: String,
    pub trigram_below: String,
    pub description: String,
    pub judgment: HexagramLine,
    pub image: HexagramLine,
    /// Changing-line commentary, bottom line first, exactly as ordered in the source.
    pub lines: Vec<HexagramLine>,
    /// The source text this record was derived from.
    pub raw_section: String,
}

impl HexagramRecord {
    /// `"{number} {title}"`, the form stored in reading history.
    pub fn label(&self) -> String {
        format!("{} {}", self.number, self.title)
    }

    /// The English half of the title (after the `/`), or the whole title when there is none.
    pub fn english_name(&self) -> &str {
        english_name(&self.title)
    }

    pub fn url_name(&self) -> String {
        url_name(&self.title)
    }

    /// Resolve the free-text trigram fields to the eight canonical trigrams.
    pub fn trigrams(&self) -> (Option<Trigram>, Option<Trigram>) {
        (
            Trigram::from_description(&self.trigram_above),
            Trigram::from_description(&self.trigram_below),
        )
    }
}

impl fmt::Display for HexagramRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}\n{}\n{}\n{}",
            self.number, self.title, self.trigram_above, self.trigram_below, self.description
        )
    }
}

fn english_name(title: &str) -> &str {
    match title.split_once('/') {
        Some((_, english)) => english.trim(),
        None => title.trim(),
    }
}

static PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\[(][^\])]*[\])]").expect("static regex"));
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("static regex"));

/// URL-friendly name derived from a hexagram title.
///
/// `"Ch'ien / The Creative"` becomes `"the_creative"`, `"Kuan / Contemplation (View)"` becomes
/// `"contemplation"`.
pub fn url_name(title: &str) -> String {
    let english = english_name(title);
    let without_alternates = PARENTHETICAL.replace_all(english, "");
    NON_WORD
        .replace_all(without_alternates.trim(), "_")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyphs_follow_the_unicode_block() {
        assert_eq!(glyph_for(1), Some('䷀'));
        assert_eq!(glyph_for(2), Some('䷁'));
        assert_eq!(glyph_for(64), Some('䷿'));
        assert_eq!(glyph_for(0), None);
        assert_eq!(glyph_for(65), None);
        assert!((1..=64).filter_map(glyph_for).all(is_hexagram_glyph));
        assert!(!is_hexagram_glyph('☰'));
    }

    #[test]
    fn url_names_drop_romanization_and_alternates() {
        assert_eq!(url_name("Ch'ien / The Creative"), "the_creative");
        assert_eq!(url_name("Kuan / Contemplation (View)"), "contemplation");
        assert_eq!(url_name("Creative"), "creative");
        assert_eq!(
            url_name("Ku / Work on What Has Been Spoiled [Decay]"),
            "work_on_what_has_been_spoiled"
        );
    }

    #[test]
    fn number_range() {
        assert!(is_valid_number(1));
        assert!(is_valid_number(64));
        assert!(!is_valid_number(0));
        assert!(!is_valid_number(65));
        assert!(!is_valid_number(-3));
    }
}
