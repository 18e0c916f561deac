//! Hexagram references in free text and URL slugs.
//!
//! Generated readings mention hexagrams as `Hexagram 20` or `20: Kuan`. Route handlers turn
//! those mentions into links; this module finds them and resolves them through the cache, and
//! leaves markup and URLs to the caller's renderer.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ops::Range;

use crate::{cache::CorpusCache, hexagram::HexagramRecord};

static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[Hh]exagram ([0-9]+)|([0-9]+):\s*[A-Za-z']+").expect("static regex")
});

/// A hexagram mention found in text. The number is not range-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexagramReference {
    pub range: Range<usize>,
    pub number: u64,
}

fn reference_number(caps: &Captures<'_>) -> Option<u64> {
    caps.get(1)
        .or_else(|| caps.get(2))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// Every non-overlapping mention in `text`, in order.
pub fn find_references(text: &str) -> Vec<HexagramReference> {
    REFERENCE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(HexagramReference {
                range: whole.range(),
                number: reference_number(&caps)?,
            })
        })
        .collect()
}

/// Rewrite every mention whose number resolves through `cache` with `render(record, mention)`.
///
/// Mentions of numbers outside 1..=64, or of hexagrams missing from the cache, are left as
/// written.
pub fn link_references<F>(text: &str, cache: &CorpusCache, mut render: F) -> String
where
    F: FnMut(&HexagramRecord, &str) -> String,
{
    REFERENCE
        .replace_all(text, |caps: &Captures<'_>| {
            let mention = &caps[0];
            reference_number(caps)
                .and_then(|number| i64::try_from(number).ok())
                .and_then(|number| cache.get_hexagram(number))
                .map(|record| render(record.as_ref(), mention))
                .unwrap_or_else(|| mention.to_string())
        })
        .into_owned()
}

/// Resolve a `"<number>-<name>"` URL segment to the hexagram number and its canonical slug.
///
/// Any name is accepted; callers compare it with the canonical slug to decide whether to
/// redirect.
pub fn resolve_slug(cache: &CorpusCache, segment: &str) -> Option<(u8, String)> {
    let (number, _name) = segment.split_once('-')?;
    let record = cache.get_hexagram(number.trim().parse::<i64>().ok()?)?;
    Some((record.number, record.url_name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_both_mention_styles() {
        let text = "Hexagram 20 speaks of view; later 11: Peace follows, and hexagram 64 closes.";
        let found = find_references(text);
        let numbers: Vec<u64> = found.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![20, 11, 64]);
        assert_eq!(&text[found[0].range.clone()], "Hexagram 20");
        assert_eq!(&text[found[1].range.clone()], "11: Peace");
    }

    #[test]
    fn times_and_bare_numbers_are_not_mentions() {
        assert!(find_references("Meet at 12:30 with 3 friends.").is_empty());
    }
}
