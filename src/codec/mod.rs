//! Corpus parsing.
//!
//! The corpus is a single Markdown document holding the 64 hexagram sections. Each section opens
//! with a level-two header carrying the ordinal, the title and the hexagram glyph:
//!
//! ```text
//! ## 20. Kuan / Contemplation (View) ䷓
//! ```
//!
//! [`parse_all`] finds every header in one forward scan, slices the text between consecutive
//! headers into sections, and hands each section to the line-walking section parser
//! ([`section`]). Sections that fail are reported through [`ParseDiagnostic`] and skipped; they
//! never abort the parse. Any `## <ordinal>.` line ends the previous section, so a header with
//! a missing glyph or title only costs its own section.
//!
//! ```rust
//! use oracle_core::codec::parse_all;
//!
//! let corpus = [
//!     "## 1. Test Name ䷀",
//!     "> above X",
//!     "> below Y",
//!     "",
//!     "desc text",
//!     "### THE JUDGMENT",
//!     "> quoted judgment",
//!     "gloss text",
//!     "### THE IMAGE",
//!     "> quoted image",
//!     "image gloss",
//!     "#### THE LINES",
//!     "> first line",
//!     "first gloss",
//! ]
//! .join("\n");
//! let parsed = parse_all(&corpus);
//! let record = &parsed.records[&1];
//! assert_eq!(record.symbol_glyph, '䷀');
//! assert_eq!(record.judgment.quotation, "quoted judgment");
//! assert_eq!(record.lines.len(), 1);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{btree_map::Entry, BTreeMap};

use crate::hexagram::{glyph_for, is_hexagram_glyph, HexagramRecord, HEXAGRAM_COUNT};

pub mod diagnostic;
pub mod section;

pub use diagnostic::{Marker, ParseDiagnostic, SectionError};

use section::{parse_section, SectionHeader};

/// Any `## <ordinal>.` line starts a new section, whether or not the rest of the header is
/// well formed.
static BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^##[ \t]+([0-9]+)\.[^\n]*").expect("static regex"));

/// `## <ordinal>. <title> <glyph>`, applied to one boundary line.
static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^##[ \t]+([0-9]+)\.[ \t]+(.+?)[ \t]+([\x{4DC0}-\x{4DFF}])[ \t\r]*$")
        .expect("static regex")
});

/// The result of parsing a whole corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorpusParse {
    pub records: BTreeMap<u8, HexagramRecord>,
    pub diagnostics: Vec<ParseDiagnostic>,
    /// Number of section headers found, including skipped and replaced sections.
    pub sections_found: usize,
}

impl CorpusParse {
    pub fn skipped(&self) -> impl Iterator<Item = &ParseDiagnostic> {
        self.diagnostics.iter().filter(|diagnostic| diagnostic.is_skip())
    }

    /// Whether the corpus produced exactly the hexagrams 1..=64.
    pub fn is_complete(&self) -> bool {
        self.records.len() == HEXAGRAM_COUNT as usize
            && self.records.keys().copied().eq(1..=HEXAGRAM_COUNT)
    }
}

/// One section boundary plus where its section ends.
struct HeaderSpan<'t> {
    ordinal: &'t str,
    /// The whole header line, without its line break.
    header: &'t str,
    start: usize,
    end: usize,
    line: usize,
}

fn header_spans(text: &str) -> Vec<HeaderSpan<'_>> {
    let mut spans: Vec<HeaderSpan<'_>> = Vec::new();
    let mut line = 1;
    let mut counted_to = 0;
    for caps in BOUNDARY.captures_iter(text) {
        let (Some(whole), Some(ordinal)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let start = whole.start();
        line += text[counted_to..start].matches('\n').count();
        counted_to = start;
        if let Some(previous) = spans.last_mut() {
            previous.end = start;
        }
        spans.push(HeaderSpan {
            ordinal: ordinal.as_str(),
            header: whole.as_str(),
            start,
            end: text.len(),
            line,
        });
    }
    spans
}

/// Best-effort title of a header the full pattern rejected, for diagnostics.
fn loose_title<'t>(span: &HeaderSpan<'t>) -> &'t str {
    span.header
        .split_once('.')
        .map(|(_, rest)| rest.trim())
        .unwrap_or_default()
}

/// Parse the section under `span`. Failures carry the header's ordinal and title so the skip
/// can be reported against the header.
fn parse_span(
    text: &str,
    span: &HeaderSpan<'_>,
) -> Result<HexagramRecord, (String, String, SectionError)> {
    let ordinal = span.ordinal;
    let fail = |title: &str, error: SectionError| (ordinal.to_string(), title.to_string(), error);

    let Some(caps) = HEADER.captures(span.header) else {
        let title = loose_title(span);
        let error = if title.chars().last().is_some_and(is_hexagram_glyph) {
            SectionError::MalformedHeader
        } else {
            SectionError::MissingGlyph
        };
        return Err(fail(title, error));
    };
    let title = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
    let glyph = caps
        .get(3)
        .and_then(|m| m.as_str().chars().next())
        .unwrap_or_default();

    let number = ordinal
        .parse::<u8>()
        .ok()
        .filter(|number| (1..=HEXAGRAM_COUNT).contains(number))
        .ok_or_else(|| fail(title, SectionError::OrdinalOutOfRange(ordinal.to_string())))?;

    let raw_section = text[span.start..span.end].trim_end();
    parse_section(
        SectionHeader {
            number,
            title,
            glyph,
        },
        raw_section,
    )
    .map_err(|error| fail(title, error))
}

/// Parse every hexagram section in `text`.
///
/// Pure function of its input. Sections are processed in document order; when two sections
/// carry the same number the later one wins and a [`ParseDiagnostic::DuplicateNumber`] is
/// recorded.
#[tracing::instrument(skip_all, fields(bytes = text.len()))]
pub fn parse_all(text: &str) -> CorpusParse {
    let spans = header_spans(text);
    let mut parsed = CorpusParse {
        sections_found: spans.len(),
        ..Default::default()
    };

    for span in spans.iter() {
        match parse_span(text, span) {
            Ok(record) => {
                if let Some(expected) = glyph_for(record.number) {
                    if expected != record.symbol_glyph {
                        parsed.diagnostics.push(ParseDiagnostic::GlyphMismatch {
                            number: record.number,
                            glyph: record.symbol_glyph,
                            expected,
                            line: span.line,
                        });
                    }
                }
                match parsed.records.entry(record.number) {
                    Entry::Occupied(mut entry) => {
                        let replaced = entry.insert(record);
                        let current = entry.get();
                        tracing::warn!(
                            "hexagram {} defined twice; '{}' at line {} replaces '{}'",
                            current.number,
                            current.title,
                            span.line,
                            replaced.title
                        );
                        parsed.diagnostics.push(ParseDiagnostic::DuplicateNumber {
                            number: current.number,
                            title: current.title.clone(),
                            replaced_title: replaced.title,
                            line: span.line,
                        });
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(record);
                    }
                }
            }
            Err((ordinal, title, error)) => {
                tracing::warn!(
                    "skipping hexagram section {ordinal}. {title} (line {}): {error}",
                    span.line
                );
                parsed.diagnostics.push(ParseDiagnostic::SectionSkipped {
                    ordinal,
                    title,
                    line: span.line,
                    error,
                });
            }
        }
    }

    tracing::debug!(
        "parsed {} of {} hexagram sections",
        parsed.records.len(),
        parsed.sections_found
    );
    parsed
}

/// Parse only the section for `number`.
///
/// Returns None when no header carries that number. When several do, the last one is used.
pub fn parse_hexagram(text: &str, number: u8) -> Option<Result<HexagramRecord, SectionError>> {
    let spans = header_spans(text);
    let span = spans
        .iter()
        .rev()
        .find(|span| span.ordinal.parse::<u8>().ok() == Some(number))?;
    Some(parse_span(text, span).map_err(|(_, _, error)| error))
}
