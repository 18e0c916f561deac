//! Diagnostic types for corpus parsing.
//!
//! A malformed hexagram section never aborts a parse. The codec records why the section was
//! skipped and carries on with the next header, so a half-edited corpus still serves every
//! hexagram that is intact.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The fixed subsection headings every hexagram section must contain, in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Marker {
    Judgment,
    Image,
    Lines,
}

impl Marker {
    pub const ALL: [Marker; 3] = [Marker::Judgment, Marker::Image, Marker::Lines];

    /// The heading line as written in the corpus.
    pub fn literal(self) -> &'static str {
        match self {
            Marker::Judgment => "### THE JUDGMENT",
            Marker::Image => "### THE IMAGE",
            Marker::Lines => "#### THE LINES",
        }
    }

    /// The heading text without its `#` prefix.
    pub fn keyword(self) -> &'static str {
        self.literal().trim_start_matches('#').trim_start()
    }

    /// Match a source line against the marker headings.
    ///
    /// The line must be a heading (one or more `#`). The heading level, runs of whitespace and
    /// anything after the keyword (`### THE IMAGE:`) are ignored; the keyword itself is
    /// case-sensitive and must end at a word boundary.
    pub fn from_line(line: &str) -> Option<Marker> {
        let heading = line.trim().strip_prefix('#')?.trim_start_matches('#');
        let words = heading.split_whitespace().collect::<Vec<&str>>().join(" ");
        Marker::ALL.into_iter().find(|marker| {
            words
                .strip_prefix(marker.keyword())
                .is_some_and(|rest| !rest.starts_with(char::is_alphanumeric))
        })
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal())
    }
}

/// Why a single hexagram section could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
pub enum SectionError {
    #[error("section has no '{0}' marker")]
    MissingMarker(Marker),
    #[error("section has {count} '{marker}' markers, expected exactly one")]
    DuplicateMarker { marker: Marker, count: usize },
    #[error("'{marker}' marker appears before '{expected_after}'")]
    MarkerOutOfOrder {
        marker: Marker,
        expected_after: Marker,
    },
    #[error("section has no '> {0} ...' trigram line")]
    MissingTrigram(&'static str),
    #[error("header ordinal '{0}' is not a hexagram number (1-64)")]
    OrdinalOutOfRange(String),
    #[error("header does not end with a hexagram glyph (U+4DC0-U+4DFF)")]
    MissingGlyph,
    #[error("header is not '## <number>. <title> <glyph>'")]
    MalformedHeader,
}

/// Something the codec noticed while parsing a corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParseDiagnostic {
    /// The section was not turned into a record.
    SectionSkipped {
        ordinal: String,
        title: String,
        /// 1-based line of the section header in the corpus text.
        line: usize,
        error: SectionError,
    },
    /// A later section reused a number; the later record replaced the earlier one.
    DuplicateNumber {
        number: u8,
        title: String,
        replaced_title: String,
        line: usize,
    },
    /// The header glyph is not the one the Unicode block assigns to the header number.
    /// The record keeps the glyph from the header.
    GlyphMismatch {
        number: u8,
        glyph: char,
        expected: char,
        line: usize,
    },
}

impl ParseDiagnostic {
    pub fn is_skip(&self) -> bool {
        matches!(self, ParseDiagnostic::SectionSkipped { .. })
    }

    pub fn line(&self) -> usize {
        match self {
            ParseDiagnostic::SectionSkipped { line, .. }
            | ParseDiagnostic::DuplicateNumber { line, .. }
            | ParseDiagnostic::GlyphMismatch { line, .. } => *line,
        }
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseDiagnostic::SectionSkipped {
                ordinal,
                title,
                line,
                error,
            } => write!(f, "line {line}: skipped {ordinal}. {title}: {error}"),
            ParseDiagnostic::DuplicateNumber {
                number,
                title,
                replaced_title,
                line,
            } => write!(
                f,
                "line {line}: {number}. {title} replaces earlier section '{replaced_title}'"
            ),
            ParseDiagnostic::GlyphMismatch {
                number,
                glyph,
                expected,
                line,
            } => write!(
                f,
                "line {line}: hexagram {number} carries glyph {glyph}, expected {expected}"
            ),
        }
    }
}
