//! Decomposition of one hexagram section into a [`HexagramRecord`].
//!
//! The section body is walked line by line. Each line is classified as blank, quotation (starts
//! with `>`) or prose, and the three subsection markers split the walk into four regions:
//!
//! ```text
//! ## 1. Ch'ien / The Creative ䷀        <- header, already captured by the corpus scan
//! > above CH'IEN THE CREATIVE, HEAVEN  <- trigram lines
//! > below CH'IEN THE CREATIVE, HEAVEN
//! The first hexagram is made up ...    <- description
//! ### THE JUDGMENT
//! > THE CREATIVE works sublime success <- quotation
//! The Creative causes ...              <- gloss
//! ### THE IMAGE
//! ...
//! #### THE LINES
//! > Nine at the beginning means:       <- one block per quotation run + prose run
//! > Hidden dragon. Do not act.
//! Here the dragon ...
//! ```

use crate::{
    codec::diagnostic::{Marker, SectionError},
    hexagram::{HexagramLine, HexagramRecord},
};

/// A source line after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceLine<'a> {
    Blank,
    /// Quotation text with its markers removed. May be empty for a bare `>` line.
    Quote(&'a str),
    Prose(&'a str),
}

impl<'a> SourceLine<'a> {
    fn classify(line: &'a str) -> SourceLine<'a> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            SourceLine::Blank
        } else if trimmed.starts_with('>') {
            SourceLine::Quote(clean_quotation(trimmed))
        } else {
            SourceLine::Prose(trimmed)
        }
    }
}

/// Strip quotation markers, heading hashes and surrounding whitespace.
pub(crate) fn clean_quotation(line: &str) -> &str {
    line.trim_matches(|c: char| c == '>' || c == '#' || c.is_whitespace())
}

/// The header fields captured by the corpus scan.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SectionHeader<'a> {
    pub number: u8,
    pub title: &'a str,
    pub glyph: char,
}

/// Line indices of the three markers within the section body.
#[derive(Debug, Clone, Copy)]
struct MarkerPositions {
    judgment: usize,
    image: usize,
    lines: usize,
}

impl MarkerPositions {
    fn locate(body: &[&str]) -> Result<MarkerPositions, SectionError> {
        let mut found: [Vec<usize>; 3] = Default::default();
        for (idx, line) in body.iter().enumerate() {
            if let Some(marker) = Marker::from_line(line) {
                found[marker as usize].push(idx);
            }
        }

        let mut positions = [0usize; 3];
        for marker in Marker::ALL {
            let hits = &found[marker as usize];
            match hits.len() {
                0 => return Err(SectionError::MissingMarker(marker)),
                1 => positions[marker as usize] = hits[0],
                count => return Err(SectionError::DuplicateMarker { marker, count }),
            }
        }

        let [judgment, image, lines] = positions;
        if image < judgment {
            return Err(SectionError::MarkerOutOfOrder {
                marker: Marker::Image,
                expected_after: Marker::Judgment,
            });
        }
        if lines < image {
            return Err(SectionError::MarkerOutOfOrder {
                marker: Marker::Lines,
                expected_after: Marker::Image,
            });
        }
        Ok(MarkerPositions {
            judgment,
            image,
            lines,
        })
    }
}

/// Build the record for one section. `raw_section` starts at the header line.
pub(crate) fn parse_section(
    header: SectionHeader<'_>,
    raw_section: &str,
) -> Result<HexagramRecord, SectionError> {
    let body: Vec<&str> = raw_section.lines().skip(1).collect();
    let markers = MarkerPositions::locate(&body)?;

    let about = parse_about(&body[..markers.judgment])?;
    let judgment = parse_quoted(&body[markers.judgment + 1..markers.image]);
    let image = parse_quoted(&body[markers.image + 1..markers.lines]);
    let lines = parse_line_blocks(&body[markers.lines + 1..]);

    Ok(HexagramRecord {
        number: header.number,
        title: header.title.to_string(),
        symbol_glyph: header.glyph,
        trigram_above: about.above.to_string(),
        trigram_below: about.below.to_string(),
        description: about.description,
        judgment,
        image,
        lines,
        raw_section: raw_section.to_string(),
    })
}

#[derive(Debug)]
struct About<'a> {
    above: &'a str,
    below: &'a str,
    description: String,
}

/// A `> above ...` / `> below ...` line; returns the trigram text after the keyword.
fn trigram_text<'a>(quote: &'a str, keyword: &str) -> Option<&'a str> {
    let head = quote.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &quote[keyword.len()..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

fn parse_about<'a>(pre_judgment: &[&'a str]) -> Result<About<'a>, SectionError> {
    let mut above = None;
    let mut below = None;
    for (idx, line) in pre_judgment.iter().enumerate() {
        if let SourceLine::Quote(quote) = SourceLine::classify(line) {
            if above.is_none() {
                above = trigram_text(quote, "above").map(|text| (idx, text));
            }
            if below.is_none() {
                below = trigram_text(quote, "below").map(|text| (idx, text));
            }
        }
    }
    let (above_idx, above) = above.ok_or(SectionError::MissingTrigram("above"))?;
    let (below_idx, below) = below.ok_or(SectionError::MissingTrigram("below"))?;

    let description = pre_judgment[above_idx.max(below_idx) + 1..]
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<&str>>()
        .join("\n");

    Ok(About {
        above,
        below,
        description,
    })
}

/// Prose lines of one gloss. A blank line between two prose lines is kept as one empty line so
/// paragraphs survive rendering.
#[derive(Debug, Default)]
struct Gloss<'a> {
    lines: Vec<&'a str>,
    paragraph_break: bool,
}

impl<'a> Gloss<'a> {
    fn push(&mut self, text: &'a str) {
        if self.paragraph_break && !self.lines.is_empty() {
            self.lines.push("");
        }
        self.paragraph_break = false;
        self.lines.push(text);
    }

    fn blank(&mut self) {
        self.paragraph_break = true;
    }

    fn take(&mut self) -> String {
        self.paragraph_break = false;
        std::mem::take(&mut self.lines).join("\n")
    }
}

/// Judgment and image subsections: quotation lines and prose lines, each kept in source order.
fn parse_quoted(region: &[&str]) -> HexagramLine {
    let mut quotation = Vec::new();
    let mut gloss = Gloss::default();
    for line in region {
        match SourceLine::classify(line) {
            SourceLine::Blank => gloss.blank(),
            SourceLine::Quote(text) if text.is_empty() => {}
            SourceLine::Quote(text) => quotation.push(text),
            SourceLine::Prose(text) => gloss.push(text),
        }
    }
    HexagramLine::new(quotation.join("\n"), gloss.take())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    /// Before the first quotation of the subsection.
    Idle,
    Quoting,
    Glossing,
}

/// Changing-line commentary: every run of quotation lines followed by a run of prose lines is
/// one entry. Blank lines never end a run.
fn parse_line_blocks(region: &[&str]) -> Vec<HexagramLine> {
    let mut blocks = Vec::new();
    let mut quotation: Vec<&str> = Vec::new();
    let mut gloss = Gloss::default();
    let mut state = BlockState::Idle;

    for line in region {
        match SourceLine::classify(line) {
            SourceLine::Blank => gloss.blank(),
            SourceLine::Quote(text) => {
                if state == BlockState::Glossing {
                    blocks.push(HexagramLine::new(quotation.join("\n"), gloss.take()));
                    quotation.clear();
                }
                if !text.is_empty() {
                    quotation.push(text);
                }
                state = BlockState::Quoting;
            }
            SourceLine::Prose(text) => match state {
                BlockState::Idle => {
                    tracing::debug!("ignoring line commentary before any quotation: {text:?}");
                }
                BlockState::Quoting | BlockState::Glossing => {
                    gloss.push(text);
                    state = BlockState::Glossing;
                }
            },
        }
    }

    match state {
        BlockState::Glossing => {
            blocks.push(HexagramLine::new(quotation.join("\n"), gloss.take()));
        }
        BlockState::Quoting => {
            tracing::debug!(
                "dropping trailing quotation without commentary: {:?}",
                quotation.join(" / ")
            );
        }
        BlockState::Idle => {}
    }
    blocks
}
