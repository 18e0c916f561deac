//! Shared test utilities for corpus parsing tests

use crate::{codec::Marker, hexagram::glyph_for};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Builds one synthetic hexagram section in the corpus layout.
#[derive(Debug, Clone)]
pub struct SectionBuilder {
    pub number: u8,
    pub title: String,
    pub glyph: char,
    pub omit: Option<Marker>,
    pub line_blocks: usize,
}

impl SectionBuilder {
    pub fn new(number: u8) -> Self {
        SectionBuilder {
            number,
            title: format!("Name{number} / English {number}"),
            glyph: glyph_for(number).unwrap_or('䷀'),
            omit: None,
            line_blocks: 6,
        }
    }

    pub fn without(mut self, marker: Marker) -> Self {
        self.omit = Some(marker);
        self
    }

    pub fn with_glyph(mut self, glyph: char) -> Self {
        self.glyph = glyph;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_line_blocks(mut self, count: usize) -> Self {
        self.line_blocks = count;
        self
    }

    fn marker(&self, marker: Marker) -> String {
        if self.omit == Some(marker) {
            String::new()
        } else {
            format!("{}\n\n", marker.literal())
        }
    }

    pub fn build(&self) -> String {
        let n = self.number;
        let mut text = format!("## {n}. {} {}\n\n", self.title, self.glyph);
        text += &format!("> above Above{n}\n> below Below{n}\n\n");
        text += &format!("Description of hexagram {n}.\n\n");
        text += &self.marker(Marker::Judgment);
        text += &format!("> Judgment quotation {n}.\n>  Second judgment quotation {n}.\n\n");
        text += &format!("Judgment gloss {n}.\n\n");
        text += &self.marker(Marker::Image);
        text += &format!("   > Image quotation {n}.\n\nImage gloss {n}.\n\n");
        text += &self.marker(Marker::Lines);
        for line in 1..=self.line_blocks {
            text += &format!(
                ">\n> **Line {line} of {n} means:**\n> Quote for line {line} of {n}.\n\n"
            );
            text += &format!("Gloss for line {line} of {n}.\n\n");
        }
        text
    }
}

/// Concatenate well-formed sections for `numbers`, in the given order.
pub fn corpus<I: IntoIterator<Item = u8>>(numbers: I) -> String {
    numbers
        .into_iter()
        .map(|number| SectionBuilder::new(number).build())
        .collect()
}

/// A well-formed corpus holding all 64 hexagrams, preceded by a preamble.
pub fn full_corpus() -> String {
    format!("# The I Ching\n\nPreamble text.\n\n{}", corpus(1..=64))
}
