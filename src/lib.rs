//! # oracle-core
//!
//! The I Ching corpus behind The Oracle divination service: a parser that turns the
//! hand-authored Markdown corpus into structured hexagram records, and a cache that keeps those
//! records in memory and re-parses when the corpus file changes.
//!
//! ## Overview
//!
//! The corpus is one Markdown file with 64 sections. Each section holds a hexagram's title and
//! glyph, its two trigrams, a description, the judgment, the image and the changing-line
//! commentary. Route handlers render listing and detail pages from the parsed records, and the
//! reading generator injects their text into prompts.
//!
//! ## Architecture
//!
//! - **[`codec`]**: `parse_all` over the full corpus text; per-section failures become
//!   [`codec::ParseDiagnostic`]s instead of aborting the parse
//! - **[`hexagram`]**: `HexagramRecord` and `HexagramLine`, the parsed data model
//! - **[`source`]**: the `CorpusSource` capability (text + comparable version marker), backed by
//!   a file or by compiled-in text
//! - **[`cache`]**: `CorpusCache`, lazily loaded, staleness-checked on every read, snapshot
//!   swapped atomically on reload
//! - **[`casting`]**: coin casting and the line-pattern lookup table
//! - **[`links`]**: hexagram mentions in generated text, URL slugs
//! - **[`trigram`]**: the eight trigrams
//! - **[`config`]**: TOML configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oracle_core::{cache::CorpusCache, source::FileSource};
//!
//! let cache = CorpusCache::from_source(FileSource::new("I-Ching-texts.md"));
//! cache.prime();
//!
//! if let Some(hexagram) = cache.get_hexagram(20) {
//!     println!("{} {}", hexagram.symbol_glyph, hexagram.label());
//!     for (position, line) in hexagram.lines.iter().enumerate() {
//!         println!("line {}: {}", position + 1, line.quotation);
//!     }
//! }
//!
//! // Cheap projection for navigation menus.
//! for (number, glyph) in cache.get_symbol_map() {
//!     print!("{number}{glyph} ");
//! }
//! ```
//!
//! The cache is an ordinary value: construct it at start-up and share it (usually behind an
//! `Arc`) with whatever handles requests.
//!
//! ## Features
//!
//! - **default**: the library
//! - **bin**: the `oracle` command-line tool

pub mod cache;
pub mod casting;
pub mod codec;
pub mod config;
pub mod error;
pub mod hexagram;
pub mod links;
pub mod source;
#[cfg(test)]
mod tests;
pub mod trigram;

pub use error::*;
