//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use oracle_core::{
    error::OracleError,
    hexagram::glyph_for,
    source::{CorpusSource, SourceVersion},
};
use parking_lot::Mutex;
use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; later calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// One well-formed section. `flavour` ends up in the description so tests can tell corpus
/// revisions apart.
#[allow(dead_code)]
pub fn section(number: u8, title: &str, flavour: &str) -> String {
    let glyph = glyph_for(number).unwrap_or('䷀');
    format!(
        "## {number}. {title} {glyph}\n\
         > above K'UN THE RECEPTIVE, EARTH\n\
         > below CH'IEN THE CREATIVE, HEAVEN\n\
         \n\
         {flavour} description of {number}.\n\
         \n\
         ### THE JUDGMENT\n\
         > Judgment of {number}.\n\
         Judgment gloss of {number}.\n\
         \n\
         ### THE IMAGE\n\
         > Image of {number}.\n\
         Image gloss of {number}.\n\
         \n\
         #### THE LINES\n\
         > Nine at the beginning means:\n\
         > First line of {number}.\n\
         First line gloss of {number}.\n\
         \n\
         > Six in the second place means:\n\
         > Second line of {number}.\n\
         Second line gloss of {number}.\n\
         \n"
    )
}

/// All 64 sections with generated titles.
#[allow(dead_code)]
pub fn full_corpus(flavour: &str) -> String {
    (1..=64u8)
        .map(|number| section(number, &format!("Name {number} / Title {number}"), flavour))
        .collect()
}

/// Write `content` to `I-Ching-texts.md` inside `temp_dir`.
#[allow(dead_code)]
pub fn write_corpus(temp_dir: &TempDir, content: &str) -> PathBuf {
    let path = temp_dir.path().join("I-Ching-texts.md");
    std::fs::write(&path, content).unwrap();
    path
}

/// In-memory source whose version and text the test controls, counting every read.
#[allow(dead_code)]
pub struct ScriptedSource {
    /// Version counter and text; no text means the source is unavailable.
    state: Mutex<(u64, Option<String>)>,
    reads: AtomicUsize,
    read_delay: Duration,
}

#[allow(dead_code)]
impl ScriptedSource {
    pub fn new(text: impl Into<String>) -> Arc<Self> {
        Self::with_read_delay(text, Duration::ZERO)
    }

    /// Every `read` sleeps for `read_delay` first, widening the window for concurrent callers.
    pub fn with_read_delay(text: impl Into<String>, read_delay: Duration) -> Arc<Self> {
        Arc::new(ScriptedSource {
            state: Mutex::new((1, Some(text.into()))),
            reads: AtomicUsize::new(0),
            read_delay,
        })
    }

    /// Replace the text and bump the version.
    pub fn publish(&self, text: impl Into<String>) {
        let mut state = self.state.lock();
        *state = (state.0 + 1, Some(text.into()));
    }

    /// Bump the version without changing the text.
    pub fn touch(&self) {
        self.state.lock().0 += 1;
    }

    /// Make the source unavailable.
    pub fn remove(&self) {
        self.state.lock().1 = None;
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

fn removed() -> OracleError {
    OracleError::SourceUnavailable("scripted source removed".to_string())
}

impl CorpusSource for ScriptedSource {
    fn version(&self) -> Result<SourceVersion, OracleError> {
        match &*self.state.lock() {
            (version, Some(_)) => Ok(SourceVersion::Build(version.to_string())),
            (_, None) => Err(removed()),
        }
    }

    fn read(&self) -> Result<String, OracleError> {
        if !self.read_delay.is_zero() {
            thread::sleep(self.read_delay);
        }
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.state.lock().1.clone().ok_or_else(removed)
    }

    fn describe(&self) -> String {
        "scripted corpus".to_string()
    }
}
