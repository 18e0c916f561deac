//! Memory-resident corpus with opportunistic staleness detection.
//!
//! [`CorpusCache`] loads the whole corpus once and answers every lookup from an immutable
//! [`Snapshot`]. Each public read first compares the source's version marker with the one the
//! snapshot was built from; a mismatch (or an [`invalidate`](CorpusCache::invalidate)) triggers a
//! full re-parse before the read is answered. There is no background thread.
//!
//! ## Concurrency
//!
//! - Readers clone an `Arc<Snapshot>` out of a read lock and never observe a half-built map. A
//!   reload builds the replacement snapshot off to the side and publishes it with one pointer
//!   swap.
//! - Reloads are serialized by `reload_lock`. A reader that observes staleness while another
//!   reload is running does not wait: it serves the previous snapshot and checks again on its
//!   next call. Only when there is no snapshot at all (first load) do readers queue behind the
//!   in-flight load.
//! - A failed reload keeps the previous snapshot. A version whose text parsed to zero records is
//!   remembered and not re-parsed until the version changes or the cache is invalidated.
//!
//! ```rust
//! use oracle_core::{cache::CorpusCache, source::EmbeddedSource};
//!
//! let corpus = [
//!     "## 2. K'un / The Receptive ䷁",
//!     "> above K'UN THE RECEPTIVE, EARTH",
//!     "> below K'UN THE RECEPTIVE, EARTH",
//!     "",
//!     "This hexagram is made up of broken lines only.",
//!     "### THE JUDGMENT",
//!     "> THE RECEPTIVE brings about sublime success.",
//!     "The Receptive is the counterpart of the Creative.",
//!     "### THE IMAGE",
//!     "> The earth's condition is receptive devotion.",
//!     "The earth in its devotion carries all things.",
//!     "#### THE LINES",
//! ]
//! .join("\n");
//! let cache = CorpusCache::from_source(EmbeddedSource::with_build_id(corpus, "doc"));
//!
//! let receptive = cache.get_hexagram(2).expect("hexagram 2 is in the corpus");
//! assert_eq!(receptive.label(), "2 K'un / The Receptive");
//! assert!(cache.get_hexagram(65).is_none());
//! assert_eq!(cache.get_symbol_map().get(&2), Some(&'䷁'));
//! ```

use parking_lot::{Mutex, MutexGuard, RwLock};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, SystemTime},
};

use crate::{
    codec::{parse_all, CorpusParse, ParseDiagnostic},
    error::OracleError,
    hexagram::{is_valid_number, HexagramRecord},
    source::{CorpusSource, SourceVersion},
};

/// One fully parsed corpus, never mutated after publication.
#[derive(Debug, Clone)]
pub struct Snapshot {
    records: BTreeMap<u8, Arc<HexagramRecord>>,
    symbols: BTreeMap<u8, char>,
    version: SourceVersion,
    loaded_at: SystemTime,
    diagnostics: Vec<ParseDiagnostic>,
}

impl Snapshot {
    fn new(parsed: CorpusParse, version: SourceVersion) -> Snapshot {
        let records: BTreeMap<u8, Arc<HexagramRecord>> = parsed
            .records
            .into_iter()
            .map(|(number, record)| (number, Arc::new(record)))
            .collect();
        let symbols = records
            .iter()
            .map(|(number, record)| (*number, record.symbol_glyph))
            .collect();
        Snapshot {
            records,
            symbols,
            version,
            loaded_at: SystemTime::now(),
            diagnostics: parsed.diagnostics,
        }
    }

    pub fn get(&self, number: i64) -> Option<Arc<HexagramRecord>> {
        let number = u8::try_from(number).ok()?;
        self.records.get(&number).cloned()
    }

    pub fn records(&self) -> &BTreeMap<u8, Arc<HexagramRecord>> {
        &self.records
    }

    pub fn symbols(&self) -> &BTreeMap<u8, char> {
        &self.symbols
    }

    pub fn version(&self) -> &SourceVersion {
        &self.version
    }

    pub fn loaded_at(&self) -> SystemTime {
        self.loaded_at
    }

    /// Diagnostics from the parse that produced this snapshot.
    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CacheState {
    /// No snapshot has been published yet.
    Empty,
    /// A load or reload is running.
    Loading,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub state: CacheState,
    pub hexagrams_loaded: usize,
    pub last_loaded: Option<SystemTime>,
    pub cache_age: Option<Duration>,
    pub source_version: Option<SourceVersion>,
    /// Number of times the corpus text has been parsed.
    pub parse_count: u64,
    pub failed_reloads: u64,
    /// Sections skipped by the parse behind the current snapshot.
    pub skipped_sections: usize,
}

pub struct CorpusCache {
    source: Arc<dyn CorpusSource>,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    reload_lock: Mutex<()>,
    invalidated: AtomicBool,
    /// Version whose text produced no records.
    rejected: RwLock<Option<SourceVersion>>,
    parse_count: AtomicU64,
    failed_reloads: AtomicU64,
}

impl fmt::Debug for CorpusCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorpusCache")
            .field("source", &self.source.describe())
            .field("state", &self.state())
            .field("parse_count", &self.parse_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl CorpusCache {
    /// An empty cache. Nothing is read until the first lookup or [`prime`](Self::prime).
    pub fn new(source: Arc<dyn CorpusSource>) -> Self {
        CorpusCache {
            source,
            snapshot: RwLock::new(None),
            reload_lock: Mutex::new(()),
            invalidated: AtomicBool::new(false),
            rejected: RwLock::new(None),
            parse_count: AtomicU64::new(0),
            failed_reloads: AtomicU64::new(0),
        }
    }

    pub fn from_source<S: CorpusSource + 'static>(source: S) -> Self {
        CorpusCache::new(Arc::new(source))
    }

    pub fn source(&self) -> &Arc<dyn CorpusSource> {
        &self.source
    }

    /// Look up one hexagram. Numbers outside 1..=64 return None without touching the source.
    pub fn get_hexagram(&self, number: i64) -> Option<Arc<HexagramRecord>> {
        if !is_valid_number(number) {
            return None;
        }
        self.current()?.get(number)
    }

    /// Every record of the current snapshot. The map is a copy; the records themselves are
    /// immutable.
    pub fn get_all_hexagrams(&self) -> BTreeMap<u8, Arc<HexagramRecord>> {
        self.current()
            .map(|snapshot| snapshot.records.clone())
            .unwrap_or_default()
    }

    /// Number to glyph for every record of the current snapshot.
    pub fn get_symbol_map(&self) -> BTreeMap<u8, char> {
        self.current()
            .map(|snapshot| snapshot.symbols.clone())
            .unwrap_or_default()
    }

    /// The current snapshot after a staleness check, or None if nothing could ever be loaded.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current()
    }

    /// Force the next read to reload, whatever the version marker says.
    pub fn invalidate(&self) {
        tracing::debug!("invalidating corpus cache for {}", self.source.describe());
        *self.rejected.write() = None;
        self.invalidated.store(true, Ordering::SeqCst);
    }

    /// Load eagerly, typically at start-up. Returns whether any hexagram data is available.
    pub fn prime(&self) -> bool {
        match self.current() {
            Some(snapshot) => {
                tracing::info!(
                    "hexagram corpus ready: {} records from {}",
                    snapshot.len(),
                    self.source.describe()
                );
                true
            }
            None => {
                tracing::warn!(
                    "no hexagram data could be loaded from {}; hexagram lookups will be empty",
                    self.source.describe()
                );
                false
            }
        }
    }

    /// Reload now, waiting for any reload already running, and report the outcome.
    ///
    /// Meant for operational tooling. On failure the previous snapshot stays published.
    pub fn reload(&self) -> Result<Arc<Snapshot>, OracleError> {
        let _guard = self.reload_lock.lock();
        self.load()
    }

    pub fn state(&self) -> CacheState {
        if self.reload_lock.is_locked() {
            CacheState::Loading
        } else if self.snapshot.read().is_some() {
            CacheState::Ready
        } else {
            CacheState::Empty
        }
    }

    /// Counters and snapshot metadata. Does not check staleness.
    pub fn stats(&self) -> CacheStats {
        let published = self.published();
        CacheStats {
            state: self.state(),
            hexagrams_loaded: published.as_ref().map(|s| s.len()).unwrap_or_default(),
            last_loaded: published.as_ref().map(|s| s.loaded_at),
            cache_age: published
                .as_ref()
                .and_then(|s| SystemTime::now().duration_since(s.loaded_at).ok()),
            source_version: published.as_ref().map(|s| s.version.clone()),
            parse_count: self.parse_count.load(Ordering::Relaxed),
            failed_reloads: self.failed_reloads.load(Ordering::Relaxed),
            skipped_sections: published
                .as_ref()
                .map(|s| s.diagnostics.iter().filter(|d| d.is_skip()).count())
                .unwrap_or_default(),
        }
    }

    fn published(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().clone()
    }

    fn needs_reload(&self, published: Option<&Snapshot>) -> bool {
        if self.invalidated.load(Ordering::SeqCst) {
            return true;
        }
        let version = match self.source.version() {
            Ok(version) => version,
            Err(e) => {
                tracing::debug!("staleness check failed for {}: {e}", self.source.describe());
                return true;
            }
        };
        if self.rejected.read().as_ref() == Some(&version) {
            return false;
        }
        published.is_none_or(|snapshot| snapshot.version != version)
    }

    fn current(&self) -> Option<Arc<Snapshot>> {
        let published = self.published();
        if !self.needs_reload(published.as_deref()) {
            return published;
        }
        match self.reload_lock.try_lock() {
            Some(guard) => self.refresh(guard),
            None => match published {
                Some(snapshot) => {
                    tracing::trace!("reload already running; serving previous snapshot");
                    Some(snapshot)
                }
                None => {
                    let guard = self.reload_lock.lock();
                    self.refresh(guard)
                }
            },
        }
    }

    /// Reload under `_guard` unless another caller published a fresh snapshot while this one
    /// was acquiring the lock.
    fn refresh(&self, _guard: MutexGuard<'_, ()>) -> Option<Arc<Snapshot>> {
        let published = self.published();
        if !self.needs_reload(published.as_deref()) {
            return published;
        }
        match self.load() {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                match &published {
                    Some(previous) => tracing::warn!(
                        "reloading corpus from {} failed, keeping {} records ({}): {e}",
                        self.source.describe(),
                        previous.len(),
                        previous.version
                    ),
                    None => tracing::warn!(
                        "loading hexagram corpus from {} failed, no hexagram data available: {e}",
                        self.source.describe()
                    ),
                }
                published
            }
        }
    }

    /// Read, parse and publish. Callers hold `reload_lock`.
    #[tracing::instrument(skip_all)]
    fn load(&self) -> Result<Arc<Snapshot>, OracleError> {
        self.invalidated.store(false, Ordering::SeqCst);
        let outcome = self.read_and_parse();
        if outcome.is_err() {
            self.failed_reloads.fetch_add(1, Ordering::Relaxed);
        }
        outcome
    }

    fn read_and_parse(&self) -> Result<Arc<Snapshot>, OracleError> {
        // Version before text: if the source changes in between, the next read sees a newer
        // version and reloads again.
        let version = self.source.version()?;
        let text = self.source.read()?;
        self.parse_count.fetch_add(1, Ordering::Relaxed);
        let parsed = parse_all(&text);

        if parsed.records.is_empty() {
            *self.rejected.write() = Some(version.clone());
            return Err(OracleError::EmptyCorpus(format!(
                "{} ({version}): {} section headers, {} skipped",
                self.source.describe(),
                parsed.sections_found,
                parsed.skipped().count()
            )));
        }

        let snapshot = Arc::new(Snapshot::new(parsed, version));
        *self.snapshot.write() = Some(snapshot.clone());
        *self.rejected.write() = None;
        tracing::info!(
            "loaded {} hexagrams from {} ({})",
            snapshot.len(),
            self.source.describe(),
            snapshot.version
        );
        Ok(snapshot)
    }
}
