use serde::{Deserialize, Serialize};
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use crate::{cache::CorpusCache, error::OracleError, source::FileSource};

pub const DEFAULT_CORPUS_PATH: &str = "I-Ching-texts.md";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub path: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        CorpusConfig {
            path: PathBuf::from(DEFAULT_CORPUS_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// `oracle.toml`:
///
/// ```toml
/// [corpus]
/// path = "I-Ching-texts.md"
///
/// [log]
/// filter = "info"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub corpus: CorpusConfig,
    pub log: LogConfig,
    /// Directory relative corpus paths resolve against.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl OracleConfig {
    /// Read a config file. A missing file yields the defaults, resolved against the directory the
    /// file would have lived in.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, OracleError> {
        let path = path.as_ref();
        tracing::debug!("Attempting to read config from: {:?}", path);
        let mut config = if path.exists() {
            Self::from_toml_str(&read_to_string(path)?)?
        } else {
            tracing::debug!("Config file not found, using defaults.");
            OracleConfig::default()
        };
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, OracleError> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_corpus_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.corpus.path = path.as_ref().to_path_buf();
        self
    }

    pub fn corpus_path(&self) -> PathBuf {
        match &self.base_dir {
            Some(base) if self.corpus.path.is_relative() => base.join(&self.corpus.path),
            _ => self.corpus.path.clone(),
        }
    }

    pub fn corpus_source(&self) -> FileSource {
        FileSource::new(self.corpus_path())
    }

    /// A lazily loading cache over the configured corpus file.
    pub fn build_cache(&self) -> CorpusCache {
        CorpusCache::from_source(self.corpus_source())
    }
}
