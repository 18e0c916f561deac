//! Content providers for the corpus.
//!
//! The cache does not care where the corpus text comes from, only that the provider can hand
//! over the text and a version marker that changes whenever the text does.

use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    fmt,
    fs::{metadata, read_to_string},
    path::{Path, PathBuf},
    time::SystemTime,
};

use crate::error::OracleError;

/// Build identifier exported by `build.rs`.
pub const BUILD_ID: &str = env!("ORACLE_BUILD_ID");

/// An opaque marker compared for equality to detect corpus changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceVersion {
    /// Modification time of a backing file.
    Modified(SystemTime),
    /// Build identifier of compiled-in text.
    Build(String),
}

impl fmt::Display for SourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceVersion::Modified(time) => match time.duration_since(SystemTime::UNIX_EPOCH) {
                Ok(since_epoch) => write!(
                    f,
                    "mtime {}.{:09}",
                    since_epoch.as_secs(),
                    since_epoch.subsec_nanos()
                ),
                Err(_) => write!(f, "mtime {time:?}"),
            },
            SourceVersion::Build(id) => write!(f, "build {id}"),
        }
    }
}

pub trait CorpusSource: Send + Sync {
    /// The current version marker. Failing to produce one means the source is unavailable.
    fn version(&self) -> Result<SourceVersion, OracleError>;

    /// The full corpus text.
    fn read(&self) -> Result<String, OracleError>;

    /// Human-readable identification for logs.
    fn describe(&self) -> String;
}

/// A corpus file on disk, versioned by its modification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileSource {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CorpusSource for FileSource {
    fn version(&self) -> Result<SourceVersion, OracleError> {
        let modified = metadata(&self.path)
            .and_then(|meta| meta.modified())
            .map_err(|e| {
                OracleError::SourceUnavailable(format!(
                    "cannot read modification time of {:?}: {e}",
                    self.path
                ))
            })?;
        Ok(SourceVersion::Modified(modified))
    }

    fn read(&self) -> Result<String, OracleError> {
        tracing::debug!("Reading {:?}", self.path);
        read_to_string(&self.path).map_err(|e| {
            OracleError::SourceUnavailable(format!("cannot read {:?}: {e}", self.path))
        })
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Corpus text compiled into the binary. Its version is the build identifier, so it never goes
/// stale within a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedSource {
    text: Cow<'static, str>,
    build_id: String,
}

impl EmbeddedSource {
    /// Text embedded with `include_str!`, versioned by this build.
    pub fn new(text: &'static str) -> Self {
        EmbeddedSource {
            text: Cow::Borrowed(text),
            build_id: BUILD_ID.to_string(),
        }
    }

    /// Owned text with an explicit version identifier.
    pub fn with_build_id(text: impl Into<String>, build_id: impl Into<String>) -> Self {
        EmbeddedSource {
            text: Cow::Owned(text.into()),
            build_id: build_id.into(),
        }
    }
}

impl CorpusSource for EmbeddedSource {
    fn version(&self) -> Result<SourceVersion, OracleError> {
        Ok(SourceVersion::Build(self.build_id.clone()))
    }

    fn read(&self) -> Result<String, OracleError> {
        Ok(self.text.to_string())
    }

    fn describe(&self) -> String {
        format!("embedded corpus ({})", self.build_id)
    }
}
