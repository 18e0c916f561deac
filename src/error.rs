use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum OracleError {
    #[error("Corpus codec error: {0}")]
    Codec(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Corpus parse produced no hexagram records: {0}")]
    EmptyCorpus(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("Corpus source unavailable: {0}")]
    SourceUnavailable(String),
}

impl OracleError {
    /// Whether this error means "the thing asked for does not exist", as opposed to a failure
    /// while producing it.
    pub fn is_not_found(&self) -> bool {
        matches!(self, OracleError::NotFound(_))
    }
}

impl From<toml::de::Error> for OracleError {
    fn from(src: toml::de::Error) -> OracleError {
        OracleError::Config(format!("Toml deserialization error: {src}"))
    }
}

impl From<JsonError> for OracleError {
    fn from(src: JsonError) -> OracleError {
        OracleError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for OracleError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => OracleError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => OracleError::PermissionDenied,
            _ => OracleError::Io(format!("IOError: {}", x.kind())),
        }
    }
}
