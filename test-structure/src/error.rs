//! Errors raised by the test-data store.

use std::path::PathBuf;

/// Failure of a store operation.
///
/// Every variant names the logical key and the directory or file involved, so
/// a wrong working directory or a skipped stage can be diagnosed from the
/// message alone.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid test data key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("encode test data '{key}' for {}", .dir.display())]
    Encode {
        key: String,
        dir: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("decode test data '{key}' from {}", .path.display())]
    Decode {
        key: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "no test data '{key}' in {} (expected {}); did the stage that saves it run?",
        .dir.display(),
        .path.display()
    )]
    NotFound {
        key: String,
        dir: PathBuf,
        path: PathBuf,
    },

    #[error("{action} test data '{key}' at {}", .path.display())]
    Io {
        action: &'static str,
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// True when a load found no record for the key.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
