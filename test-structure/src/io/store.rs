//! Named file store for test data shared between stages.
//!
//! Each logical key maps to `<dir>/<data_dir>/<key>.json`. Writes go through a
//! temp file in the same directory followed by a rename, so a concurrent load
//! sees either the old record or the new one, never a partial file. There is
//! no cross-process locking: parallel runs must use distinct working
//! directories.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::core::encoding::{decode, encode, is_empty_encoding};
use crate::core::key::{record_file_name, validate_key};
use crate::error::{StoreError, StoreResult};
use crate::io::config::StructureConfig;
use crate::logging::{LogSink, default_sink};

/// Key/value records scoped to one test run's working directory.
///
/// The working directory is owned by the caller; the store only creates its
/// data subdirectory and the record files inside it.
#[derive(Clone)]
pub struct TestDataStore {
    dir: PathBuf,
    data_dir: String,
    pretty: bool,
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for TestDataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestDataStore")
            .field("dir", &self.dir)
            .field("data_dir", &self.data_dir)
            .field("pretty", &self.pretty)
            .finish_non_exhaustive()
    }
}

impl TestDataStore {
    /// Store rooted at `dir` with the default layout and tracing sink.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let cfg = StructureConfig::default();
        Self {
            dir: dir.into(),
            data_dir: cfg.data_dir,
            pretty: cfg.pretty,
            sink: default_sink(),
        }
    }

    /// Store with a custom layout. Fails if `cfg` would place records outside
    /// the working directory.
    pub fn from_config(dir: impl Into<PathBuf>, cfg: &StructureConfig) -> anyhow::Result<Self> {
        cfg.validate()?;
        Ok(Self {
            dir: dir.into(),
            data_dir: cfg.data_dir.clone(),
            pretty: cfg.pretty,
            sink: default_sink(),
        })
    }

    /// Replace the log sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The working directory this store is scoped to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory holding all records of this store.
    pub fn data_dir(&self) -> PathBuf {
        self.dir.join(&self.data_dir)
    }

    /// Path of the record for `key`.
    pub fn data_path(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key).map_err(|reason| StoreError::InvalidKey {
            key: key.to_string(),
            reason,
        })?;
        let path = self.data_dir().join(record_file_name(key));
        debug!(key, path = %path.display(), "derived test data path");
        Ok(path)
    }

    /// True if a record exists for `key` and holds a non-empty encoding.
    ///
    /// A missing file and a file encoding `null`, `false`, `0`, `{}` or `[]`
    /// both report `false`. Use [`TestDataStore::load`] to tell them apart.
    pub fn exists(&self, key: &str) -> StoreResult<bool> {
        let path = self.data_path(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(source) => return Err(io_error("read", key, &path, source)),
        };
        let empty = is_empty_encoding(&bytes).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            path: path.clone(),
            source,
        })?;
        Ok(!empty)
    }

    /// Encode `value` and store it under `key`.
    ///
    /// With `overwrite == false`, an existing non-empty record is left in place
    /// and the call succeeds without writing. Stages rely on this to re-run
    /// their save step without clobbering data from an earlier run.
    pub fn save<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        overwrite: bool,
    ) -> StoreResult<()> {
        let path = self.data_path(key)?;
        self.sink.logf(format_args!(
            "Storing test data '{key}' in {} so it can be reused later",
            path.display()
        ));

        if !overwrite {
            if self.exists(key)? {
                self.sink.logf(format_args!(
                    "Test data '{key}' at {} is non-empty, keeping the existing value.",
                    path.display()
                ));
                return Ok(());
            }
        } else if !matches!(self.exists(key), Ok(false)) {
            // Unreadable or corrupt records are replaced too.
            self.sink.logf(format_args!(
                "[WARNING] Test data '{key}' at {} is non-empty. Overwriting the existing value.",
                path.display()
            ));
        }
        self.check_case_collision(key)?;

        let bytes = encode(value, self.pretty).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            dir: self.dir.clone(),
            source,
        })?;
        write_atomic(key, &path, &bytes)
    }

    /// Store `value` under `key` unless a non-empty record is already there.
    pub fn save_if_absent<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        self.save(key, value, false)
    }

    /// Load and decode the record for `key`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> StoreResult<T> {
        let path = self.data_path(key)?;
        self.sink.logf(format_args!(
            "Loading test data '{key}' from {}",
            path.display()
        ));
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    key: key.to_string(),
                    dir: self.dir.clone(),
                    path,
                });
            }
            Err(source) => return Err(io_error("read", key, &path, source)),
        };
        decode(&bytes).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            path,
            source,
        })
    }

    /// Delete the record for `key`. Removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.data_path(key)?;
        self.sink.logf(format_args!(
            "Cleaning up test data '{key}' at {}",
            path.display()
        ));
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(key, "test data already absent");
                Ok(())
            }
            Err(source) => Err(io_error("remove", key, &path, source)),
        }
    }

    /// Delete the whole data directory. An absent directory is not an error.
    pub fn cleanup_all(&self) -> StoreResult<()> {
        let data_dir = self.data_dir();
        self.sink.logf(format_args!(
            "Cleaning up test data folder {}",
            data_dir.display()
        ));
        match fs::remove_dir_all(&data_dir) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(io_error("remove", "*", &data_dir, source)),
        }
    }
}

impl TestDataStore {
    /// Reject `key` if a record exists whose name differs only by ASCII case.
    /// Such keys share one file on case-insensitive filesystems.
    fn check_case_collision(&self, key: &str) -> StoreResult<()> {
        let data_dir = self.data_dir();
        let entries = match fs::read_dir(&data_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => return Err(io_error("list", key, &data_dir, source)),
        };
        let file_name = record_file_name(key);
        for entry in entries {
            let entry = entry.map_err(|source| io_error("list", key, &data_dir, source))?;
            let Some(existing) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if existing != file_name && existing.eq_ignore_ascii_case(&file_name) {
                return Err(StoreError::InvalidKey {
                    key: key.to_string(),
                    reason: "differs only by case from an existing record",
                });
            }
        }
        Ok(())
    }
}

fn write_atomic(key: &str, path: &Path, contents: &[u8]) -> StoreResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io_error("resolve parent of", key, path, io::ErrorKind::NotFound.into()))?;
    fs::create_dir_all(parent).map_err(|source| io_error("create directory for", key, parent, source))?;
    let mut tmp =
        NamedTempFile::new_in(parent).map_err(|source| io_error("create temp file for", key, parent, source))?;
    tmp.write_all(contents)
        .map_err(|source| io_error("write temp file for", key, tmp.path(), source))?;
    tmp.persist(path)
        .map_err(|err| io_error("replace", key, path, err.error))?;
    debug!(key, path = %path.display(), bytes = contents.len(), "wrote test data");
    Ok(())
}

fn io_error(action: &'static str, key: &str, path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        action,
        key: key.to_string(),
        path: path.to_path_buf(),
        source,
    }
}
