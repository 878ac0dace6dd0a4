//! Generic JSON document collections persisted as single flat files.

use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};

/// A collection of records persisted as one JSON array at a fixed path.
///
/// Every access is a full read or a full rewrite of the backing file;
/// there is no partial or streamed access. Callers run synchronous
/// load-mutate-save cycles and must not interleave overlapping cycles.
pub struct DocumentStore<T> {
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> DocumentStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Open a collection, initializing the backing file to an empty array
    /// when it does not exist yet. Missing parent directories are created.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        if !path.exists() {
            fs::write(&path, "[]")?;
        }
        Ok(Self {
            path,
            _records: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole collection.
    ///
    /// A file that exists but does not parse fails with
    /// [`StoreError::Corrupt`]; that is propagated, never recovered.
    pub fn load(&self) -> StoreResult<Vec<T>> {
        if !self.path.exists() {
            fs::write(&self.path, "[]")?;
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&self.path)?;
        serde_json::from_str(&json).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Rewrite the whole collection.
    pub fn save(&self, records: &[T]) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(records).map_err(io::Error::from)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
