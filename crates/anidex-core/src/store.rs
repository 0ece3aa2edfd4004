//! Append-only JSON array documents.
//!
//! Each document is rewritten wholesale on append: read the array, push the
//! new element, write a temp file in the same directory, then rename it over
//! the target. Readers therefore never observe a half-written file.
//!
//! A per-store mutex serialises the read-modify-write span for writers in
//! this process. Writers in other processes can still race (last rename wins),
//! but the document always stays a valid array.

use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::Error;

#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every element of the document.
    ///
    /// Missing, unparsable, or non-array documents read as empty; callers
    /// (the rate limiter in particular) fail open on a corrupt file.
    pub fn load(&self) -> Vec<Value> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read records");
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                tracing::warn!(path = %self.path.display(), "records document is not an array; treating as empty");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to parse records; treating as empty");
                Vec::new()
            }
        }
    }

    /// Append one record and persist the whole array atomically. Returns the
    /// new element count.
    pub fn append<T: Serialize>(&self, record: &T) -> Result<usize> {
        let value = serde_json::to_value(record)?;

        let _guard = self.write_lock.lock();
        let mut items = self.load();
        self.push_and_write(&mut items, value)
    }

    /// Append the record produced by `build`, which sees the current records
    /// first and may decline with its own error. Inspection and append happen
    /// under the write lock, so a decision based on the existing records
    /// cannot be invalidated by a concurrent append in this process.
    pub fn append_with<T, E, F>(&self, build: F) -> Result<std::result::Result<usize, E>>
    where
        T: Serialize,
        F: FnOnce(&[Value]) -> std::result::Result<T, E>,
    {
        let _guard = self.write_lock.lock();
        let mut items = self.load();
        let record = match build(&items) {
            Ok(record) => record,
            Err(declined) => return Ok(Err(declined)),
        };
        let value = serde_json::to_value(&record)?;
        self.push_and_write(&mut items, value).map(Ok)
    }

    fn push_and_write(&self, items: &mut Vec<Value>, value: Value) -> Result<usize> {
        items.push(value);
        self.write_atomic(items)?;

        tracing::debug!(path = %self.path.display(), count = items.len(), "record appended");
        Ok(items.len())
    }

    fn write_atomic(&self, items: &[Value]) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let mut bytes = serde_json::to_vec_pretty(items)?;
        bytes.push(b'\n');

        let mut tmp = tempfile::Builder::new()
            .suffix(".json")
            .tempfile_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(Error::from)?;
        Ok(())
    }
}
