//! Optional persistence of the cache across restarts.
//!
//! The sink stores a single opaque blob; the lookup controller owns the
//! serialization (see `lookup::entry`). Read failures at bootstrap are
//! non-fatal; write failures at teardown surface to the caller.

use std::io;
use std::path::{Path, PathBuf};

/// Trait for reading and writing one serialized cache blob.
pub trait PersistentStore: Send + Sync {
    /// Read the stored blob; `Ok(None)` when nothing has been written yet.
    fn read(&self) -> io::Result<Option<Vec<u8>>>;

    /// Replace the stored blob.
    fn write(&self, blob: &[u8]) -> io::Result<()>;
}

/// File-backed store; the blob is a JSON document on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistentStore for JsonFileStore {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, blob: &[u8]) -> io::Result<()> {
        std::fs::write(&self.path, blob)
    }
}
