//! Read-through cache for component source files.
//!
//! The cache is owned by a [`ServiceContext`](crate::context::ServiceContext)
//! instead of living in a process-wide static, so two builders with two
//! contexts never observe each other's reads.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{ContractError, Result};
use crate::ports::FileSystem;

/// Caches file contents by path. Repeated reads of one path return the same
/// shared buffer.
#[derive(Debug, Default)]
pub struct FileCache {
    entries: Mutex<HashMap<PathBuf, Arc<str>>>,
}

impl FileCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `path` through `fs`, serving later calls from memory.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::MissingAsset`] when the file does not exist
    /// and [`ContractError::Io`] when it exists but cannot be read.
    pub async fn read(&self, fs: &dyn FileSystem, path: &Path) -> Result<Arc<str>> {
        if let Some(hit) = self.lock().get(path) {
            debug!(path = %path.display(), "file cache hit");
            return Ok(Arc::clone(hit));
        }
        if !fs.exists(path) {
            return Err(ContractError::MissingAsset { path: path.to_path_buf() });
        }
        let contents: Arc<str> = fs
            .read_to_string(path)
            .map_err(|source| ContractError::Io { path: path.to_path_buf(), source })?
            .into();
        self.lock().insert(path.to_path_buf(), Arc::clone(&contents));
        Ok(contents)
    }

    /// Number of cached files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Arc<str>>> {
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
