//! Service context bundling the port trait objects and scoped caches.

use std::path::Path;
use std::sync::Arc;

use crate::adapters::live::clock::SystemClock;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::cache::FileCache;
use crate::error::Result;
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. The file cache is
/// scoped to the context, so independent contexts can build contracts in
/// parallel without sharing mutable state.
pub struct ServiceContext {
    /// Clock for contract timestamps.
    pub clock: Box<dyn Clock>,
    /// Filesystem for source and contract I/O.
    pub fs: Arc<dyn FileSystem>,
    /// Read-through cache for component sources.
    pub cache: FileCache,
}

impl ServiceContext {
    /// Creates a live context backed by the real disk and system clock.
    #[must_use]
    pub fn live() -> Self {
        Self::with_ports(Box::new(SystemClock), Arc::new(LiveFileSystem))
    }

    /// Creates a context from explicit port implementations.
    #[must_use]
    pub fn with_ports(clock: Box<dyn Clock>, fs: Arc<dyn FileSystem>) -> Self {
        Self { clock, fs, cache: FileCache::new() }
    }

    /// Reads a component source file through the scoped cache.
    ///
    /// # Errors
    ///
    /// Propagates [`FileCache::read`] failures.
    pub async fn read_source(&self, path: &Path) -> Result<Arc<str>> {
        self.cache.read(self.fs.as_ref(), path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{FixedClock, MemoryFileSystem};

    #[tokio::test]
    async fn contexts_do_not_share_caches() {
        let fs: Arc<dyn FileSystem> =
            Arc::new(MemoryFileSystem::with_files([("/src/a.html", "<p></p>")]));
        let clock = FixedClock::parse("2025-01-01T00:00:00Z").unwrap();
        let first = ServiceContext::with_ports(Box::new(clock), Arc::clone(&fs));
        let second = ServiceContext::with_ports(Box::new(clock), fs);

        first.read_source(Path::new("/src/a.html")).await.unwrap();

        assert_eq!(first.cache.len(), 1);
        assert!(second.cache.is_empty());
    }
}
