//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::StorageResult;
use parking_lot::RwLock;

/// An in-memory storage backend.
///
/// Holds the contents of one resource in memory. Suitable for unit tests,
/// integration tests and ephemeral catalogs that don't need persistence.
///
/// # Example
///
/// ```rust
/// use biblio_storage::{StorageBackend, InMemoryBackend};
///
/// let mut backend = InMemoryBackend::named("books");
/// backend.store(b"test data").unwrap();
/// assert_eq!(backend.data(), Some(b"test data".to_vec()));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    name: String,
    data: RwLock<Option<Vec<u8>>>,
    staged: Option<Vec<u8>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::named("memory")
    }

    /// Creates a new empty in-memory backend with a display name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: RwLock::new(None),
            staged: None,
        }
    }

    /// Creates a new in-memory backend with pre-existing data.
    ///
    /// Useful for testing load scenarios with hand-written files.
    #[must_use]
    pub fn with_data(data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: "memory".to_string(),
            data: RwLock::new(Some(data.into())),
            staged: None,
        }
    }

    /// Returns a copy of the stored data, if any.
    #[must_use]
    pub fn data(&self) -> Option<Vec<u8>> {
        self.data.read().clone()
    }
}

impl StorageBackend for InMemoryBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.read().clone())
    }

    fn stage(&mut self, data: &[u8]) -> StorageResult<()> {
        self.staged = Some(data.to_vec());
        Ok(())
    }

    fn commit(&mut self) -> StorageResult<()> {
        if let Some(data) = self.staged.take() {
            *self.data.write() = Some(data);
        }
        Ok(())
    }

    fn discard(&mut self) -> StorageResult<()> {
        self.staged = None;
        Ok(())
    }

    fn exists(&self) -> StorageResult<bool> {
        Ok(self.data.read().is_some())
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_absent() {
        let backend = InMemoryBackend::new();
        assert!(backend.load().unwrap().is_none());
        assert!(!backend.exists().unwrap());
    }

    #[test]
    fn memory_store_and_load() {
        let mut backend = InMemoryBackend::new();
        backend.store(b"hello").unwrap();

        assert!(backend.exists().unwrap());
        assert_eq!(backend.load().unwrap().unwrap(), b"hello");
    }

    #[test]
    fn memory_store_replaces() {
        let mut backend = InMemoryBackend::new();
        backend.store(b"first").unwrap();
        backend.store(b"second").unwrap();

        assert_eq!(backend.data().unwrap(), b"second");
    }

    #[test]
    fn memory_empty_store_exists() {
        let mut backend = InMemoryBackend::new();
        backend.store(b"").unwrap();

        assert!(backend.exists().unwrap());
        assert_eq!(backend.load().unwrap().unwrap(), b"");
    }

    #[test]
    fn memory_with_data() {
        let backend = InMemoryBackend::with_data(b"preloaded".to_vec());
        assert_eq!(backend.load().unwrap().unwrap(), b"preloaded");
    }

    #[test]
    fn memory_stage_commit_discard() {
        let mut backend = InMemoryBackend::named("loans");
        backend.store(b"old").unwrap();

        backend.stage(b"new").unwrap();
        assert_eq!(backend.data().unwrap(), b"old");
        backend.discard().unwrap();
        backend.commit().unwrap();
        assert_eq!(backend.data().unwrap(), b"old");

        backend.stage(b"new").unwrap();
        backend.commit().unwrap();
        assert_eq!(backend.data().unwrap(), b"new");
        assert_eq!(backend.name(), "loans");
    }
}
