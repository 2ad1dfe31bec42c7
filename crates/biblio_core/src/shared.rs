//! Thread-safe repository handle.

use crate::repository::Repository;
use parking_lot::Mutex;
use std::sync::Arc;

/// A cloneable handle to one [`Repository`] behind a single mutex.
///
/// Every closure passed to [`read`](Self::read) or [`write`](Self::write)
/// runs under the lock, so a multi-step operation such as a grant followed
/// by a save sees no interleaved changes.
#[derive(Debug, Clone, Default)]
pub struct SharedRepository {
    inner: Arc<Mutex<Repository>>,
}

impl SharedRepository {
    /// Wraps a repository.
    #[must_use]
    pub fn new(repository: Repository) -> Self {
        Self {
            inner: Arc::new(Mutex::new(repository)),
        }
    }

    /// Runs `f` with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&Repository) -> R) -> R {
        let guard = self.inner.lock();
        f(&guard)
    }

    /// Runs `f` with exclusive access.
    pub fn write<R>(&self, f: impl FnOnce(&mut Repository) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Returns the repository if this is the last handle.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged while other handles exist.
    pub fn try_into_inner(self) -> Result<Repository, Self> {
        Arc::try_unwrap(self.inner)
            .map(|mutex| mutex.into_inner())
            .map_err(|inner| Self { inner })
    }
}

impl From<Repository> for SharedRepository {
    fn from(repository: Repository) -> Self {
        Self::new(repository)
    }
}
