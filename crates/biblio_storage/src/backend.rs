//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level whole-file storage backend.
///
/// Storage backends are **opaque byte stores**. Each backend represents a
/// single named resource (one file on disk, one buffer in memory). Biblio
/// owns all format interpretation.
///
/// Replacing the contents is split in two steps so that a caller can
/// prepare several resources before making any of them current: `stage`
/// writes the new contents aside, `commit` makes them current and
/// `discard` throws them away.
///
/// # Invariants
///
/// - `load` returns exactly the bytes of the last successful `commit`
/// - `load` returns `None` if nothing was ever committed
/// - staged bytes are never visible to `load`
/// - a failed `stage` or `commit` leaves the previous contents readable
/// - Backends must be `Send + Sync`
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Reads the complete contents of the resource.
    ///
    /// Returns `Ok(None)` when the resource does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource exists but cannot be read.
    fn load(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Writes `data` aside as the pending replacement. A second `stage`
    /// replaces the pending data.
    ///
    /// # Errors
    ///
    /// Returns an error if the pending contents cannot be written. Nothing
    /// is left staged in that case.
    fn stage(&mut self, data: &[u8]) -> StorageResult<()>;

    /// Makes the staged contents current. Does nothing if nothing is
    /// staged.
    ///
    /// # Errors
    ///
    /// Returns an error if the replacement fails. The previous contents
    /// remain in place and the staged data stays pending.
    fn commit(&mut self) -> StorageResult<()>;

    /// Drops the staged contents, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the pending data exists but cannot be removed.
    fn discard(&mut self) -> StorageResult<()>;

    /// Atomically replaces the complete contents of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the new contents cannot be written. The previous
    /// contents remain in place in that case.
    fn store(&mut self, data: &[u8]) -> StorageResult<()> {
        self.stage(data)?;
        if let Err(err) = self.commit() {
            let _ = self.discard();
            return Err(err);
        }
        Ok(())
    }

    /// Returns whether the resource currently exists.
    ///
    /// # Errors
    ///
    /// Returns an error if existence cannot be determined.
    fn exists(&self) -> StorageResult<bool>;

    /// Returns a short human-readable name for logs and error messages.
    fn name(&self) -> String;
}
