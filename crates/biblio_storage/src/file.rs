//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix of the temporary file used during atomic replacement.
const TEMP_SUFFIX: &str = ".tmp";

/// A file-based storage backend.
///
/// Each backend owns one file. Data survives process restarts.
///
/// # Durability
///
/// Replacement uses the write-then-rename pattern:
/// 1. `stage` writes the new contents to `<file>.tmp` and syncs it to disk
///    (if syncing is enabled)
/// 2. `commit` renames the temporary file over the target and fsyncs the
///    parent directory so the rename itself is durable
///
/// If staging fails the temporary file is removed. Until `commit` succeeds
/// the previous contents of the target stay untouched.
///
/// # Example
///
/// ```no_run
/// use biblio_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::new(Path::new("books.csv"));
/// backend.store(b"#biblio books v1\n").unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    sync: bool,
    staged: bool,
    lock: RwLock<()>,
}

impl FileBackend {
    /// Creates a backend for the file at `path`.
    ///
    /// The file is not created until the first `commit`.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            sync: true,
            staged: false,
            lock: RwLock::new(()),
        }
    }

    /// Sets whether staging and committing fsync the file and its
    /// directory.
    #[must_use]
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the temporary file that holds staged contents.
    #[must_use]
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(TEMP_SUFFIX);
        self.path.with_file_name(name)
    }

    fn write_temp(&self, data: &[u8]) -> io::Result<()> {
        let mut file = File::create(self.temp_path())?;
        file.write_all(data)?;
        if self.sync {
            file.sync_all()?;
        }
        Ok(())
    }

    #[cfg(unix)]
    fn sync_parent(&self) -> StorageResult<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        File::open(parent)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_parent(&self) -> StorageResult<()> {
        // NTFS journals metadata; directory handles cannot be fsynced here.
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        let _guard = self.lock.read();

        if self.path.is_dir() {
            return Err(StorageError::NotAFile(self.path.clone()));
        }

        match fs::read(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn stage(&mut self, data: &[u8]) -> StorageResult<()> {
        let _guard = self.lock.write();

        if let Err(source) = self.write_temp(data) {
            let _ = fs::remove_file(self.temp_path());
            self.staged = false;
            return Err(StorageError::ReplaceFailed {
                path: self.path.clone(),
                source,
            });
        }

        self.staged = true;
        debug!(path = %self.path.display(), bytes = data.len(), "staged file");
        Ok(())
    }

    fn commit(&mut self) -> StorageResult<()> {
        let _guard = self.lock.write();

        if !self.staged {
            return Ok(());
        }
        fs::rename(self.temp_path(), &self.path).map_err(|source| {
            StorageError::ReplaceFailed {
                path: self.path.clone(),
                source,
            }
        })?;
        self.staged = false;

        if self.sync {
            self.sync_parent()?;
        }

        debug!(path = %self.path.display(), "replaced file");
        Ok(())
    }

    fn discard(&mut self) -> StorageResult<()> {
        let _guard = self.lock.write();

        if !self.staged {
            return Ok(());
        }
        match fs::remove_file(self.temp_path()) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.staged = false;
        debug!(path = %self.path.display(), "discarded staged file");
        Ok(())
    }

    fn exists(&self) -> StorageResult<bool> {
        let _guard = self.lock.read();
        Ok(self.path.is_file())
    }

    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_missing_loads_none() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(&dir.path().join("books.csv"));

        assert!(backend.load().unwrap().is_none());
        assert!(!backend.exists().unwrap());
    }

    #[test]
    fn file_store_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("books.csv");

        let mut backend = FileBackend::new(&path);
        backend.store(b"hello world").unwrap();

        assert!(path.exists());
        assert_eq!(backend.load().unwrap().unwrap(), b"hello world");
    }

    #[test]
    fn file_store_replaces_previous_contents() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(&dir.path().join("books.csv"));

        backend.store(b"a much longer first version").unwrap();
        backend.store(b"short").unwrap();

        assert_eq!(backend.load().unwrap().unwrap(), b"short");
    }

    #[test]
    fn file_store_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(&dir.path().join("books.csv"));

        backend.store(b"data").unwrap();

        assert!(!backend.temp_path().exists());
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("patrons.csv");

        {
            let mut backend = FileBackend::new(&path);
            backend.store(b"persistent data").unwrap();
        }

        {
            let backend = FileBackend::new(&path);
            assert_eq!(backend.load().unwrap().unwrap(), b"persistent data");
        }
    }

    #[test]
    fn file_failed_store_keeps_old_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("loans.csv");

        let mut backend = FileBackend::new(&path);
        backend.store(b"old").unwrap();

        // A directory squatting on the temp path makes File::create fail.
        fs::create_dir(backend.temp_path()).unwrap();

        let result = backend.store(b"new");
        assert!(matches!(result, Err(StorageError::ReplaceFailed { .. })));
        assert_eq!(backend.load().unwrap().unwrap(), b"old");
    }

    #[test]
    fn staged_contents_are_invisible_until_commit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("books.csv");
        let mut backend = FileBackend::new(&path);
        backend.store(b"old").unwrap();

        backend.stage(b"new").unwrap();
        assert!(backend.temp_path().is_file());
        assert_eq!(backend.load().unwrap().unwrap(), b"old");

        backend.commit().unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"new");
        assert!(!backend.temp_path().exists());

        // Nothing staged: commit is a no-op.
        backend.commit().unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"new");
    }

    #[test]
    fn discard_removes_staged_contents() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(&dir.path().join("patrons.csv"));
        backend.store(b"old").unwrap();

        backend.stage(b"new").unwrap();
        backend.discard().unwrap();
        assert!(!backend.temp_path().exists());

        backend.commit().unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"old");
    }

    #[test]
    fn failed_commit_keeps_old_contents_and_staged_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("loans.csv");
        let mut backend = FileBackend::new(&path);

        // A non-empty directory on the target path makes the rename fail.
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        backend.stage(b"new").unwrap();
        assert!(matches!(
            backend.commit(),
            Err(StorageError::ReplaceFailed { .. })
        ));
        assert!(backend.temp_path().is_file());

        backend.discard().unwrap();
        assert!(!backend.temp_path().exists());
    }

    #[test]
    fn file_directory_is_rejected() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        assert!(matches!(backend.load(), Err(StorageError::NotAFile(_))));
    }

    #[test]
    fn file_without_sync() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(&dir.path().join("books.csv")).with_sync(false);

        backend.store(b"data").unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"data");
    }

    #[test]
    fn file_name() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(&dir.path().join("books.csv"));
        assert_eq!(backend.name(), "books.csv");
    }
}
