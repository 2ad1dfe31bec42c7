//! Data directory management.
//!
//! Layout of a library data directory:
//!
//! ```text
//! <data_dir>/
//! ├─ LOCK            # Advisory lock for single-process access
//! ├─ books.csv       # Catalog
//! ├─ patrons.csv     # Patron registry
//! └─ loans.csv       # Active loans
//! ```
//!
//! The LOCK file ensures only one process reads and writes the data files
//! at a time.

use crate::error::{CoreResult, PersistenceError};
use biblio_storage::{FileBackend, StorageBackend};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

const LOCK_FILE: &str = "LOCK";

/// File name of the catalog.
pub const BOOKS_FILE: &str = "books.csv";
/// File name of the patron registry.
pub const PATRONS_FILE: &str = "patrons.csv";
/// File name of the loan list.
pub const LOANS_FILE: &str = "loans.csv";

/// Manages the data directory and its lock.
///
/// The `DataDir` holds an exclusive lock on the directory for as long as
/// it lives. The lock is released when it is dropped.
#[derive(Debug)]
pub struct DataDir {
    path: PathBuf,
    _lock_file: File,
}

impl DataDir {
    /// Opens or creates a data directory and locks it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory doesn't exist and `create_if_missing` is false
    /// - The path is not a directory
    /// - Another process holds the lock (`DataDirLocked`)
    /// - I/O errors occur
    pub fn open(path: &Path, create_if_missing: bool) -> CoreResult<Self> {
        if !path.exists() {
            if create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(PersistenceError::MissingDataDir {
                    path: path.to_path_buf(),
                }
                .into());
            }
        }

        if !path.is_dir() {
            return Err(PersistenceError::NotADirectory {
                path: path.to_path_buf(),
            }
            .into());
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(PersistenceError::DataDirLocked {
                path: path.to_path_buf(),
            }
            .into());
        }
        debug!(path = %path.display(), "data directory locked");

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Returns the data directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path to the catalog file.
    #[must_use]
    pub fn books_path(&self) -> PathBuf {
        self.path.join(BOOKS_FILE)
    }

    /// Returns the path to the patron file.
    #[must_use]
    pub fn patrons_path(&self) -> PathBuf {
        self.path.join(PATRONS_FILE)
    }

    /// Returns the path to the loan file.
    #[must_use]
    pub fn loans_path(&self) -> PathBuf {
        self.path.join(LOANS_FILE)
    }

    /// Returns a file backend for `name` inside this directory.
    #[must_use]
    pub fn backend(&self, name: &str, sync: bool) -> FileBackend {
        FileBackend::new(&self.path.join(name)).with_sync(sync)
    }

    /// Returns true if none of the data files exist yet.
    #[must_use]
    pub fn is_new(&self) -> bool {
        [BOOKS_FILE, PATRONS_FILE, LOANS_FILE]
            .iter()
            .all(|name| matches!(self.backend(name, false).exists(), Ok(false)))
    }
}
