//! # Biblio Storage
//!
//! Storage backend trait and implementations for Biblio.
//!
//! Backends are **opaque whole-file byte stores**: they load and replace
//! the complete contents of one named resource and never interpret the
//! bytes. The record format lives in `biblio_codec`; the meaning of the
//! records lives in `biblio_core`.
//!
//! ## Design Principles
//!
//! - A missing resource is not an error: `load` returns `None`
//! - `store` replaces the previous contents atomically, so a failed save
//!   never leaves a half-written file behind
//! - Replacement can be split into `stage` and `commit`, so several
//!   resources can be prepared before any of them changes
//! - Must be `Send + Sync`
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use biblio_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! assert!(backend.load().unwrap().is_none());
//!
//! backend.store(b"hello world").unwrap();
//! assert_eq!(backend.load().unwrap().as_deref(), Some(&b"hello world"[..]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
