//! # Biblio Testkit
//!
//! Test utilities for Biblio.
//!
//! This crate provides:
//! - Test fixtures: temporary stores, sample entities and a seeded demo
//!   library
//! - Property-based test generators using proptest
//!
//! The cross-crate scenario and persistence tests live in `tests/`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use biblio_testkit::prelude::*;
//!
//! #[test]
//! fn round_trip() {
//!     with_file_library(|store, _path| {
//!         let repo = demo_repository(1, date(2024, 6, 1));
//!         store.save(&repo).unwrap();
//!         let (loaded, _) = store.load().unwrap();
//!         assert_eq!(loaded.loan_count(), repo.loan_count());
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
