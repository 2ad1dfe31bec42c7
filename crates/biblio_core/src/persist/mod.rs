//! Persistence of a [`Repository`] to three flat record files.
//!
//! Books, patrons and loans each live in their own document (see
//! `biblio_codec` for the line format). Loans are stored by the natural
//! keys of their patron and book and are re-linked to the loaded entities
//! on load; loan ids are not stored.
//!
//! [`Repository`]: crate::Repository

mod records;
mod report;
mod store;

pub use report::{LoadReport, SaveReport};
pub use store::LibraryStore;

/// Record format version written into every header.
pub const FORMAT_VERSION: u16 = 1;

/// Header kind of the catalog file.
pub const BOOKS_KIND: &str = "books";
/// Header kind of the patron file.
pub const PATRONS_KIND: &str = "patrons";
/// Header kind of the loan file.
pub const LOANS_KIND: &str = "loans";
