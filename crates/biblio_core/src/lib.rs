//! # Biblio Core
//!
//! Library catalog, patron registry and lending engine for Biblio.
//!
//! This crate provides:
//! - Validated entities: [`Book`], [`Patron`], [`Loan`]
//! - [`Repository`], the single owner of every entity, with guarded
//!   removal and integrity checking
//! - The lending engine ([`Repository::grant_loan`],
//!   [`Repository::return_loan`]) enforcing availability and the
//!   per-patron loan limit
//! - Search filters and statistics
//! - [`LibraryStore`], which saves a repository to three flat files and
//!   loads it back with every loan re-linked to its patron and book
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use biblio_core::{Book, Config, LibraryStore, Patron};
//! use chrono::NaiveDate;
//!
//! let mut store = LibraryStore::open(Path::new("library"), Config::default())?;
//! let (mut repo, _report) = store.load()?;
//!
//! let book = Book::new("Dune", &["Frank Herbert"], None, "9780441172719", 2)?;
//! let isbn = book.isbn().clone();
//! repo.add_book(book)?;
//!
//! let patron = Patron::new("Mario", "Rossi", "0512100001", "mario.rossi@example.com")?;
//! let member = patron.member_number().clone();
//! repo.add_patron(patron)?;
//!
//! let loan = repo.grant_loan(&member, &isbn, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())?;
//! store.save(&repo)?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dir;
mod entity;
mod error;
mod lending;
mod persist;
mod query;
mod repository;
mod shared;
mod stats;
mod types;

pub use config::{Config, UnresolvedLoanPolicy};
pub use dir::{DataDir, BOOKS_FILE, LOANS_FILE, PATRONS_FILE};
pub use entity::{Book, Loan, Patron, LOAN_PERIOD_DAYS, MAX_ACTIVE_LOANS};
pub use error::{
    CoreError, CoreResult, IntegrityError, PersistenceError, ReferentialLoadError, StateError,
    UnresolvedReason, ValidationError,
};
pub use lending::{grant_loan, return_loan};
pub use persist::{LibraryStore, LoadReport, SaveReport, FORMAT_VERSION};
pub use query::{BookFilter, LoanFilter, PatronFilter};
pub use repository::{Repository, Violation};
pub use shared::SharedRepository;
pub use stats::LibraryStats;
pub use types::{Isbn, LoanId, MemberNumber, MEMBER_NUMBER_LEN};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
