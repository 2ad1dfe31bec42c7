//! Error types for Biblio core.
//!
//! Errors are grouped by what the caller can do about them:
//!
//! - [`ValidationError`]: bad input, discard it and tell the user
//! - [`StateError`]: a business rule refused the operation, nothing changed
//! - [`IntegrityError`]: the operation would break a cross-entity invariant
//! - [`PersistenceError`]: storage could not be read or written
//!
//! [`ReferentialLoadError`] is not returned as an error by default: loan
//! records that cannot be re-linked are collected in the load report.

use crate::types::{Isbn, LoanId, MemberNumber};
use biblio_codec::CodecError;
use biblio_storage::StorageError;
use chrono::NaiveDate;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Malformed or missing field values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field is empty or only whitespace.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the field.
        field: &'static str,
    },

    /// The ISBN does not have 10 or 13 digits.
    #[error("invalid ISBN {value:?}: expected 10 or 13 digits")]
    InvalidIsbn {
        /// The rejected input.
        value: String,
    },

    /// The member number is not a fixed-length digit string.
    #[error("invalid member number {value:?}: expected exactly {expected} digits")]
    InvalidMemberNumber {
        /// The rejected input.
        value: String,
        /// Required number of digits.
        expected: usize,
    },

    /// The email address does not look like an address.
    #[error("invalid email address {value:?}")]
    InvalidEmail {
        /// The rejected input.
        value: String,
    },

    /// A book was given no authors.
    #[error("a book needs at least one author")]
    NoAuthors,

    /// One of the authors is blank.
    #[error("author #{position} must not be empty")]
    EmptyAuthor {
        /// One-based position in the author list.
        position: usize,
    },

    /// A new book was created with no copies.
    #[error("a new book needs at least one copy")]
    NoCopies,

    /// The loan period would run past the last representable date.
    #[error("a loan starting on {start_date} has no representable due date")]
    DueDateOutOfRange {
        /// The requested start date.
        start_date: NaiveDate,
    },
}

/// A business rule refused the operation. No state was changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// Every copy of the book is on loan.
    #[error("no copies of {isbn} are available")]
    BookUnavailable {
        /// The requested book.
        isbn: Isbn,
    },

    /// The patron already holds the maximum number of loans.
    #[error("patron {member_number} already has {limit} active loans")]
    LoanLimitExceeded {
        /// The borrowing patron.
        member_number: MemberNumber,
        /// The per-patron limit.
        limit: usize,
    },

    /// Availability is already zero.
    #[error("cannot decrement availability of {isbn}: no copies left")]
    DecrementBelowZero {
        /// The book.
        isbn: Isbn,
    },
}

/// The operation would break a catalog-level or cross-entity invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// A book with this ISBN is already in the catalog.
    #[error("a book with ISBN {isbn} already exists")]
    DuplicateIsbn {
        /// The conflicting key.
        isbn: Isbn,
    },

    /// A patron with this member number is already registered.
    #[error("a patron with member number {member_number} already exists")]
    DuplicateMemberNumber {
        /// The conflicting key.
        member_number: MemberNumber,
    },

    /// The book is still referenced by loans.
    #[error("book {isbn} is referenced by {loans} active loan(s)")]
    BookOnLoan {
        /// The book.
        isbn: Isbn,
        /// Number of loans referencing it.
        loans: usize,
    },

    /// The patron is still referenced by loans.
    #[error("patron {member_number} is referenced by {loans} active loan(s)")]
    PatronHasLoans {
        /// The patron.
        member_number: MemberNumber,
        /// Number of loans referencing them.
        loans: usize,
    },

    /// No book with this ISBN.
    #[error("no book with ISBN {isbn}")]
    BookNotFound {
        /// The missing key.
        isbn: Isbn,
    },

    /// No patron with this member number.
    #[error("no patron with member number {member_number}")]
    PatronNotFound {
        /// The missing key.
        member_number: MemberNumber,
    },

    /// No active loan with this id.
    #[error("no active loan {id}")]
    LoanNotFound {
        /// The missing loan.
        id: LoanId,
    },

    /// A loan was attached to a patron it does not belong to.
    #[error("{loan} belongs to {owner}, not {member_number}")]
    LoanPatronMismatch {
        /// The loan.
        loan: LoanId,
        /// The patron named by the loan.
        owner: MemberNumber,
        /// The patron it was attached to.
        member_number: MemberNumber,
    },
}

/// Why a persisted loan record could not be re-linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The member number names no loaded patron.
    UnknownPatron,
    /// The ISBN names no loaded book.
    UnknownBook,
    /// Neither key resolves.
    UnknownPatronAndBook,
    /// The patron already holds the maximum number of loans.
    PatronAtLimit,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnknownPatron => "unknown patron",
            Self::UnknownBook => "unknown book",
            Self::UnknownPatronAndBook => "unknown patron and book",
            Self::PatronAtLimit => "patron at loan limit",
        })
    }
}

/// A persisted loan record that could not be re-linked on load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("loan record on line {line} ({member_number}, {isbn}, {start_date}) skipped: {reason}")]
pub struct ReferentialLoadError {
    /// One-based line in the loans file.
    pub line: usize,
    /// Member number as stored.
    pub member_number: String,
    /// ISBN as stored.
    pub isbn: String,
    /// Loan start date as stored.
    pub start_date: NaiveDate,
    /// What failed.
    pub reason: UnresolvedReason,
}

/// Storage could not be read or written.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O error outside a backend (directory, lock file).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A data file could not be decoded.
    #[error("{file}: {source}")]
    Codec {
        /// The data file.
        file: String,
        /// The decode error.
        source: CodecError,
    },

    /// A record decoded but its contents are unusable.
    #[error("{file} line {line}: {message}")]
    Corrupt {
        /// The data file.
        file: String,
        /// One-based line number.
        line: usize,
        /// What is wrong.
        message: String,
    },

    /// A record decoded but fails entity validation.
    #[error("{file} line {line}: {source}")]
    InvalidRecord {
        /// The data file.
        file: String,
        /// One-based line number.
        line: usize,
        /// The validation failure.
        source: ValidationError,
    },

    /// The data files were not all written by the same save.
    #[error("incomplete save: {file} is from save {found} but {reference} is from save {expected}")]
    MixedGenerations {
        /// The file that disagrees.
        file: String,
        /// Its save generation.
        found: u64,
        /// The file it was compared against.
        reference: String,
        /// That file's save generation.
        expected: u64,
    },

    /// A loan record could not be re-linked and the policy is to abort.
    #[error(transparent)]
    UnresolvedLoan(ReferentialLoadError),

    /// Another process holds the data directory.
    #[error("data directory locked: {}", path.display())]
    DataDirLocked {
        /// The data directory.
        path: PathBuf,
    },

    /// The data directory does not exist and creation was disabled.
    #[error("data directory does not exist: {}", path.display())]
    MissingDataDir {
        /// The data directory.
        path: PathBuf,
    },

    /// The data directory path names something that is not a directory.
    #[error("not a directory: {}", path.display())]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },
}

impl PersistenceError {
    /// Creates a corrupt-record error.
    pub fn corrupt(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Corrupt {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// Creates a codec error for a data file.
    pub fn codec(file: impl Into<String>, source: CodecError) -> Self {
        Self::Codec {
            file: file.into(),
            source,
        }
    }
}

/// Errors that can occur in Biblio core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Business rule refusal.
    #[error(transparent)]
    State(#[from] StateError),

    /// Cross-entity invariant violation.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// Storage failure.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        Self::Persistence(PersistenceError::Storage(err))
    }
}

impl From<io::Error> for CoreError {
    fn from(err: io::Error) -> Self {
        Self::Persistence(PersistenceError::Io(err))
    }
}
