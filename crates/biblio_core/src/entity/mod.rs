//! Catalog entities.
//!
//! [`Book`] and [`Patron`] validate every field on construction and on
//! every setter, so an existing value is always well-formed. A [`Loan`]
//! names its patron and book by key; the [`Repository`] owns the single
//! instance behind each key.
//!
//! [`Repository`]: crate::Repository

mod book;
mod loan;
mod patron;

pub use book::Book;
pub use loan::{Loan, LOAN_PERIOD_DAYS};
pub use patron::{Patron, MAX_ACTIVE_LOANS};

use crate::error::ValidationError;

/// Trims `value` and fails if nothing is left.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Empty { field })
    } else {
        Ok(trimmed.to_string())
    }
}

/// Trims every author and fails on an empty list or a blank entry.
pub(crate) fn require_authors<S: AsRef<str>>(authors: &[S]) -> Result<Vec<String>, ValidationError> {
    if authors.is_empty() {
        return Err(ValidationError::NoAuthors);
    }
    authors
        .iter()
        .enumerate()
        .map(|(i, author)| {
            let trimmed = author.as_ref().trim();
            if trimmed.is_empty() {
                Err(ValidationError::EmptyAuthor { position: i + 1 })
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}
