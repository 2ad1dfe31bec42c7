//! Lending engine: the only code that creates or ends loans.
//!
//! Both operations check every precondition before changing anything, so
//! a refused request leaves the repository exactly as it was.

use crate::entity::{Loan, MAX_ACTIVE_LOANS};
use crate::error::{CoreResult, IntegrityError, StateError};
use crate::repository::Repository;
use crate::types::{Isbn, LoanId, MemberNumber};
use chrono::NaiveDate;
use tracing::{info, warn};

impl Repository {
    /// Lends one copy of a book to a patron.
    ///
    /// On success the book has one copy fewer, the loan is registered and
    /// it is appended to the patron's active-loan list.
    ///
    /// # Errors
    ///
    /// - `PatronNotFound` / `BookNotFound` for unknown keys
    /// - `BookUnavailable` when no copy is on the shelf
    /// - `LoanLimitExceeded` when the patron already holds the maximum
    /// - `DueDateOutOfRange` when the due date cannot be represented
    ///
    /// In every error case nothing is changed.
    pub fn grant_loan(
        &mut self,
        member_number: &MemberNumber,
        isbn: &Isbn,
        start_date: NaiveDate,
    ) -> CoreResult<Loan> {
        let patron = self
            .find_patron_by_member_number(member_number)
            .ok_or_else(|| IntegrityError::PatronNotFound {
                member_number: member_number.clone(),
            })?;
        let book = self
            .find_book_by_isbn(isbn)
            .ok_or_else(|| IntegrityError::BookNotFound { isbn: isbn.clone() })?;

        if !book.is_available() {
            warn!(%isbn, %member_number, "loan refused: no copies available");
            return Err(StateError::BookUnavailable { isbn: isbn.clone() }.into());
        }
        if !patron.can_borrow() {
            warn!(%isbn, %member_number, "loan refused: loan limit reached");
            return Err(StateError::LoanLimitExceeded {
                member_number: member_number.clone(),
                limit: MAX_ACTIVE_LOANS,
            }
            .into());
        }

        let loan = Loan::new(self.next_loan_id(), patron, book, start_date)?;

        if let Some(book) = self.book_mut(isbn) {
            book.decrement_availability()?;
        }
        if let Err(err) = self.link_loan(loan.clone()) {
            // Undo the decrement.
            if let Some(book) = self.book_mut(isbn) {
                book.increment_availability();
            }
            return Err(err);
        }

        info!(loan = %loan.id(), %isbn, %member_number, due = %loan.due_date(), "loan granted");
        Ok(loan)
    }

    /// Ends a loan and puts the copy back on the shelf.
    ///
    /// # Errors
    ///
    /// Returns `LoanNotFound` if the loan is not active (for example,
    /// already returned), or `BookNotFound` if its book has disappeared.
    /// In both cases nothing is changed.
    pub fn return_loan(&mut self, id: LoanId) -> CoreResult<Loan> {
        let loan = self
            .loan(id)
            .ok_or(IntegrityError::LoanNotFound { id })?;
        let isbn = loan.isbn().clone();
        if self.find_book_by_isbn(&isbn).is_none() {
            return Err(IntegrityError::BookNotFound { isbn }.into());
        }

        let loan = self.unlink_loan(id)?;
        if let Some(book) = self.book_mut(&isbn) {
            book.increment_availability();
        }

        info!(loan = %id, %isbn, member_number = %loan.member_number(), "loan returned");
        Ok(loan)
    }
}

/// Lends one copy of `isbn` to `member_number`. See [`Repository::grant_loan`].
///
/// # Errors
///
/// Same as [`Repository::grant_loan`].
pub fn grant_loan(
    repository: &mut Repository,
    member_number: &MemberNumber,
    isbn: &Isbn,
    start_date: NaiveDate,
) -> CoreResult<Loan> {
    repository.grant_loan(member_number, isbn, start_date)
}

/// Ends loan `id`. See [`Repository::return_loan`].
///
/// # Errors
///
/// Same as [`Repository::return_loan`].
pub fn return_loan(repository: &mut Repository, id: LoanId) -> CoreResult<Loan> {
    repository.return_loan(id)
}
