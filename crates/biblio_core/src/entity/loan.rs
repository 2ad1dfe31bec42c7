use crate::entity::{Book, Patron};
use crate::error::ValidationError;
use crate::types::{Isbn, LoanId, MemberNumber};
use chrono::{Days, Local, NaiveDate};
use std::fmt;

/// Length of a loan in days.
pub const LOAN_PERIOD_DAYS: u64 = 60;

/// An active lending of one copy of a book to a patron.
///
/// The due date is always `start_date + LOAN_PERIOD_DAYS` and is derived
/// once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    id: LoanId,
    member_number: MemberNumber,
    isbn: Isbn,
    start_date: NaiveDate,
    due_date: NaiveDate,
}

impl Loan {
    /// Creates a loan of `book` to `patron` starting on `start_date`.
    ///
    /// This only builds the value: it does not check availability, touch
    /// the book's copy count or attach the loan to the patron. Use
    /// [`Repository::grant_loan`] for that.
    ///
    /// [`Repository::grant_loan`]: crate::Repository::grant_loan
    ///
    /// # Errors
    ///
    /// Returns `DueDateOutOfRange` if `start_date + LOAN_PERIOD_DAYS` is
    /// past [`NaiveDate::MAX`].
    pub fn new(
        id: LoanId,
        patron: &Patron,
        book: &Book,
        start_date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let due_date = start_date
            .checked_add_days(Days::new(LOAN_PERIOD_DAYS))
            .ok_or(ValidationError::DueDateOutOfRange { start_date })?;
        Ok(Self {
            id,
            member_number: patron.member_number().clone(),
            isbn: book.isbn().clone(),
            start_date,
            due_date,
        })
    }

    /// Returns the loan id.
    #[must_use]
    pub fn id(&self) -> LoanId {
        self.id
    }

    /// Returns the borrowing patron's member number.
    #[must_use]
    pub fn member_number(&self) -> &MemberNumber {
        &self.member_number
    }

    /// Returns the lent book's ISBN.
    #[must_use]
    pub fn isbn(&self) -> &Isbn {
        &self.isbn
    }

    /// Returns the start date.
    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Returns the due date.
    #[must_use]
    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    /// Returns true if `today` is strictly after the due date.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        today > self.due_date
    }

    /// Signed whole days from `today` to the due date. Negative once overdue.
    #[must_use]
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        self.due_date.signed_duration_since(today).num_days()
    }

    /// [`Loan::is_overdue`] against the local calendar date.
    #[must_use]
    pub fn is_overdue_today(&self) -> bool {
        self.is_overdue(Local::now().date_naive())
    }

    /// [`Loan::days_until_due`] against the local calendar date.
    #[must_use]
    pub fn days_until_due_today(&self) -> i64 {
        self.days_until_due(Local::now().date_naive())
    }
}

impl fmt::Display for Loan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} ({} to {})",
            self.id, self.isbn, self.member_number, self.start_date, self.due_date
        )
    }
}
