//! Library statistics.
//!
//! A point-in-time snapshot of catalog, registry and lending figures.
//!
//! ```rust,ignore
//! let stats = repo.stats(today);
//! println!("{} of {} loans overdue", stats.overdue_loans, stats.active_loans);
//! ```

use crate::repository::Repository;
use chrono::NaiveDate;

/// Snapshot of library figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryStats {
    /// Number of catalog titles.
    pub books: usize,
    /// Copies on the shelf across all titles.
    pub copies_available: u64,
    /// Titles with no copy on the shelf.
    pub books_unavailable: usize,
    /// Number of registered patrons.
    pub patrons: usize,
    /// Number of active loans.
    pub active_loans: usize,
    /// Loans past their due date.
    pub overdue_loans: usize,
    /// Patrons who cannot borrow any more.
    pub patrons_at_limit: usize,
}

impl Repository {
    /// Computes statistics as of `today`.
    #[must_use]
    pub fn stats(&self, today: NaiveDate) -> LibraryStats {
        LibraryStats {
            books: self.book_count(),
            copies_available: self.books().map(|b| u64::from(b.available_copies())).sum(),
            books_unavailable: self.books().filter(|b| !b.is_available()).count(),
            patrons: self.patron_count(),
            active_loans: self.loan_count(),
            overdue_loans: self.loans().filter(|l| l.is_overdue(today)).count(),
            patrons_at_limit: self.patrons().filter(|p| !p.can_borrow()).count(),
        }
    }
}
