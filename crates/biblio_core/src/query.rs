//! Search filters over the repository.
//!
//! All text filters are case-insensitive substring matches. An empty needle
//! matches everything.

use crate::entity::{Book, Loan, Patron};
use crate::repository::Repository;
use chrono::NaiveDate;

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Which book field to search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    /// Match the title.
    Title(String),
    /// Match the ISBN as written.
    Isbn(String),
    /// Match any author.
    Author(String),
    /// Match the publication year. Books without a date never match a
    /// non-empty needle.
    Year(String),
}

impl BookFilter {
    /// Returns true if `book` matches.
    #[must_use]
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            Self::Title(needle) => contains(book.title(), needle),
            Self::Isbn(needle) => contains(book.isbn().as_str(), needle),
            Self::Author(needle) => book.authors().iter().any(|a| contains(a, needle)),
            Self::Year(needle) => match book.publication_year() {
                Some(year) => contains(&year.to_string(), needle),
                None => needle.trim().is_empty(),
            },
        }
    }
}

/// Which patron field to search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatronFilter {
    /// Match the last name.
    LastName(String),
    /// Match the member number.
    MemberNumber(String),
    /// Match the email address.
    Email(String),
}

impl PatronFilter {
    /// Returns true if `patron` matches.
    #[must_use]
    pub fn matches(&self, patron: &Patron) -> bool {
        match self {
            Self::LastName(needle) => contains(patron.last_name(), needle),
            Self::MemberNumber(needle) => contains(patron.member_number().as_str(), needle),
            Self::Email(needle) => contains(patron.email(), needle),
        }
    }
}

/// Which loan attribute to search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanFilter {
    /// Match the borrowing patron's last name.
    PatronLastName(String),
    /// Match the lent book's title.
    BookTitle(String),
}

impl LoanFilter {
    /// Returns true if `loan` matches. Loans whose patron or book cannot be
    /// resolved in `repository` never match.
    #[must_use]
    pub fn matches(&self, loan: &Loan, repository: &Repository) -> bool {
        match self {
            Self::PatronLastName(needle) => repository
                .patron_of(loan)
                .is_some_and(|p| contains(p.last_name(), needle)),
            Self::BookTitle(needle) => repository
                .book_of(loan)
                .is_some_and(|b| contains(b.title(), needle)),
        }
    }
}

impl Repository {
    /// Books matching `filter`, in catalog order.
    pub fn search_books<'a>(&'a self, filter: &'a BookFilter) -> impl Iterator<Item = &'a Book> + 'a {
        self.books().filter(move |b| filter.matches(b))
    }

    /// Patrons matching `filter`, in registration order.
    pub fn search_patrons<'a>(
        &'a self,
        filter: &'a PatronFilter,
    ) -> impl Iterator<Item = &'a Patron> + 'a {
        self.patrons().filter(move |p| filter.matches(p))
    }

    /// Loans matching `filter`, in the order they were granted.
    pub fn search_loans<'a>(&'a self, filter: &'a LoanFilter) -> impl Iterator<Item = &'a Loan> + 'a {
        self.loans().filter(move |l| filter.matches(l, self))
    }

    /// Loans that are overdue on `today`, most overdue first.
    #[must_use]
    pub fn overdue_loans(&self, today: NaiveDate) -> Vec<&Loan> {
        let mut overdue: Vec<&Loan> = self.loans().filter(|l| l.is_overdue(today)).collect();
        overdue.sort_by_key(|l| l.due_date());
        overdue
    }
}
