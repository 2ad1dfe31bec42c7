//! In-memory catalog of books, patrons and active loans.

use crate::entity::{Book, Loan, Patron, MAX_ACTIVE_LOANS};
use crate::error::{CoreResult, IntegrityError};
use crate::types::{Isbn, LoanId, MemberNumber};
use indexmap::IndexMap;
use std::fmt;
use tracing::debug;

/// Owner of every book, patron and active loan.
///
/// Each collection is keyed by its entity's unique key and keeps insertion
/// order. A loan names its book and patron by key; [`Repository::book_of`]
/// and [`Repository::patron_of`] resolve those keys to the one instance held
/// here.
///
/// Mutations that touch more than one entity go through the lending engine
/// ([`Repository::grant_loan`], [`Repository::return_loan`]).
#[derive(Debug, Default)]
pub struct Repository {
    books: IndexMap<Isbn, Book>,
    patrons: IndexMap<MemberNumber, Patron>,
    loans: IndexMap<LoanId, Loan>,
    next_loan_id: u64,
}

impl Repository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ---- books ----

    /// Adds a book to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateIsbn` if a book with the same ISBN exists.
    pub fn add_book(&mut self, book: Book) -> CoreResult<()> {
        if self.books.contains_key(book.isbn()) {
            return Err(IntegrityError::DuplicateIsbn {
                isbn: book.isbn().clone(),
            }
            .into());
        }
        debug!(isbn = %book.isbn(), "book added");
        self.books.insert(book.isbn().clone(), book);
        Ok(())
    }

    /// Removes a book that no loan references.
    ///
    /// # Errors
    ///
    /// Returns `BookNotFound`, or `BookOnLoan` if any active loan
    /// references it.
    pub fn remove_book(&mut self, isbn: &Isbn) -> CoreResult<Book> {
        if !self.books.contains_key(isbn) {
            return Err(IntegrityError::BookNotFound { isbn: isbn.clone() }.into());
        }
        let loans = self.loans_for_book(isbn).count();
        if loans > 0 {
            return Err(IntegrityError::BookOnLoan {
                isbn: isbn.clone(),
                loans,
            }
            .into());
        }
        debug!(%isbn, "book removed");
        self.books
            .shift_remove(isbn)
            .ok_or_else(|| IntegrityError::BookNotFound { isbn: isbn.clone() }.into())
    }

    /// Looks up a book by ISBN.
    #[must_use]
    pub fn find_book_by_isbn(&self, isbn: &Isbn) -> Option<&Book> {
        self.books.get(isbn)
    }

    /// Mutable access to a book for editing its descriptive fields.
    pub fn book_mut(&mut self, isbn: &Isbn) -> Option<&mut Book> {
        self.books.get_mut(isbn)
    }

    /// Iterates books in insertion order.
    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }

    /// Number of catalog titles.
    #[must_use]
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    // ---- patrons ----

    /// Registers a patron.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateMemberNumber` if the member number is taken.
    pub fn add_patron(&mut self, patron: Patron) -> CoreResult<()> {
        if self.patrons.contains_key(patron.member_number()) {
            return Err(IntegrityError::DuplicateMemberNumber {
                member_number: patron.member_number().clone(),
            }
            .into());
        }
        debug!(member_number = %patron.member_number(), "patron added");
        self.patrons.insert(patron.member_number().clone(), patron);
        Ok(())
    }

    /// Removes a patron that no loan references.
    ///
    /// # Errors
    ///
    /// Returns `PatronNotFound`, or `PatronHasLoans` if any active loan
    /// references them.
    pub fn remove_patron(&mut self, member_number: &MemberNumber) -> CoreResult<Patron> {
        if !self.patrons.contains_key(member_number) {
            return Err(IntegrityError::PatronNotFound {
                member_number: member_number.clone(),
            }
            .into());
        }
        let loans = self
            .loans
            .values()
            .filter(|l| l.member_number() == member_number)
            .count();
        if loans > 0 {
            return Err(IntegrityError::PatronHasLoans {
                member_number: member_number.clone(),
                loans,
            }
            .into());
        }
        debug!(%member_number, "patron removed");
        self.patrons.shift_remove(member_number).ok_or_else(|| {
            IntegrityError::PatronNotFound {
                member_number: member_number.clone(),
            }
            .into()
        })
    }

    /// Looks up a patron by member number.
    #[must_use]
    pub fn find_patron_by_member_number(&self, member_number: &MemberNumber) -> Option<&Patron> {
        self.patrons.get(member_number)
    }

    /// Mutable access to a patron for editing their descriptive fields.
    pub fn patron_mut(&mut self, member_number: &MemberNumber) -> Option<&mut Patron> {
        self.patrons.get_mut(member_number)
    }

    /// Iterates patrons in insertion order.
    pub fn patrons(&self) -> impl Iterator<Item = &Patron> {
        self.patrons.values()
    }

    /// Number of registered patrons.
    #[must_use]
    pub fn patron_count(&self) -> usize {
        self.patrons.len()
    }

    // ---- loans ----

    /// Looks up an active loan.
    #[must_use]
    pub fn loan(&self, id: LoanId) -> Option<&Loan> {
        self.loans.get(&id)
    }

    /// Iterates active loans in the order they were granted.
    pub fn loans(&self) -> impl Iterator<Item = &Loan> {
        self.loans.values()
    }

    /// Number of active loans.
    #[must_use]
    pub fn loan_count(&self) -> usize {
        self.loans.len()
    }

    /// Iterates a patron's loans in the order of their active-loan list.
    pub fn loans_for_patron<'a>(
        &'a self,
        member_number: &MemberNumber,
    ) -> impl Iterator<Item = &'a Loan> + 'a {
        self.patrons
            .get(member_number)
            .map(Patron::active_loans)
            .unwrap_or_default()
            .iter()
            .filter_map(move |id| self.loans.get(id))
    }

    /// Iterates loans of one book.
    pub fn loans_for_book<'a>(&'a self, isbn: &'a Isbn) -> impl Iterator<Item = &'a Loan> + 'a {
        self.loans.values().filter(move |l| l.isbn() == isbn)
    }

    /// Resolves the book a loan refers to.
    #[must_use]
    pub fn book_of(&self, loan: &Loan) -> Option<&Book> {
        self.books.get(loan.isbn())
    }

    /// Resolves the patron a loan refers to.
    #[must_use]
    pub fn patron_of(&self, loan: &Loan) -> Option<&Patron> {
        self.patrons.get(loan.member_number())
    }

    /// Returns true if the repository holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.patrons.is_empty() && self.loans.is_empty()
    }

    /// The id the next loan will get.
    pub(crate) fn next_loan_id(&self) -> LoanId {
        LoanId::new(self.next_loan_id + 1)
    }

    /// Attaches `loan` to its patron and registers it. The book's copy count
    /// is not touched.
    pub(crate) fn link_loan(&mut self, loan: Loan) -> CoreResult<()> {
        if !self.books.contains_key(loan.isbn()) {
            return Err(IntegrityError::BookNotFound {
                isbn: loan.isbn().clone(),
            }
            .into());
        }
        let patron = self.patrons.get_mut(loan.member_number()).ok_or_else(|| {
            IntegrityError::PatronNotFound {
                member_number: loan.member_number().clone(),
            }
        })?;
        patron.attach_loan(&loan)?;

        self.next_loan_id = self.next_loan_id.max(loan.id().as_u64());
        self.loans.insert(loan.id(), loan);
        Ok(())
    }

    /// Detaches and unregisters a loan. The book's copy count is not
    /// touched.
    pub(crate) fn unlink_loan(&mut self, id: LoanId) -> CoreResult<Loan> {
        let loan = self
            .loans
            .shift_remove(&id)
            .ok_or(IntegrityError::LoanNotFound { id })?;
        if let Some(patron) = self.patrons.get_mut(loan.member_number()) {
            patron.detach_loan(id);
        }
        Ok(loan)
    }

    /// Checks every cross-entity invariant and returns what is broken.
    ///
    /// An empty result means every loan resolves, appears exactly once in
    /// its patron's list, and no patron exceeds the loan limit.
    #[must_use]
    pub fn check_integrity(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        for loan in self.loans.values() {
            if !self.books.contains_key(loan.isbn()) {
                violations.push(Violation::DanglingBook {
                    loan: loan.id(),
                    isbn: loan.isbn().clone(),
                });
            }
            match self.patrons.get(loan.member_number()) {
                None => violations.push(Violation::DanglingPatron {
                    loan: loan.id(),
                    member_number: loan.member_number().clone(),
                }),
                Some(patron) => {
                    let listed = patron.active_loans().iter().filter(|id| **id == loan.id()).count();
                    if listed != 1 {
                        violations.push(Violation::NotListed {
                            loan: loan.id(),
                            member_number: patron.member_number().clone(),
                            times: listed,
                        });
                    }
                }
            }
        }

        for patron in self.patrons.values() {
            if patron.active_loan_count() > MAX_ACTIVE_LOANS {
                violations.push(Violation::OverLimit {
                    member_number: patron.member_number().clone(),
                    count: patron.active_loan_count(),
                });
            }
            for id in patron.active_loans() {
                match self.loans.get(id) {
                    Some(loan) if loan.member_number() == patron.member_number() => {}
                    _ => violations.push(Violation::StaleListEntry {
                        member_number: patron.member_number().clone(),
                        loan: *id,
                    }),
                }
            }
        }

        violations
    }
}

/// A broken cross-entity invariant found by [`Repository::check_integrity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A loan names a book that is not in the catalog.
    DanglingBook {
        /// The loan.
        loan: LoanId,
        /// The missing book.
        isbn: Isbn,
    },
    /// A loan names a patron who is not registered.
    DanglingPatron {
        /// The loan.
        loan: LoanId,
        /// The missing patron.
        member_number: MemberNumber,
    },
    /// A loan is missing from, or repeated in, its patron's list.
    NotListed {
        /// The loan.
        loan: LoanId,
        /// Its patron.
        member_number: MemberNumber,
        /// How often it appears.
        times: usize,
    },
    /// A patron lists a loan that is not active or not theirs.
    StaleListEntry {
        /// The patron.
        member_number: MemberNumber,
        /// The listed loan.
        loan: LoanId,
    },
    /// A patron holds more loans than allowed.
    OverLimit {
        /// The patron.
        member_number: MemberNumber,
        /// Number of active loans.
        count: usize,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingBook { loan, isbn } => write!(f, "{loan} names unknown book {isbn}"),
            Self::DanglingPatron { loan, member_number } => {
                write!(f, "{loan} names unknown patron {member_number}")
            }
            Self::NotListed {
                loan,
                member_number,
                times,
            } => write!(f, "{loan} appears {times} time(s) in the list of {member_number}"),
            Self::StaleListEntry {
                member_number,
                loan,
            } => write!(f, "{member_number} lists {loan}, which is not theirs"),
            Self::OverLimit {
                member_number,
                count,
            } => write!(f, "{member_number} holds {count} loans"),
        }
    }
}
