use super::{require_authors, require_text};
use crate::error::{StateError, ValidationError};
use crate::types::Isbn;
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A catalog title with a count of copies on the shelf.
///
/// Two books are equal when their ISBNs are equal.
#[derive(Debug, Clone)]
pub struct Book {
    isbn: Isbn,
    title: String,
    authors: Vec<String>,
    publication_date: Option<NaiveDate>,
    available_copies: u32,
}

impl Book {
    /// Creates a new catalog entry. A new title must have at least one copy.
    ///
    /// Title and authors are trimmed; the author list is copied.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank title, an empty or blank
    /// author, a malformed ISBN or zero copies.
    pub fn new<S: AsRef<str>>(
        title: &str,
        authors: &[S],
        publication_date: Option<NaiveDate>,
        isbn: &str,
        available_copies: u32,
    ) -> Result<Self, ValidationError> {
        let book = Self::restore(title, authors, publication_date, isbn, available_copies)?;
        if book.available_copies < 1 {
            return Err(ValidationError::NoCopies);
        }
        Ok(book)
    }

    /// Rebuilds a book whose copies may all be on loan.
    ///
    /// Same checks as [`Book::new`] except that zero copies is accepted.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for any malformed field.
    pub fn restore<S: AsRef<str>>(
        title: &str,
        authors: &[S],
        publication_date: Option<NaiveDate>,
        isbn: &str,
        available_copies: u32,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            title: require_text("title", title)?,
            authors: require_authors(authors)?,
            isbn: Isbn::parse(isbn)?,
            publication_date,
            available_copies,
        })
    }

    /// Returns the ISBN.
    #[must_use]
    pub fn isbn(&self) -> &Isbn {
        &self.isbn
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the authors in order.
    #[must_use]
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Returns the publication date, if known.
    #[must_use]
    pub fn publication_date(&self) -> Option<NaiveDate> {
        self.publication_date
    }

    /// Returns the publication year, if known.
    #[must_use]
    pub fn publication_year(&self) -> Option<i32> {
        self.publication_date.map(|d| d.year())
    }

    /// Returns the number of copies on the shelf.
    #[must_use]
    pub fn available_copies(&self) -> u32 {
        self.available_copies
    }

    /// Returns true if at least one copy can be lent.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// Replaces the title.
    ///
    /// # Errors
    ///
    /// Returns `Empty` for a blank title; the book is unchanged.
    pub fn set_title(&mut self, title: &str) -> Result<(), ValidationError> {
        self.title = require_text("title", title)?;
        Ok(())
    }

    /// Replaces the author list.
    ///
    /// # Errors
    ///
    /// Returns `NoAuthors` or `EmptyAuthor`; the book is unchanged.
    pub fn set_authors<S: AsRef<str>>(&mut self, authors: &[S]) -> Result<(), ValidationError> {
        self.authors = require_authors(authors)?;
        Ok(())
    }

    /// Replaces the publication date.
    pub fn set_publication_date(&mut self, date: Option<NaiveDate>) {
        self.publication_date = date;
    }

    /// Puts one copy back on the shelf.
    pub fn increment_availability(&mut self) {
        self.available_copies = self.available_copies.saturating_add(1);
    }

    /// Takes one copy off the shelf.
    ///
    /// # Errors
    ///
    /// Returns `DecrementBelowZero` if no copies are left.
    pub fn decrement_availability(&mut self) -> Result<(), StateError> {
        if self.available_copies == 0 {
            return Err(StateError::DecrementBelowZero {
                isbn: self.isbn.clone(),
            });
        }
        self.available_copies -= 1;
        Ok(())
    }
}

impl PartialEq for Book {
    fn eq(&self, other: &Self) -> bool {
        self.isbn == other.isbn
    }
}

impl Eq for Book {}

impl Hash for Book {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.isbn.hash(state);
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({})", self.title, self.authors.join(", "), self.isbn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn clean_code() -> Book {
        Book::new(
            "Clean Code",
            &["Robert C. Martin"],
            Some(date(2008, 8, 1)),
            "9780132350884",
            2,
        )
        .unwrap()
    }

    #[test]
    fn new_validates_fields() {
        assert_eq!(
            Book::new("  ", &["A"], None, "9780132350884", 1),
            Err(ValidationError::Empty { field: "title" })
        );
        assert_eq!(
            Book::new::<&str>("T", &[], None, "9780132350884", 1),
            Err(ValidationError::NoAuthors)
        );
        assert!(matches!(
            Book::new("T", &["A"], None, "123", 1),
            Err(ValidationError::InvalidIsbn { .. })
        ));
        assert_eq!(
            Book::new("T", &["A"], None, "9780132350884", 0),
            Err(ValidationError::NoCopies)
        );
    }

    #[test]
    fn restore_accepts_zero_copies() {
        let book = Book::restore("T", &["A"], None, "9780132350884", 0).unwrap();
        assert!(!book.is_available());
    }

    #[test]
    fn fields_are_trimmed() {
        let book = Book::new(" Dune ", &[" Frank Herbert"], None, " 0441172717 ", 1).unwrap();
        assert_eq!(book.title(), "Dune");
        assert_eq!(book.authors(), ["Frank Herbert"]);
        assert_eq!(book.isbn().as_str(), "0441172717");
        assert_eq!(book.publication_year(), None);
    }

    #[test]
    fn authors_are_copied() {
        let mut authors = vec!["Gamma".to_string(), "Helm".to_string()];
        let book = Book::new("Design Patterns", &authors, None, "9780201633610", 1).unwrap();
        authors.push("Johnson".to_string());
        assert_eq!(book.authors().len(), 2);
    }

    #[test]
    fn availability_round_trip() {
        let mut book = clean_code();
        book.decrement_availability().unwrap();
        book.decrement_availability().unwrap();
        assert_eq!(book.available_copies(), 0);
        assert_eq!(
            book.decrement_availability(),
            Err(StateError::DecrementBelowZero {
                isbn: book.isbn().clone()
            })
        );
        assert_eq!(book.available_copies(), 0);

        book.increment_availability();
        assert_eq!(book.available_copies(), 1);
    }

    #[test]
    fn failed_setter_leaves_book_unchanged() {
        let mut book = clean_code();
        assert!(book.set_title("").is_err());
        assert!(book.set_authors(&["ok", ""]).is_err());
        assert_eq!(book.title(), "Clean Code");
        assert_eq!(book.authors(), ["Robert C. Martin"]);

        book.set_title("Clean Code 2nd").unwrap();
        book.set_publication_date(None);
        assert_eq!(book.title(), "Clean Code 2nd");
        assert_eq!(book.publication_date(), None);
    }

    #[test]
    fn equality_is_by_isbn() {
        let a = clean_code();
        let b = Book::new("Other", &["X"], None, "9780132350884", 9).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.publication_year(), Some(2008));
    }
}
