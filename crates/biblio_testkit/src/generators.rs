//! Property-based test generators using proptest.
//!
//! Provides strategies for generating valid keys, entities and lending
//! workloads.

use biblio_core::{Book, Patron};
use chrono::NaiveDate;
use proptest::prelude::*;

/// Strategy for generating valid 13-digit ISBNs.
pub fn isbn13_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("97[89][0-9]{10}").expect("Invalid regex")
}

/// Strategy for generating valid ISBNs in any accepted shape: 10 or 13
/// digits, optionally hyphenated, optionally ending in `X`.
pub fn isbn_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        isbn13_strategy(),
        prop::string::string_regex("[0-9]{9}[0-9Xx]").expect("Invalid regex"),
        isbn13_strategy()
            .prop_map(|s| format!("{}-{}-{}-{}", &s[..3], &s[3..5], &s[5..12], &s[12..])),
    ]
}

/// Strategy for generating valid member numbers.
pub fn member_number_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9]{10}").expect("Invalid regex")
}

/// Strategy for generating valid email addresses.
pub fn email_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9._%+-]{1,12}@[a-z0-9-]{1,10}\\.[a-z]{2,6}")
        .expect("Invalid regex")
}

/// Strategy for generating non-blank free text made of letters, digits,
/// spaces, punctuation and the record separators.
pub fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9 ;,\\\\'.()-]{0,24}")
        .expect("Invalid regex")
        .prop_map(|s| format!("x{}x", s.trim()))
}

/// Strategy for generating dates between 1900 and 2100.
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1900i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("Invalid date"))
}

/// Strategy for generating valid books with a copy count in `copies`.
pub fn book_strategy(copies: std::ops::Range<u32>) -> impl Strategy<Value = Book> {
    (
        text_strategy(),
        prop::collection::vec(text_strategy(), 1..4),
        prop::option::of(date_strategy()),
        isbn_strategy(),
        copies,
    )
        .prop_map(|(title, authors, date, isbn, copies)| {
            Book::restore(&title, &authors, date, &isbn, copies).expect("Invalid generated book")
        })
}

/// Strategy for generating valid patrons.
pub fn patron_strategy() -> impl Strategy<Value = Patron> {
    (
        text_strategy(),
        text_strategy(),
        member_number_strategy(),
        email_strategy(),
    )
        .prop_map(|(first, last, member, email)| {
            Patron::new(&first, &last, &member, &email).expect("Invalid generated patron")
        })
}

/// An operation against the lending engine.
#[derive(Debug, Clone)]
pub enum LendingOp {
    /// Grant a loan of book `book` to patron `patron` (indices into the
    /// fixture's lists).
    Grant {
        /// Patron index.
        patron: usize,
        /// Book index.
        book: usize,
        /// Days after the base date.
        day: u16,
    },
    /// Return the n-th active loan, if any.
    Return {
        /// Index into the active loans.
        nth: usize,
    },
}

/// Strategy for generating lending operations over `patrons` patrons and
/// `books` books.
pub fn lending_op_strategy(patrons: usize, books: usize) -> impl Strategy<Value = LendingOp> {
    prop_oneof![
        3 => (0..patrons, 0..books, 0u16..400)
            .prop_map(|(patron, book, day)| LendingOp::Grant { patron, book, day }),
        1 => (0usize..8).prop_map(|nth| LendingOp::Return { nth }),
    ]
}

/// Strategy for generating a sequence of lending operations.
pub fn lending_sequence_strategy(
    patrons: usize,
    books: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<LendingOp>> {
    prop::collection::vec(lending_op_strategy(patrons, books), 0..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
