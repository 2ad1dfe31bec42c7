//! Test fixtures and library helpers.
//!
//! Provides temporary stores, sample entities and a deterministic demo
//! library.

use biblio_core::{Book, Config, Isbn, LibraryStore, MemberNumber, Patron, Repository};
use chrono::{Days, Months, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A library store with automatic cleanup.
pub struct TestLibrary {
    /// The store.
    pub store: LibraryStore,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestLibrary {
    /// Creates an in-memory store.
    pub fn memory() -> Self {
        Self {
            store: LibraryStore::in_memory(),
            _temp_dir: None,
        }
    }

    /// Creates a store in a fresh temporary data directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = LibraryStore::open(
            &temp_dir.path().join("library"),
            Config::new().sync_on_save(false),
        )
        .expect("Failed to open library store");
        Self {
            store,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the data directory if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self._temp_dir.as_ref().map(|d| d.path().join("library"))
    }

    /// Closes the store, releasing the directory lock, and reopens it.
    pub fn reopen(self) -> Self {
        let Self { store, _temp_dir } = self;
        let Some(temp_dir) = _temp_dir else {
            return Self {
                store,
                _temp_dir: None,
            };
        };
        drop(store);
        let store = LibraryStore::open(
            &temp_dir.path().join("library"),
            Config::new().sync_on_save(false),
        )
        .expect("Failed to reopen library store");
        Self {
            store,
            _temp_dir: Some(temp_dir),
        }
    }
}

impl std::ops::Deref for TestLibrary {
    type Target = LibraryStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl std::ops::DerefMut for TestLibrary {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.store
    }
}

/// Runs a test with a temporary file-backed store.
pub fn with_file_library<F, R>(f: F) -> R
where
    F: FnOnce(&mut LibraryStore, &Path) -> R,
{
    let mut library = TestLibrary::file();
    let path = library.path().expect("File library should have a path");
    f(&mut library.store, &path)
}

/// Shorthand for a calendar date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("Invalid date")
}

/// Parses an ISBN.
pub fn isbn(value: &str) -> Isbn {
    Isbn::parse(value).expect("Invalid ISBN")
}

/// Parses a member number.
pub fn member(value: &str) -> MemberNumber {
    MemberNumber::parse(value).expect("Invalid member number")
}

/// "Clean Code" with `copies` copies (zero allowed).
pub fn sample_book(copies: u32) -> Book {
    Book::restore(
        "Clean Code",
        &["R. C. Martin"],
        Some(date(2008, 8, 1)),
        "9780132350884",
        copies,
    )
    .expect("Invalid sample book")
}

/// A patron with member number `05121` followed by `n` as five digits.
pub fn sample_patron(n: u32) -> Patron {
    Patron::new(
        "Mario",
        "Rossi",
        &format!("05121{n:05}"),
        &format!("mario.rossi{n}@studenti.unisa.it"),
    )
    .expect("Invalid sample patron")
}

const TITLES: &[&str] = &[
    "Clean Code",
    "The Pragmatic Programmer",
    "Design Patterns",
    "Introduction to Algorithms",
    "Head First Java",
    "Effective Java",
    "Refactoring",
    "Code Complete",
    "Artificial Intelligence",
    "Computer Networking",
    "Operating System Concepts",
    "Database System Concepts",
    "Compilers",
    "C Programming Language",
    "Java Concurrency",
    "Domain-Driven Design",
    "The Mythical Man-Month",
    "Sistemi Operativi",
    "Reti di Calcolatori",
    "Ingegneria del Software",
];

const AUTHORS: &[&str] = &[
    "Robert C. Martin",
    "Andy Hunt",
    "Erich Gamma",
    "Thomas Cormen",
    "Kathy Sierra",
    "Joshua Bloch",
    "Martin Fowler",
    "Steve McConnell",
    "Stuart Russell",
    "Andrew Tanenbaum",
    "Abraham Silberschatz",
    "Brian Kernighan",
    "Dennis Ritchie",
    "Eric Evans",
    "Fred Brooks",
];

const FIRST_NAMES: &[&str] = &[
    "Mario", "Luigi", "Giovanna", "Anna", "Paolo", "Francesca", "Alessandro", "Elena", "Davide",
    "Sofia", "Marco", "Giulia",
];

const LAST_NAMES: &[&str] = &[
    "Rossi", "Bianchi", "Verdi", "Esposito", "Russo", "Romano", "Ferrari", "Gallo", "Costa",
    "Fontana", "Conti", "Greco",
];

/// Number of books in the demo library.
pub const DEMO_BOOKS: usize = 40;
/// Number of patrons in the demo library.
pub const DEMO_PATRONS: usize = 30;
/// Number of loan attempts when building the demo library.
pub const DEMO_LOAN_ATTEMPTS: usize = 25;

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Builds a realistic demo library, reproducible from `seed`.
///
/// 40 books with 3 to 10 copies and ISBNs `97888` + 8 digits, 30 patrons
/// with member numbers `05121` + 5 digits, and up to 25 loans started
/// within the 120 days before `today`. Loan attempts that the lending
/// engine refuses are skipped.
pub fn demo_repository(seed: u64, today: NaiveDate) -> Repository {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut repo = Repository::new();

    for i in 0..DEMO_BOOKS {
        let base = pick(&mut rng, TITLES);
        let title = if i % 3 == 0 {
            format!("{base} (Ed. Speciale)")
        } else {
            base.to_string()
        };
        let mut authors = vec![pick(&mut rng, AUTHORS)];
        if rng.gen_bool(0.5) {
            authors.push(pick(&mut rng, AUTHORS));
        }
        let published = today
            .checked_sub_months(Months::new(12 * rng.gen_range(0..20)))
            .and_then(|d| d.checked_sub_days(Days::new(rng.gen_range(0..365))));
        let copies = rng.gen_range(3..=10);

        let book = Book::new(
            &title,
            &authors,
            published,
            &format!("97888{:08}", i * 1234),
            copies,
        )
        .expect("Invalid demo book");
        repo.add_book(book).expect("Duplicate demo book");
    }

    for i in 1..=DEMO_PATRONS {
        let first = pick(&mut rng, FIRST_NAMES);
        let last = pick(&mut rng, LAST_NAMES);
        let email = format!(
            "{}.{}{i}@studenti.unisa.it",
            first.to_lowercase(),
            last.to_lowercase()
        );
        let patron =
            Patron::new(first, last, &format!("05121{i:05}"), &email).expect("Invalid demo patron");
        repo.add_patron(patron).expect("Duplicate demo patron");
    }

    let members: Vec<MemberNumber> = repo.patrons().map(|p| p.member_number().clone()).collect();
    let isbns: Vec<Isbn> = repo.books().map(|b| b.isbn().clone()).collect();
    for _ in 0..DEMO_LOAN_ATTEMPTS {
        let member = &members[rng.gen_range(0..members.len())];
        let isbn = &isbns[rng.gen_range(0..isbns.len())];
        let start = today
            .checked_sub_days(Days::new(rng.gen_range(0..120)))
            .unwrap_or(today);
        // Refusals (no copies, patron at limit) are part of the simulation.
        let _ = repo.grant_loan(member, isbn, start);
    }

    repo
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_repository_shape() {
        let today = date(2024, 6, 1);
        let repo = demo_repository(7, today);

        assert_eq!(repo.book_count(), DEMO_BOOKS);
        assert_eq!(repo.patron_count(), DEMO_PATRONS);
        assert!(repo.loan_count() <= DEMO_LOAN_ATTEMPTS);
        assert!(repo.loan_count() > 0);
        assert!(repo.check_integrity().is_empty());

        assert!(repo.find_book_by_isbn(&isbn("9788800000000")).is_some());
        assert!(repo.find_book_by_isbn(&isbn("9788800048126")).is_some());
        assert!(repo
            .find_patron_by_member_number(&member("0512100030"))
            .is_some());

        for loan in repo.loans() {
            assert!(loan.start_date() <= today);
            assert!(loan.start_date() > today - Days::new(120));
        }
        for book in repo.books() {
            assert!(book.available_copies() <= 10);
        }
    }

    #[test]
    fn demo_repository_is_deterministic() {
        let today = date(2024, 6, 1);
        let a = demo_repository(42, today);
        let b = demo_repository(42, today);

        let titles = |r: &Repository| r.books().map(|b| b.title().to_string()).collect::<Vec<_>>();
        assert_eq!(titles(&a), titles(&b));
        let loans = |r: &Repository| {
            r.loans()
                .map(|l| (l.member_number().clone(), l.isbn().clone(), l.start_date()))
                .collect::<Vec<_>>()
        };
        assert_eq!(loans(&a), loans(&b));
    }

    #[test]
    fn file_library_has_a_path() {
        let library = TestLibrary::file();
        assert!(library.path().unwrap().is_dir());
        assert!(TestLibrary::memory().path().is_none());
    }

    #[test]
    fn sample_entities() {
        assert_eq!(sample_book(0).available_copies(), 0);
        assert_eq!(sample_patron(3).member_number().as_str(), "0512100003");
    }
}
