use super::records::{self, LoanRecord};
use super::{LoadReport, SaveReport, BOOKS_KIND, FORMAT_VERSION, LOANS_KIND, PATRONS_KIND};
use crate::config::{Config, UnresolvedLoanPolicy};
use crate::dir::{DataDir, BOOKS_FILE, LOANS_FILE, PATRONS_FILE};
use crate::entity::Loan;
use crate::error::{
    CoreError, CoreResult, PersistenceError, ReferentialLoadError, StateError, UnresolvedReason,
};
use crate::repository::Repository;
use crate::types::{Isbn, MemberNumber};
use biblio_codec::{from_document, to_document, DecodedRecord, Header, Record};
use biblio_storage::{InMemoryBackend, StorageBackend, StorageResult};
use std::fmt;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Loads and saves a [`Repository`].
///
/// Each entity kind is stored through its own [`StorageBackend`]. Every
/// save replaces each file as a whole and stamps all three with the same
/// save generation, so a load can tell whether the files belong together.
///
/// # Example
///
/// ```rust,ignore
/// use biblio_core::{Config, LibraryStore};
///
/// let mut store = LibraryStore::open(Path::new("library"), Config::default())?;
/// let (mut repo, report) = store.load()?;
/// for skipped in &report.skipped_loans {
///     eprintln!("{skipped}");
/// }
/// // ... mutate repo ...
/// store.save(&repo)?;
/// ```
pub struct LibraryStore {
    config: Config,
    books: Box<dyn StorageBackend>,
    patrons: Box<dyn StorageBackend>,
    loans: Box<dyn StorageBackend>,
    dir: Option<DataDir>,
}

impl LibraryStore {
    /// Opens the data directory at `path`, locking it for this process.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or opened, or
    /// if another process holds it.
    pub fn open(path: &Path, config: Config) -> CoreResult<Self> {
        let dir = DataDir::open(path, config.create_if_missing)?;
        let sync = config.sync_on_save;
        info!(path = %path.display(), "library store opened");
        Ok(Self {
            books: Box::new(dir.backend(BOOKS_FILE, sync)),
            patrons: Box::new(dir.backend(PATRONS_FILE, sync)),
            loans: Box::new(dir.backend(LOANS_FILE, sync)),
            dir: Some(dir),
            config,
        })
    }

    /// Creates a store that keeps its files in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_backends(
            Config::default(),
            Box::new(InMemoryBackend::named(BOOKS_FILE)),
            Box::new(InMemoryBackend::named(PATRONS_FILE)),
            Box::new(InMemoryBackend::named(LOANS_FILE)),
        )
    }

    /// Creates a store over caller-supplied backends.
    #[must_use]
    pub fn with_backends(
        config: Config,
        books: Box<dyn StorageBackend>,
        patrons: Box<dyn StorageBackend>,
        loans: Box<dyn StorageBackend>,
    ) -> Self {
        Self {
            config,
            books,
            patrons,
            loans,
            dir: None,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the locked data directory, if this store is file-backed.
    #[must_use]
    pub fn data_dir(&self) -> Option<&DataDir> {
        self.dir.as_ref()
    }

    /// Loads books, then patrons, then loans, re-linking each loan to the
    /// loaded patron and book.
    ///
    /// Missing files load as empty collections. Loan records that cannot be
    /// re-linked are listed in [`LoadReport::skipped_loans`], unless the
    /// configured policy is [`UnresolvedLoanPolicy::Abort`].
    ///
    /// # Errors
    ///
    /// Returns an error, and no repository, if any file cannot be read or
    /// decoded, if the files come from different saves, if a book or
    /// patron record is invalid, if a key appears twice in one file, or if
    /// a loan record is malformed.
    pub fn load(&self) -> CoreResult<(Repository, LoadReport)> {
        info!("loading library");
        let books = read_records(self.books.as_ref(), BOOKS_KIND)?;
        let patrons = read_records(self.patrons.as_ref(), PATRONS_KIND)?;
        let loans = read_records(self.loans.as_ref(), LOANS_KIND)?;
        let generation = check_generations([&books, &patrons, &loans])?;

        let mut repository = Repository::new();
        let mut report = LoadReport {
            generation,
            ..LoadReport::default()
        };

        for record in &books.records {
            let book = records::parse_book(record, &books.file)?;
            let isbn = book.isbn().clone();
            if repository.add_book(book).is_err() {
                return Err(PersistenceError::corrupt(
                    &books.file,
                    record.line,
                    format!("duplicate ISBN {isbn}"),
                )
                .into());
            }
        }

        for record in &patrons.records {
            let patron = records::parse_patron(record, &patrons.file)?;
            let member_number = patron.member_number().clone();
            if repository.add_patron(patron).is_err() {
                return Err(PersistenceError::corrupt(
                    &patrons.file,
                    record.line,
                    format!("duplicate member number {member_number}"),
                )
                .into());
            }
        }

        for record in &loans.records {
            let stored = records::parse_loan(record, &loans.file)?;
            let Some(reason) = relink(&mut repository, &stored, &loans.file)? else {
                continue;
            };

            let skipped = ReferentialLoadError {
                line: stored.line,
                member_number: stored.member_number,
                isbn: stored.isbn,
                start_date: stored.start_date,
                reason,
            };
            match self.config.unresolved_loans {
                UnresolvedLoanPolicy::Skip => {
                    warn!(file = %loans.file, line = skipped.line, reason = %reason, "skipping loan record");
                    report.skipped_loans.push(skipped);
                }
                UnresolvedLoanPolicy::Abort => {
                    return Err(PersistenceError::UnresolvedLoan(skipped).into());
                }
            }
        }

        for violation in repository.check_integrity() {
            warn!(%violation, "integrity violation after load");
        }

        report.books = repository.book_count();
        report.patrons = repository.patron_count();
        report.loans = repository.loan_count();
        info!(
            books = report.books,
            patrons = report.patrons,
            loans = report.loans,
            skipped = report.skipped_loans.len(),
            generation = ?report.generation,
            "library loaded"
        );
        Ok((repository, report))
    }

    /// Like [`load`](Self::load), but falls back to an empty repository when
    /// the load fails. The failure is logged and recorded in
    /// [`LoadReport::failure`].
    pub fn load_or_empty(&self) -> (Repository, LoadReport) {
        match self.load() {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(error = %err, "load failed, starting with an empty library");
                (Repository::new(), LoadReport::failed(err.to_string()))
            }
        }
    }

    /// Writes the repository: books, then patrons, then loans, each in
    /// insertion order, all stamped with the next save generation.
    ///
    /// All three files are staged before any of them is replaced. If
    /// staging fails, the staged files are discarded and the previous
    /// files stay as they were. If a replacement fails part way, the files
    /// on disk carry different generations and the next [`load`](Self::load)
    /// refuses them with [`PersistenceError::MixedGenerations`].
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be staged or replaced.
    pub fn save(&mut self, repository: &Repository) -> CoreResult<SaveReport> {
        let generation = self.current_generation().saturating_add(1);

        let books: Vec<Record> = repository.books().map(records::book_record).collect();
        let patrons: Vec<Record> = repository.patrons().map(records::patron_record).collect();
        let loans: Vec<Record> = repository.loans().map(records::loan_record).collect();

        let documents = [
            to_document(&Header::new(BOOKS_KIND, FORMAT_VERSION).with_generation(generation), &books),
            to_document(&Header::new(PATRONS_KIND, FORMAT_VERSION).with_generation(generation), &patrons),
            to_document(&Header::new(LOANS_KIND, FORMAT_VERSION).with_generation(generation), &loans),
        ];

        if let Err(err) = self.stage_all(&documents) {
            warn!(error = %err, generation, "save failed, previous files kept");
            self.discard_all();
            return Err(err.into());
        }
        if let Err(err) = self.commit_all() {
            error!(error = %err, generation, "save failed while replacing files");
            self.discard_all();
            return Err(err.into());
        }

        let report = SaveReport {
            books: books.len(),
            patrons: patrons.len(),
            loans: loans.len(),
            generation,
        };
        info!(
            books = report.books,
            patrons = report.patrons,
            loans = report.loans,
            generation,
            "library saved"
        );
        Ok(report)
    }

    /// Highest save generation found in the current files. Unreadable
    /// files and files without a generation count as zero.
    fn current_generation(&self) -> u64 {
        [&self.books, &self.patrons, &self.loans]
            .iter()
            .filter_map(|backend| match backend.load() {
                Ok(Some(bytes)) => Header::read(&bytes).ok()?.generation,
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    fn stage_all(&mut self, documents: &[Vec<u8>; 3]) -> StorageResult<()> {
        self.books.stage(&documents[0])?;
        self.patrons.stage(&documents[1])?;
        self.loans.stage(&documents[2])
    }

    fn commit_all(&mut self) -> StorageResult<()> {
        self.books.commit()?;
        self.patrons.commit()?;
        self.loans.commit()
    }

    fn discard_all(&mut self) {
        for backend in [&mut self.books, &mut self.patrons, &mut self.loans] {
            if let Err(err) = backend.discard() {
                warn!(file = %backend.name(), error = %err, "could not discard staged file");
            }
        }
    }
}

impl fmt::Debug for LibraryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryStore")
            .field("config", &self.config)
            .field("books", &self.books.name())
            .field("patrons", &self.patrons.name())
            .field("loans", &self.loans.name())
            .field("dir", &self.dir)
            .finish()
    }
}

/// One decoded data file.
struct StoredFile {
    file: String,
    generation: Option<u64>,
    records: Vec<DecodedRecord>,
}

/// Reads one document. A missing or blank file yields no records.
fn read_records(backend: &dyn StorageBackend, kind: &str) -> CoreResult<StoredFile> {
    let file = backend.name();
    let bytes = match backend.load()? {
        Some(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => bytes,
        _ => {
            debug!(file = %file, "no data, starting empty");
            return Ok(StoredFile {
                file,
                generation: None,
                records: Vec::new(),
            });
        }
    };

    let document = from_document(&bytes).map_err(|e| PersistenceError::codec(&file, e))?;
    document
        .header
        .check(kind, FORMAT_VERSION)
        .map_err(|e| PersistenceError::codec(&file, e.at_line(1)))?;

    debug!(file = %file, records = document.records.len(), generation = ?document.header.generation, "decoded");
    Ok(StoredFile {
        file,
        generation: document.header.generation,
        records: document.records,
    })
}

/// Fails unless every file that carries a generation carries the same one.
fn check_generations(files: [&StoredFile; 3]) -> Result<Option<u64>, PersistenceError> {
    let mut reference: Option<(&str, u64)> = None;
    for stored in files {
        let Some(found) = stored.generation else {
            continue;
        };
        match reference {
            None => reference = Some((stored.file.as_str(), found)),
            Some((name, expected)) if expected != found => {
                return Err(PersistenceError::MixedGenerations {
                    file: stored.file.clone(),
                    found,
                    reference: name.to_string(),
                    expected,
                });
            }
            Some(_) => {}
        }
    }
    Ok(reference.map(|(_, generation)| generation))
}

/// Re-links a stored loan. Returns why it could not be linked, or `None`
/// once it is in the repository.
fn relink(
    repository: &mut Repository,
    stored: &LoanRecord,
    file: &str,
) -> CoreResult<Option<UnresolvedReason>> {
    let patron = MemberNumber::parse(&stored.member_number)
        .ok()
        .and_then(|m| repository.find_patron_by_member_number(&m));
    let book = Isbn::parse(&stored.isbn)
        .ok()
        .and_then(|i| repository.find_book_by_isbn(&i));

    let loan = match (patron, book) {
        (Some(patron), Some(book)) => {
            Loan::new(repository.next_loan_id(), patron, book, stored.start_date).map_err(
                |source| PersistenceError::InvalidRecord {
                    file: file.to_string(),
                    line: stored.line,
                    source,
                },
            )?
        }
        (None, Some(_)) => return Ok(Some(UnresolvedReason::UnknownPatron)),
        (Some(_), None) => return Ok(Some(UnresolvedReason::UnknownBook)),
        (None, None) => return Ok(Some(UnresolvedReason::UnknownPatronAndBook)),
    };

    match repository.link_loan(loan) {
        Ok(()) => Ok(None),
        Err(CoreError::State(StateError::LoanLimitExceeded { .. })) => {
            Ok(Some(UnresolvedReason::PatronAtLimit))
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Book, Patron};
    use crate::error::ValidationError;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store_with(books: &str, patrons: &str, loans: &str, config: Config) -> LibraryStore {
        LibraryStore::with_backends(
            config,
            Box::new(InMemoryBackend::with_data(books)),
            Box::new(InMemoryBackend::with_data(patrons)),
            Box::new(InMemoryBackend::with_data(loans)),
        )
    }

    const BOOKS: &str = "#biblio books v1\n\
        Clean Code;Robert C. Martin;2008-08-01;9780132350884;1\n\
        Dune;Frank Herbert;;9780441172719;3\n";
    const PATRONS: &str = "#biblio patrons v1\n\
        Mario;Rossi;0512100001;mario.rossi@studenti.unisa.it\n";

    fn sample() -> Repository {
        let mut repo = Repository::new();
        repo.add_book(
            Book::new(
                "Clean Code",
                &["Robert C. Martin"],
                Some(date(2008, 8, 1)),
                "9780132350884",
                2,
            )
            .unwrap(),
        )
        .unwrap();
        repo.add_patron(
            Patron::new("Mario", "Rossi", "0512100001", "mario.rossi@studenti.unisa.it").unwrap(),
        )
        .unwrap();
        repo
    }

    #[test]
    fn empty_store_loads_empty() {
        let store = LibraryStore::in_memory();
        let (repo, report) = store.load().unwrap();
        assert!(repo.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn save_then_load() {
        let mut repo = sample();
        let loan = repo
            .grant_loan(
                &MemberNumber::parse("0512100001").unwrap(),
                &Isbn::parse("9780132350884").unwrap(),
                date(2024, 1, 1),
            )
            .unwrap();

        let mut store = LibraryStore::in_memory();
        let saved = store.save(&repo).unwrap();
        assert_eq!(
            saved,
            SaveReport {
                books: 1,
                patrons: 1,
                loans: 1,
                generation: 1,
            }
        );

        let (loaded, report) = store.load().unwrap();
        assert!(report.is_clean());
        assert_eq!(report.loans, 1);
        assert_eq!(report.generation, Some(1));

        let reloaded = loaded.loans().next().unwrap();
        assert_eq!(reloaded.start_date(), loan.start_date());
        assert_eq!(reloaded.due_date(), date(2024, 3, 1));
        let book = loaded.book_of(reloaded).unwrap();
        assert_eq!(book.available_copies(), 1);
        let patron = loaded.patron_of(reloaded).unwrap();
        assert_eq!(patron.active_loans(), [reloaded.id()]);
        assert!(loaded.check_integrity().is_empty());
    }

    #[test]
    fn load_does_not_touch_availability() {
        let loans = "#biblio loans v1\n0512100001;9780132350884;2024-01-01\n";
        let store = store_with(BOOKS, PATRONS, loans, Config::default());
        let (repo, _) = store.load().unwrap();
        let book = repo
            .find_book_by_isbn(&Isbn::parse("9780132350884").unwrap())
            .unwrap();
        assert_eq!(book.available_copies(), 1);
        assert_eq!(repo.loan_count(), 1);
    }

    #[test]
    fn unresolved_loans_are_skipped() {
        let loans = "#biblio loans v1\n\
            0512100001;9780132350884;2024-01-01\n\
            0512199999;9780132350884;2024-01-02\n\
            0512100001;9780201633610;2024-01-03\n\
            bogus;nope;2024-01-04\n";
        let store = store_with(BOOKS, PATRONS, loans, Config::default());
        let (repo, report) = store.load().unwrap();

        assert_eq!(repo.loan_count(), 1);
        let reasons: Vec<_> = report.skipped_loans.iter().map(|s| (s.line, s.reason)).collect();
        assert_eq!(
            reasons,
            [
                (3, UnresolvedReason::UnknownPatron),
                (4, UnresolvedReason::UnknownBook),
                (5, UnresolvedReason::UnknownPatronAndBook),
            ]
        );
        assert!(!report.is_clean());
        assert!(repo.check_integrity().is_empty());
    }

    #[test]
    fn loans_beyond_the_limit_are_skipped() {
        let loans = "#biblio loans v1\n\
            0512100001;9780441172719;2024-01-01\n\
            0512100001;9780441172719;2024-01-02\n\
            0512100001;9780441172719;2024-01-03\n\
            0512100001;9780441172719;2024-01-04\n";
        let store = store_with(BOOKS, PATRONS, loans, Config::default());
        let (repo, report) = store.load().unwrap();

        assert_eq!(repo.loan_count(), 3);
        assert_eq!(report.skipped_loans.len(), 1);
        assert_eq!(report.skipped_loans[0].reason, UnresolvedReason::PatronAtLimit);
        assert_eq!(report.skipped_loans[0].start_date, date(2024, 1, 4));
    }

    #[test]
    fn abort_policy_fails_the_load() {
        let loans = "#biblio loans v1\n0512199999;9780132350884;2024-01-02\n";
        let config = Config::new().unresolved_loans(UnresolvedLoanPolicy::Abort);
        let store = store_with(BOOKS, PATRONS, loans, config);
        assert!(matches!(
            store.load(),
            Err(CoreError::Persistence(PersistenceError::UnresolvedLoan(
                ReferentialLoadError { line: 2, .. }
            )))
        ));
    }

    #[test]
    fn duplicate_keys_are_corrupt() {
        let books = "#biblio books v1\n\
            Dune;Frank Herbert;;9780441172719;3\n\
            Dune II;Frank Herbert;;9780441172719;1\n";
        let store = store_with(books, "", "", Config::default());
        let err = store.load().unwrap_err();
        assert_eq!(
            err.to_string(),
            "memory line 3: duplicate ISBN 9780441172719"
        );
    }

    #[test]
    fn every_save_bumps_the_generation() {
        let mut store = LibraryStore::in_memory();
        assert_eq!(store.save(&sample()).unwrap().generation, 1);
        assert_eq!(store.save(&sample()).unwrap().generation, 2);

        let (_, report) = store.load().unwrap();
        assert_eq!(report.generation, Some(2));
    }

    #[test]
    fn generation_continues_from_existing_files() {
        let books = "#biblio books v1 g41\nDune;Frank Herbert;;9780441172719;3\n";
        let mut store = store_with(books, "", "", Config::default());
        assert_eq!(store.save(&sample()).unwrap().generation, 42);
    }

    #[test]
    fn files_from_different_saves_are_refused() {
        let books = "#biblio books v1 g3\nDune;Frank Herbert;;9780441172719;3\n";
        let patrons = "#biblio patrons v1 g3\n";
        let loans = "#biblio loans v1 g2\n";
        let store = store_with(books, patrons, loans, Config::default());

        let err = store.load().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Persistence(PersistenceError::MixedGenerations {
                found: 2,
                expected: 3,
                ..
            })
        ));
    }

    #[test]
    fn files_without_generation_are_not_compared() {
        let books = "#biblio books v1 g3\nDune;Frank Herbert;;9780441172719;3\n";
        let store = store_with(books, PATRONS, "", Config::default());
        let (repo, report) = store.load().unwrap();
        assert_eq!(repo.book_count(), 1);
        assert_eq!(report.generation, Some(3));
    }

    #[test]
    fn stored_loan_without_due_date_is_invalid() {
        let loans = format!("#biblio loans v1\n0512100001;9780441172719;{}\n", NaiveDate::MAX);
        let store = store_with(BOOKS, PATRONS, &loans, Config::default());
        assert!(matches!(
            store.load(),
            Err(CoreError::Persistence(PersistenceError::InvalidRecord {
                source: ValidationError::DueDateOutOfRange { .. },
                line: 2,
                ..
            }))
        ));
    }

    #[test]
    fn wrong_kind_or_version_is_rejected() {
        let store = store_with(PATRONS, "", "", Config::default());
        assert!(matches!(
            store.load(),
            Err(CoreError::Persistence(PersistenceError::Codec { .. }))
        ));

        let store = store_with("#biblio books v2\n", "", "", Config::default());
        assert!(matches!(
            store.load(),
            Err(CoreError::Persistence(PersistenceError::Codec { .. }))
        ));
    }

    #[test]
    fn load_or_empty_recovers() {
        let store = store_with("no header here", "", "", Config::default());
        let (repo, report) = store.load_or_empty();
        assert!(repo.is_empty());
        assert!(report.failure.is_some());
        assert!(!report.is_clean());
    }

    #[test]
    fn blank_files_load_empty() {
        let store = store_with("", "\n\n", "  ", Config::default());
        let (repo, report) = store.load().unwrap();
        assert!(repo.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn file_store_round_trip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("library");

        {
            let mut store = LibraryStore::open(&path, Config::new().sync_on_save(false)).unwrap();
            assert!(store.data_dir().unwrap().is_new());
            store.save(&sample()).unwrap();
        }

        assert!(path.join("books.csv").is_file());
        let store = LibraryStore::open(&path, Config::default()).unwrap();
        let (repo, report) = store.load().unwrap();
        assert_eq!(report.books, 1);
        assert_eq!(report.patrons, 1);
        assert_eq!(repo.loan_count(), 0);
    }

    #[test]
    fn file_store_is_locked() {
        let temp = tempdir().unwrap();
        let _first = LibraryStore::open(temp.path(), Config::default()).unwrap();
        assert!(matches!(
            LibraryStore::open(temp.path(), Config::default()),
            Err(CoreError::Persistence(PersistenceError::DataDirLocked { .. }))
        ));
    }
}
