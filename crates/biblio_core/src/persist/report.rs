use crate::error::ReferentialLoadError;

/// What a load produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Books loaded.
    pub books: usize,
    /// Patrons loaded.
    pub patrons: usize,
    /// Loans re-linked.
    pub loans: usize,
    /// Save generation shared by the loaded files, if they carry one.
    pub generation: Option<u64>,
    /// Loan records that could not be re-linked and were dropped.
    pub skipped_loans: Vec<ReferentialLoadError>,
    /// Set by [`LibraryStore::load_or_empty`] when the load failed and an
    /// empty repository was returned instead.
    ///
    /// [`LibraryStore::load_or_empty`]: crate::LibraryStore::load_or_empty
    pub failure: Option<String>,
}

impl LoadReport {
    /// Returns true if every record was loaded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped_loans.is_empty() && self.failure.is_none()
    }

    pub(crate) fn failed(message: String) -> Self {
        Self {
            failure: Some(message),
            ..Self::default()
        }
    }
}

/// What a save wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Book records written.
    pub books: usize,
    /// Patron records written.
    pub patrons: usize,
    /// Loan records written.
    pub loans: usize,
    /// Save generation written into every file header.
    pub generation: u64,
}
