//! Library store configuration.

/// What to do with a persisted loan whose patron or book cannot be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedLoanPolicy {
    /// Drop the record and report it in the load report.
    #[default]
    Skip,
    /// Fail the whole load.
    Abort,
}

/// Configuration for opening a library store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the data directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to fsync data files and the directory on every save.
    pub sync_on_save: bool,

    /// Handling of loan records that cannot be re-linked on load.
    pub unresolved_loans: UnresolvedLoanPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            sync_on_save: true,
            unresolved_loans: UnresolvedLoanPolicy::Skip,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the data directory if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to sync on every save.
    #[must_use]
    pub const fn sync_on_save(mut self, value: bool) -> Self {
        self.sync_on_save = value;
        self
    }

    /// Sets the unresolved loan policy.
    #[must_use]
    pub const fn unresolved_loans(mut self, policy: UnresolvedLoanPolicy) -> Self {
        self.unresolved_loans = policy;
        self
    }
}
