//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The document is not valid UTF-8.
    #[error("invalid UTF-8 in document")]
    InvalidUtf8,

    /// The document has no header line.
    #[error("missing document header")]
    MissingHeader,

    /// The header line is malformed.
    #[error("invalid header: {found:?}")]
    InvalidHeader {
        /// The offending header line.
        found: String,
    },

    /// The header names a different kind of document.
    #[error("expected a {expected} document, found {found}")]
    UnexpectedKind {
        /// The kind the caller asked for.
        expected: String,
        /// The kind named in the header.
        found: String,
    },

    /// The header carries a version newer than the reader understands.
    #[error("unsupported format version {found} (supported up to {supported})")]
    UnsupportedVersion {
        /// The version in the header.
        found: u16,
        /// The highest version the reader understands.
        supported: u16,
    },

    /// A backslash at the end of a line.
    #[error("dangling escape at position {position}")]
    DanglingEscape {
        /// Byte position of the backslash (1-based).
        position: usize,
    },

    /// A backslash followed by a character with no escape meaning.
    #[error("unknown escape '\\{escape}' at position {position}")]
    UnknownEscape {
        /// Byte position of the backslash (1-based).
        position: usize,
        /// The character following the backslash.
        escape: char,
    },

    /// A record has the wrong number of fields.
    #[error("expected {expected} fields, found {found}")]
    FieldCount {
        /// Number of fields the record kind requires.
        expected: usize,
        /// Number of fields present.
        found: usize,
    },

    /// A field that must hold a single value holds a list.
    #[error("field {index} must be a single value, found a list of {items}")]
    NotText {
        /// Zero-based field index.
        index: usize,
        /// Number of list items found.
        items: usize,
    },

    /// A field index beyond the end of the record.
    #[error("missing field {index}")]
    MissingField {
        /// Zero-based field index.
        index: usize,
    },

    /// An error on a specific line of a document.
    #[error("line {line}: {source}")]
    AtLine {
        /// One-based line number.
        line: usize,
        /// The underlying error.
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// Wraps an error with the line it occurred on.
    #[must_use]
    pub fn at_line(self, line: usize) -> Self {
        match self {
            already @ Self::AtLine { .. } => already,
            other => Self::AtLine {
                line,
                source: Box::new(other),
            },
        }
    }

    /// Creates an invalid header error.
    pub fn invalid_header(found: impl Into<String>) -> Self {
        Self::InvalidHeader {
            found: found.into(),
        }
    }

    /// Returns the line number, if the error is tied to one.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::AtLine { line, .. } => Some(*line),
            _ => None,
        }
    }
}
