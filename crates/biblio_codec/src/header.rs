//! Document header line.

use crate::error::{CodecError, CodecResult};
use std::fmt;

/// Marker that starts every header line.
pub const MAGIC: &str = "#biblio";

/// The first line of every document: `#biblio <kind> v<version>`,
/// optionally followed by ` g<generation>`.
///
/// The generation numbers saves. Documents written together carry the
/// same generation, so a reader can tell whether they belong to one save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// What the records in the document describe (`books`, `patrons`, ...).
    pub kind: String,
    /// Format version the document was written with.
    pub version: u16,
    /// Save generation, if the writer recorded one.
    pub generation: Option<u64>,
}

impl Header {
    /// Creates a header without a generation.
    pub fn new(kind: impl Into<String>, version: u16) -> Self {
        Self {
            kind: kind.into(),
            version,
            generation: None,
        }
    }

    /// Sets the save generation.
    #[must_use]
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Parses a header line.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeader` if the line is not
    /// `#biblio <kind> v<number>` with an optional `g<number>`.
    pub fn parse(line: &str) -> CodecResult<Self> {
        let line = line.trim_end_matches('\r');
        let mut parts = line.split_whitespace();

        let (Some(MAGIC), Some(kind), Some(version), generation, None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(CodecError::invalid_header(line));
        };

        let version = version
            .strip_prefix('v')
            .and_then(|v| v.parse::<u16>().ok())
            .ok_or_else(|| CodecError::invalid_header(line))?;

        let mut header = Self::new(kind, version);
        if let Some(generation) = generation {
            let generation = generation
                .strip_prefix('g')
                .and_then(|g| g.parse::<u64>().ok())
                .ok_or_else(|| CodecError::invalid_header(line))?;
            header = header.with_generation(generation);
        }
        Ok(header)
    }

    /// Parses the header line at the start of a document without decoding
    /// any records. A leading byte order mark is skipped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUtf8`, `MissingHeader` or `InvalidHeader`.
    pub fn read(bytes: &[u8]) -> CodecResult<Self> {
        let end = bytes.iter().position(|b| *b == b'\n').unwrap_or(bytes.len());
        let line = std::str::from_utf8(&bytes[..end]).map_err(|_| CodecError::InvalidUtf8)?;
        let line = line.strip_prefix('\u{feff}').unwrap_or(line);
        if line.trim().is_empty() {
            return Err(CodecError::MissingHeader);
        }
        Self::parse(line)
    }

    /// Checks that this header describes a `kind` document no newer than
    /// `supported`.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedKind` or `UnsupportedVersion`.
    pub fn check(&self, kind: &str, supported: u16) -> CodecResult<()> {
        if self.kind != kind {
            return Err(CodecError::UnexpectedKind {
                expected: kind.to_string(),
                found: self.kind.clone(),
            });
        }
        if self.version > supported {
            return Err(CodecError::UnsupportedVersion {
                found: self.version,
                supported,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{MAGIC} {} v{}", self.kind, self.version)?;
        if let Some(generation) = self.generation {
            write!(f, " g{generation}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse() {
        let header = Header::new("loans", 3);
        assert_eq!(header.to_string(), "#biblio loans v3");
        assert_eq!(Header::parse("#biblio loans v3").unwrap(), header);
    }

    #[test]
    fn parse_rejects_garbage() {
        for line in [
            "",
            "biblio books v1",
            "#biblio books",
            "#biblio books 1",
            "#biblio books vX",
            "#biblio books v1 extra",
            "#biblio books v1 g",
            "#biblio books v1 g-2",
            "#biblio books v1 g3 more",
            "Clean Code;Robert C. Martin;2008-08-01;9780132350884;5",
        ] {
            assert!(
                matches!(Header::parse(line), Err(CodecError::InvalidHeader { .. })),
                "accepted {line:?}"
            );
        }
    }

    #[test]
    fn generation_round_trips() {
        let header = Header::new("books", 1).with_generation(42);
        assert_eq!(header.to_string(), "#biblio books v1 g42");
        assert_eq!(Header::parse("#biblio books v1 g42").unwrap(), header);
        assert_eq!(Header::parse("#biblio books v1").unwrap().generation, None);
    }

    #[test]
    fn read_takes_only_the_first_line() {
        let header = Header::read(b"\xef\xbb\xbf#biblio loans v1 g7\r\nnot;a;header\\").unwrap();
        assert_eq!(header, Header::new("loans", 1).with_generation(7));

        assert_eq!(Header::read(b""), Err(CodecError::MissingHeader));
        assert_eq!(Header::read(b"\n#biblio loans v1"), Err(CodecError::MissingHeader));
    }

    #[test]
    fn check_kind_and_version() {
        let header = Header::new("books", 2);

        assert!(header.check("books", 2).is_ok());
        assert!(header.check("books", 5).is_ok());
        assert!(matches!(
            header.check("books", 1),
            Err(CodecError::UnsupportedVersion { found: 2, supported: 1 })
        ));
        assert!(matches!(
            header.check("patrons", 2),
            Err(CodecError::UnexpectedKind { .. })
        ));
    }
}
