//! Key types for Biblio.
//!
//! [`Isbn`] and [`MemberNumber`] are validated on construction, so a value
//! of either type is always well-formed. [`LoanId`] is assigned by the
//! repository and is not persisted.

use crate::error::ValidationError;
use std::fmt;
use std::str::FromStr;

/// Number of digits in a member number.
pub const MEMBER_NUMBER_LEN: usize = 10;

/// International Standard Book Number, the unique key of a [`Book`].
///
/// Accepts 10 or 13 digits after removing hyphens and spaces; a 10-digit
/// ISBN may end in `X`. The check digit is not verified. The trimmed input
/// is kept as given, so `978-0-13-235088-4` and `9780132350884` are
/// different keys.
///
/// [`Book`]: crate::Book
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Isbn(String);

impl Isbn {
    /// Parses and validates an ISBN.
    ///
    /// # Errors
    ///
    /// Returns `Empty` for blank input and `InvalidIsbn` for anything that
    /// is not 10 or 13 digits.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "ISBN" });
        }

        let compact: Vec<char> = trimmed.chars().filter(|c| *c != '-' && *c != ' ').collect();
        let valid = match compact.len() {
            13 => compact.iter().all(char::is_ascii_digit),
            10 => {
                compact[..9].iter().all(char::is_ascii_digit)
                    && (compact[9].is_ascii_digit() || compact[9] == 'X' || compact[9] == 'x')
            }
            _ => false,
        };

        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(ValidationError::InvalidIsbn {
                value: value.to_string(),
            })
        }
    }

    /// Returns the ISBN as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Isbn {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Isbn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Patron member number: exactly [`MEMBER_NUMBER_LEN`] ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberNumber(String);

impl MemberNumber {
    /// Parses and validates a member number. Surrounding whitespace is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `Empty` for blank input and `InvalidMemberNumber` otherwise.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "member number",
            });
        }
        if trimmed.len() != MEMBER_NUMBER_LEN || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidMemberNumber {
                value: value.to_string(),
                expected: MEMBER_NUMBER_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the member number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MemberNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for MemberNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier for an active loan.
///
/// Loan IDs are assigned by the repository, increase monotonically within
/// one repository and are never reused. They are not written to disk: a
/// reloaded repository numbers its loans afresh in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoanId(pub u64);

impl LoanId {
    /// Creates a new loan ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the next loan ID.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loan:{}", self.0)
    }
}
