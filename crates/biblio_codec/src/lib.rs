//! # Biblio Codec
//!
//! Flat line-record encoding for Biblio data files.
//!
//! A document is UTF-8 text: a header line followed by one record per
//! line. The format is referential and flat: records never nest, and
//! relationships are expressed by natural keys stored as plain fields.
//!
//! ## Format Rules
//!
//! - The first line is a header: `#biblio <kind> v<version>`, optionally
//!   followed by a save generation `g<number>`
//! - Records are separated by `\n` (a trailing `\r` is tolerated)
//! - Blank lines are ignored
//! - Fields are separated by `;`
//! - A field may hold a list whose items are separated by `,`
//! - Every text item is escaped: `\\`, `\;`, `\,`, `\n`, `\r`
//! - Any other escape, or a dangling `\`, is an error
//!
//! ## Usage
//!
//! ```
//! use biblio_codec::{from_document, to_document, Field, Header, Record};
//!
//! let header = Header::new("books", 1);
//! let record = Record::new()
//!     .with_text("Design Patterns; Elements")
//!     .with_list(["Gamma", "Helm"]);
//!
//! let bytes = to_document(&header, &[record.clone()]);
//! let document = from_document(&bytes).unwrap();
//!
//! assert_eq!(document.header, header);
//! assert_eq!(document.records[0].record, record);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod header;
mod value;

pub use decoder::{decode_record, from_document, DecodedRecord, Document};
pub use encoder::{encode_record, escape, to_document, RecordEncoder};
pub use error::{CodecError, CodecResult};
pub use header::{Header, MAGIC};
pub use value::{Field, Record};

/// Separates fields within a record.
pub const FIELD_SEPARATOR: char = ';';

/// Separates items within a list field.
pub const LIST_SEPARATOR: char = ',';

/// Introduces an escape sequence.
pub const ESCAPE: char = '\\';
