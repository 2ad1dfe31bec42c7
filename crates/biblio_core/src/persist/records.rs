//! Mapping between entities and flat records.
//!
//! Field order:
//!
//! | file    | fields |
//! |---------|--------|
//! | books   | title; authors; publication date; ISBN; available copies |
//! | patrons | first name; last name; member number; email |
//! | loans   | member number; ISBN; start date |
//!
//! Authors are a list field. A missing publication date is an empty field.
//! Dates are ISO-8601.

use crate::entity::{Book, Loan, Patron};
use crate::error::PersistenceError;
use biblio_codec::{CodecError, DecodedRecord, Record};
use chrono::NaiveDate;

const BOOK_FIELDS: usize = 5;
const PATRON_FIELDS: usize = 4;
const LOAN_FIELDS: usize = 3;

/// A loan as stored: keys not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoanRecord {
    pub line: usize,
    pub member_number: String,
    pub isbn: String,
    pub start_date: NaiveDate,
}

pub(crate) fn book_record(book: &Book) -> Record {
    Record::new()
        .with_text(book.title())
        .with_list(book.authors())
        .with_text(
            book.publication_date()
                .map(|d| d.to_string())
                .unwrap_or_default(),
        )
        .with_text(book.isbn().as_str())
        .with_text(book.available_copies().to_string())
}

pub(crate) fn patron_record(patron: &Patron) -> Record {
    Record::new()
        .with_text(patron.first_name())
        .with_text(patron.last_name())
        .with_text(patron.member_number().as_str())
        .with_text(patron.email())
}

pub(crate) fn loan_record(loan: &Loan) -> Record {
    Record::new()
        .with_text(loan.member_number().as_str())
        .with_text(loan.isbn().as_str())
        .with_text(loan.start_date().to_string())
}

fn parse_date(
    file: &str,
    line: usize,
    what: &str,
    value: &str,
) -> Result<NaiveDate, PersistenceError> {
    value
        .trim()
        .parse::<NaiveDate>()
        .map_err(|_| PersistenceError::corrupt(file, line, format!("invalid {what} {value:?}")))
}

pub(crate) fn parse_book(decoded: &DecodedRecord, file: &str) -> Result<Book, PersistenceError> {
    let (record, line) = (&decoded.record, decoded.line);
    let codec = |e: CodecError| PersistenceError::codec(file, e.at_line(line));

    record.expect_len(BOOK_FIELDS).map_err(codec)?;
    let title = record.text(0).map_err(codec)?;
    let authors = record.list(1).map_err(codec)?;
    let date = record.text(2).map_err(codec)?;
    let isbn = record.text(3).map_err(codec)?;
    let copies = record.text(4).map_err(codec)?;

    let publication_date = if date.trim().is_empty() {
        None
    } else {
        Some(parse_date(file, line, "publication date", date)?)
    };
    let copies: u32 = copies.trim().parse().map_err(|_| {
        PersistenceError::corrupt(file, line, format!("invalid copy count {copies:?}"))
    })?;

    Book::restore(title, &authors, publication_date, isbn, copies).map_err(|source| {
        PersistenceError::InvalidRecord {
            file: file.to_string(),
            line,
            source,
        }
    })
}

pub(crate) fn parse_patron(
    decoded: &DecodedRecord,
    file: &str,
) -> Result<Patron, PersistenceError> {
    let (record, line) = (&decoded.record, decoded.line);
    let codec = |e: CodecError| PersistenceError::codec(file, e.at_line(line));

    record.expect_len(PATRON_FIELDS).map_err(codec)?;
    Patron::new(
        record.text(0).map_err(codec)?,
        record.text(1).map_err(codec)?,
        record.text(2).map_err(codec)?,
        record.text(3).map_err(codec)?,
    )
    .map_err(|source| PersistenceError::InvalidRecord {
        file: file.to_string(),
        line,
        source,
    })
}

pub(crate) fn parse_loan(
    decoded: &DecodedRecord,
    file: &str,
) -> Result<LoanRecord, PersistenceError> {
    let (record, line) = (&decoded.record, decoded.line);
    let codec = |e: CodecError| PersistenceError::codec(file, e.at_line(line));

    record.expect_len(LOAN_FIELDS).map_err(codec)?;
    Ok(LoanRecord {
        line,
        member_number: record.text(0).map_err(codec)?.to_string(),
        isbn: record.text(1).map_err(codec)?.to_string(),
        start_date: parse_date(file, line, "start date", record.text(2).map_err(codec)?)?,
    })
}
