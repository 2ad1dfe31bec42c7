//! Record encoder.

use crate::header::Header;
use crate::value::{Field, Record};
use crate::{ESCAPE, FIELD_SEPARATOR, LIST_SEPARATOR};

/// Encode a whole document: the header line followed by one line per record.
pub fn to_document(header: &Header, records: &[Record]) -> Vec<u8> {
    let mut encoder = RecordEncoder::new(header);
    for record in records {
        encoder.encode(record);
    }
    encoder.into_bytes()
}

/// Encode a single record as one line, without the trailing newline.
pub fn encode_record(record: &Record) -> String {
    let mut line = String::new();
    write_record(&mut line, record);
    line
}

/// Escape a text item so it contains no separators, newlines or bare
/// backslashes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            ESCAPE | FIELD_SEPARATOR | LIST_SEPARATOR => {
                out.push(ESCAPE);
                out.push(ch);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
}

fn write_record(out: &mut String, record: &Record) {
    for (i, field) in record.fields().iter().enumerate() {
        if i > 0 {
            out.push(FIELD_SEPARATOR);
        }
        match field {
            Field::Text(text) => escape_into(out, text),
            Field::List(items) => {
                for (j, item) in items.iter().enumerate() {
                    if j > 0 {
                        out.push(LIST_SEPARATOR);
                    }
                    escape_into(out, item);
                }
            }
        }
    }
}

/// Streams records into a document buffer.
pub struct RecordEncoder {
    buffer: String,
    records: usize,
}

impl RecordEncoder {
    /// Creates an encoder and writes the header line.
    pub fn new(header: &Header) -> Self {
        let mut buffer = header.to_string();
        buffer.push('\n');
        Self { buffer, records: 0 }
    }

    /// Appends one record line.
    pub fn encode(&mut self, record: &Record) {
        write_record(&mut self.buffer, record);
        self.buffer.push('\n');
        self.records += 1;
    }

    /// Number of records written so far.
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Consume this encoder and return the document text.
    pub fn into_string(self) -> String {
        self.buffer
    }

    /// Consume this encoder and return the document bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.into_bytes()
    }
}
