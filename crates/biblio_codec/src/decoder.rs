//! Record decoder.

use crate::error::{CodecError, CodecResult};
use crate::header::Header;
use crate::value::{Field, Record};
use crate::{ESCAPE, FIELD_SEPARATOR, LIST_SEPARATOR};

/// A record together with the line it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    /// One-based line number within the document.
    pub line: usize,
    /// The decoded record.
    pub record: Record,
}

/// A decoded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The header line.
    pub header: Header,
    /// Records in file order.
    pub records: Vec<DecodedRecord>,
}

/// Decode a whole document.
///
/// # Errors
///
/// Returns an error if the bytes are not UTF-8, the header is missing or
/// malformed, or any record line contains a bad escape. Record errors are
/// wrapped in [`CodecError::AtLine`].
pub fn from_document(bytes: &[u8]) -> CodecResult<Document> {
    let text = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = text.lines().enumerate();

    let header = match lines.next() {
        Some((_, line)) if !line.trim().is_empty() => {
            Header::parse(line).map_err(|e| e.at_line(1))?
        }
        _ => return Err(CodecError::MissingHeader),
    };

    let mut records = Vec::new();
    for (index, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = index + 1;
        let record = decode_record(line).map_err(|e| e.at_line(line_no))?;
        records.push(DecodedRecord {
            line: line_no,
            record,
        });
    }

    Ok(Document { header, records })
}

/// Decode a single record line.
///
/// A field containing an unescaped `,` becomes a [`Field::List`]; every
/// other field becomes [`Field::Text`].
///
/// # Errors
///
/// Returns `DanglingEscape` or `UnknownEscape`.
pub fn decode_record(line: &str) -> CodecResult<Record> {
    let line = line.strip_suffix('\r').unwrap_or(line);

    let mut fields = Vec::new();
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = line.char_indices();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            ESCAPE => match chars.next() {
                Some((_, ESCAPE)) => current.push(ESCAPE),
                Some((_, FIELD_SEPARATOR)) => current.push(FIELD_SEPARATOR),
                Some((_, LIST_SEPARATOR)) => current.push(LIST_SEPARATOR),
                Some((_, 'n')) => current.push('\n'),
                Some((_, 'r')) => current.push('\r'),
                Some((_, escape)) => {
                    return Err(CodecError::UnknownEscape {
                        position: pos + 1,
                        escape,
                    })
                }
                None => return Err(CodecError::DanglingEscape { position: pos + 1 }),
            },
            FIELD_SEPARATOR => {
                items.push(std::mem::take(&mut current));
                fields.push(Field::from_items(std::mem::take(&mut items)));
            }
            LIST_SEPARATOR => items.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }

    items.push(current);
    fields.push(Field::from_items(items));

    Ok(Record::from_fields(fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_fields() {
        let record = decode_record("Mario;Rossi;0512100001;m@test.it").unwrap();
        assert_eq!(record.len(), 4);
        assert_eq!(record.text(2).unwrap(), "0512100001");
    }

    #[test]
    fn decodes_lists_and_escapes() {
        let record = decode_record(r"A\; B;Kernighan\, B.,Ritchie;x\\y\nz").unwrap();

        assert_eq!(record.text(0).unwrap(), "A; B");
        assert_eq!(record.list(1).unwrap(), vec!["Kernighan, B.", "Ritchie"]);
        assert_eq!(record.text(2).unwrap(), "x\\y\nz");
    }

    #[test]
    fn empty_fields() {
        let record = decode_record("a;;b;").unwrap();
        assert_eq!(record.len(), 4);
        assert_eq!(record.text(1).unwrap(), "");
        assert_eq!(record.text(3).unwrap(), "");
    }

    #[test]
    fn tolerates_crlf() {
        let record = decode_record("a;b\r").unwrap();
        assert_eq!(record.text(1).unwrap(), "b");
    }

    #[test]
    fn rejects_bad_escapes() {
        assert_eq!(
            decode_record(r"abc\"),
            Err(CodecError::DanglingEscape { position: 4 })
        );
        assert_eq!(
            decode_record(r"a\tb"),
            Err(CodecError::UnknownEscape {
                position: 2,
                escape: 't'
            })
        );
    }

    #[test]
    fn document_skips_blank_lines_and_numbers_lines() {
        let text = "#biblio loans v1\n\n0512100001;9780132350884;2024-01-01\n  \n0512100002;x;2024-01-02\n";
        let document = from_document(text.as_bytes()).unwrap();

        assert_eq!(document.header, Header::new("loans", 1));
        let lines: Vec<usize> = document.records.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![3, 5]);
    }

    #[test]
    fn document_with_only_header_is_empty() {
        let document = from_document(b"#biblio books v1\n").unwrap();
        assert!(document.records.is_empty());
    }

    #[test]
    fn document_errors() {
        assert_eq!(from_document(b""), Err(CodecError::MissingHeader));
        assert_eq!(from_document(&[0xff, 0xfe]), Err(CodecError::InvalidUtf8));
        assert!(matches!(
            from_document(b"Clean Code;x;2008-08-01;1;1\n"),
            Err(CodecError::AtLine { line: 1, .. })
        ));

        let err = from_document(b"#biblio books v1\nok\nbad\\").unwrap_err();
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn document_strips_bom() {
        let document = from_document("\u{feff}#biblio books v1\n".as_bytes()).unwrap();
        assert_eq!(document.header.kind, "books");
    }
}
