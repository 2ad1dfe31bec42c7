//! Record and field types.

use crate::error::{CodecError, CodecResult};

/// One field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// A single text value.
    Text(String),
    /// An ordered list of text items.
    List(Vec<String>),
}

impl Field {
    /// Builds a field from decoded items: one item is text, anything else a list.
    pub(crate) fn from_items(mut items: Vec<String>) -> Self {
        if items.len() == 1 {
            Field::Text(items.pop().unwrap_or_default())
        } else {
            Field::List(items)
        }
    }

    /// Returns the text value, or `None` if this is a list.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Field::Text(s) => Some(s),
            Field::List(_) => None,
        }
    }

    /// Returns the items of this field. A text field is a one-item list.
    #[must_use]
    pub fn items(&self) -> Vec<String> {
        match self {
            Field::Text(s) => vec![s.clone()],
            Field::List(items) => items.clone(),
        }
    }
}

/// A flat record: an ordered sequence of fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record from fields.
    #[must_use]
    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Appends a text field.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.fields.push(Field::Text(text.into()));
        self
    }

    /// Appends a list field.
    #[must_use]
    pub fn with_list<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .push(Field::List(items.into_iter().map(Into::into).collect()));
        self
    }

    /// Returns the fields.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fails unless the record has exactly `expected` fields.
    ///
    /// # Errors
    ///
    /// Returns `FieldCount` on mismatch.
    pub fn expect_len(&self, expected: usize) -> CodecResult<()> {
        if self.fields.len() == expected {
            Ok(())
        } else {
            Err(CodecError::FieldCount {
                expected,
                found: self.fields.len(),
            })
        }
    }

    /// Returns field `index` as text.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` or `NotText`.
    pub fn text(&self, index: usize) -> CodecResult<&str> {
        match self.fields.get(index) {
            Some(Field::Text(s)) => Ok(s),
            Some(Field::List(items)) => Err(CodecError::NotText {
                index,
                items: items.len(),
            }),
            None => Err(CodecError::MissingField { index }),
        }
    }

    /// Returns field `index` as a list of items.
    ///
    /// # Errors
    ///
    /// Returns `MissingField`.
    pub fn list(&self, index: usize) -> CodecResult<Vec<String>> {
        self.fields
            .get(index)
            .map(Field::items)
            .ok_or(CodecError::MissingField { index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let record = Record::new().with_text("a").with_list(["b", "c"]);

        assert_eq!(record.len(), 2);
        assert_eq!(record.text(0).unwrap(), "a");
        assert_eq!(record.list(0).unwrap(), vec!["a"]);
        assert_eq!(record.list(1).unwrap(), vec!["b", "c"]);
        assert_eq!(
            record.text(1),
            Err(CodecError::NotText { index: 1, items: 2 })
        );
        assert_eq!(record.text(2), Err(CodecError::MissingField { index: 2 }));
    }

    #[test]
    fn expect_len() {
        let record = Record::new().with_text("x");
        assert!(record.expect_len(1).is_ok());
        assert_eq!(
            record.expect_len(3),
            Err(CodecError::FieldCount {
                expected: 3,
                found: 1
            })
        );
    }

    #[test]
    fn from_items_collapses_single_item() {
        assert_eq!(
            Field::from_items(vec!["x".into()]),
            Field::Text("x".into())
        );
        assert_eq!(
            Field::from_items(vec!["x".into(), "y".into()]),
            Field::List(vec!["x".into(), "y".into()])
        );
    }
}
