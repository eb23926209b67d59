//! The in-memory shape of one bibliographic record, and the accumulator the
//! parser fills while the record's elements stream past.

use crate::consts::{
    AUTHOR_ID_ELEMENT, CLASSIFICATION_ELEMENT, DOCUMENT_ID_ELEMENT, KEYWORD_ELEMENT,
};

/// Fields that may occur several times per record and are kept as lists.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RepeatedField {
    Classification,
    AuthorId,
    Keyword,
}

impl RepeatedField {
    pub fn from_local_name(name: &str) -> Option<Self> {
        match name {
            CLASSIFICATION_ELEMENT => Some(RepeatedField::Classification),
            AUTHOR_ID_ELEMENT => Some(RepeatedField::AuthorId),
            KEYWORD_ELEMENT => Some(RepeatedField::Keyword),
            _ => None,
        }
    }
}

/// A completed record. Only constructed when a document identifier was seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub document_id: String,
    /// Scalar fields in first-seen order; values may be empty.
    pub fields: Vec<(String, String)>,
    pub classifications: Vec<String>,
    pub author_ids: Vec<String>,
    pub keywords: Vec<String>,
}

impl Record {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            ..Default::default()
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Stores a scalar value, replacing any earlier value for the same name.
    pub fn set_field(&mut self, name: &str, value: String) {
        match self.fields.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn repeated(&self, field: RepeatedField) -> &[String] {
        match field {
            RepeatedField::Classification => &self.classifications,
            RepeatedField::AuthorId => &self.author_ids,
            RepeatedField::Keyword => &self.keywords,
        }
    }

    fn repeated_mut(&mut self, field: RepeatedField) -> &mut Vec<String> {
        match field {
            RepeatedField::Classification => &mut self.classifications,
            RepeatedField::AuthorId => &mut self.author_ids,
            RepeatedField::Keyword => &mut self.keywords,
        }
    }
}

/// Per-record accumulation state. A fresh builder is created at every record
/// start, so nothing from a previous record can leak into the next one.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    document_id: Option<String>,
    record: Record,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts the raw text of a closed element inside the record.
    pub fn push_element(&mut self, local_name: &str, raw_text: &str) {
        let value = raw_text.trim();
        if local_name == DOCUMENT_ID_ELEMENT {
            self.document_id = Some(value.to_string());
            return;
        }
        match RepeatedField::from_local_name(local_name) {
            Some(field) => {
                if !value.is_empty() {
                    self.record.repeated_mut(field).push(value.to_string());
                }
            }
            None => self.record.set_field(local_name, value.to_string()),
        }
    }

    /// Finishes the record; `None` when no usable document identifier was seen.
    pub fn finish(self) -> Option<Record> {
        let document_id = self.document_id.filter(|id| !id.is_empty())?;
        Some(Record {
            document_id,
            ..self.record
        })
    }
}
