//! Maps a completed [`Record`] to RDF triples and renders them as N-Triples lines.

use crate::consts::{AUTHOR_ID, CLASSIFICATION, DOCUMENT, KEYWORD, TYPE, ZBMATH_NS};
use crate::errors::InvalidRecordError;
use crate::record::Record;
use anyhow::Result;
use oxigraph::model::{Literal, NamedNode, NamedNodeRef, Triple};
use std::fmt;

/// One serialized triple: a complete N-Triples line including the trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedTriple(String);

impl SerializedTriple {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes of the UTF-8 encoded line.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for SerializedTriple {
    fn from(line: String) -> Self {
        SerializedTriple(line)
    }
}

impl fmt::Display for SerializedTriple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn vocab_node(document_id: &str, local: &str) -> Result<NamedNode> {
    NamedNode::new(format!("{ZBMATH_NS}{local}")).map_err(|e| {
        InvalidRecordError {
            document_id: document_id.to_string(),
            reason: format!("'{local}' does not form a valid IRI: {e}"),
        }
        .into()
    })
}

/// Builds the triples for a record in a fixed order: the type assertion, then
/// non-empty scalar fields, classifications, author ids and keywords.
pub fn record_triples(record: &Record) -> Result<Vec<Triple>> {
    let subject = vocab_node(&record.document_id, &record.document_id)?;
    let mut triples = Vec::with_capacity(
        1 + record.fields.len()
            + record.classifications.len()
            + record.author_ids.len()
            + record.keywords.len(),
    );
    triples.push(Triple::new(
        subject.clone(),
        TYPE.into_owned(),
        DOCUMENT.into_owned(),
    ));

    for (name, value) in record.fields.iter().filter(|(_, v)| !v.is_empty()) {
        let predicate = vocab_node(&record.document_id, name)?;
        triples.push(Triple::new(
            subject.clone(),
            predicate,
            Literal::new_simple_literal(value),
        ));
    }

    let repeated: [(NamedNodeRef<'_>, &Vec<String>); 3] = [
        (CLASSIFICATION, &record.classifications),
        (AUTHOR_ID, &record.author_ids),
        (KEYWORD, &record.keywords),
    ];
    for (predicate, values) in repeated {
        for value in values {
            triples.push(Triple::new(
                subject.clone(),
                predicate.into_owned(),
                Literal::new_simple_literal(value),
            ));
        }
    }
    Ok(triples)
}

/// Renders `<s> <p> <o> .\n`, with literals quoted and escaped as N-Triples requires.
pub fn serialize_triple(triple: &Triple) -> SerializedTriple {
    SerializedTriple(format!("{triple} .\n"))
}

pub fn serialize_record(record: &Record) -> Result<Vec<SerializedTriple>> {
    Ok(record_triples(record)?
        .iter()
        .map(serialize_triple)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordBuilder;

    fn sample() -> Record {
        let mut builder = RecordBuilder::new();
        builder.push_element("document_id", "doc1");
        builder.push_element("publication_year", "2001");
        builder.push_element("classification", "05A99");
        builder.push_element("author_id", "123");
        builder.push_element("keyword", "graph theory");
        builder.finish().unwrap()
    }

    #[test]
    fn test_sample_record_yields_five_triples() {
        let triples = record_triples(&sample()).unwrap();
        assert_eq!(triples.len(), 5);
        for t in &triples {
            assert_eq!(t.subject.to_string(), format!("<{ZBMATH_NS}doc1>"));
        }
        assert_eq!(triples[0].predicate, TYPE.into_owned());
        assert_eq!(triples[2].predicate, CLASSIFICATION.into_owned());
        assert_eq!(triples[3].predicate, AUTHOR_ID.into_owned());
        assert_eq!(triples[4].predicate, KEYWORD.into_owned());
    }

    #[test]
    fn test_serialized_lines() {
        let lines = serialize_record(&sample()).unwrap();
        assert_eq!(
            lines[0].as_str(),
            "<http://zbmath.org/zbmath/elements/1.0/zbmath:doc1> \
             <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> \
             <http://zbmath.org/zbmath/elements/1.0/zbmath:Document> .\n"
        );
        assert_eq!(
            lines[1].as_str(),
            "<http://zbmath.org/zbmath/elements/1.0/zbmath:doc1> \
             <http://zbmath.org/zbmath/elements/1.0/zbmath:publication_year> \"2001\" .\n"
        );
        for line in &lines {
            assert_eq!(line.len(), line.as_str().len());
            assert!(line.as_str().ends_with(" .\n"));
        }
    }

    #[test]
    fn test_empty_scalars_are_not_emitted() {
        let mut record = Record::new("d");
        record.set_field("title", String::new());
        record.set_field("language", "en".to_string());
        let triples = record_triples(&record).unwrap();
        assert_eq!(triples.len(), 2);
    }

    #[test]
    fn test_literals_are_escaped() {
        let mut record = Record::new("d");
        record.set_field("title", "A \"quoted\"\ntitle".to_string());
        let lines = serialize_record(&record).unwrap();
        assert!(lines[1].as_str().contains(r#""A \"quoted\"\ntitle""#));
        assert_eq!(lines[1].as_str().matches('\n').count(), 1);
    }

    #[test]
    fn test_invalid_identifier_is_reported() {
        let record = Record::new("has space");
        let err = record_triples(&record).unwrap_err();
        assert!(err.downcast_ref::<InvalidRecordError>().is_some());
    }
}
