use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::{Literal, Term};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use zbrdf::consts::{CLASSIFICATION, ZBMATH_NS};
use zbrdf::parser::RecordReader;
use zbrdf::record::RepeatedField;
use zbrdf::{convert_file, split_file};

fn write_records(path: &Path, count: usize) {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<records>\n");
    for i in 0..count {
        xml.push_str(&format!(
            "<record>\n  <document_id>doc{i}</document_id>\n  <publication_year>{}</publication_year>\n  \
             <classification>05C{:02}</classification>\n  <classification>68R10</classification>\n  \
             <author_id>author.{}</author_id>\n  <keyword>graphs &amp; \"matroids\"</keyword>\n</record>\n",
            1990 + i % 30,
            i % 100,
            i % 7
        ));
    }
    xml.push_str("</records>\n");
    fs::write(path, xml).unwrap();
}

#[test]
fn converted_output_is_valid_ntriples() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("records.xml");
    let output = dir.path().join("records.nt");
    write_records(&input, 300);

    let report = convert_file(&input, &output, 4_096).unwrap();
    assert_eq!(report.records_converted, 300);
    assert_eq!(report.triples_written, 300 * 6);
    assert!(report.flushes > 1);
    assert_eq!(report.bytes_written, fs::metadata(&output).unwrap().len());

    let data = fs::read(&output).unwrap();
    let triples: Vec<_> = RdfParser::from_format(RdfFormat::NTriples)
        .for_reader(data.as_slice())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(triples.len(), 300 * 6);

    let doc7 = format!("<{ZBMATH_NS}doc7>");
    let classes: BTreeSet<String> = triples
        .iter()
        .filter(|q| q.subject.to_string() == doc7 && q.predicate.as_ref() == CLASSIFICATION)
        .filter_map(|q| match &q.object {
            Term::Literal(l) => Some(l.value().to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(
        classes,
        BTreeSet::from(["05C07".to_string(), "68R10".to_string()])
    );
    let keyword = triples
        .iter()
        .find(|q| q.subject.to_string() == doc7 && q.predicate.as_str().ends_with(":keyword"))
        .unwrap();
    assert_eq!(
        keyword.object,
        Term::Literal(Literal::new_simple_literal("graphs & \"matroids\""))
    );
}

#[test]
fn split_parts_reassemble_converted_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("records.xml");
    let output = dir.path().join("records.nt");
    write_records(&input, 200);
    convert_file(&input, &output, 1_000_000).unwrap();

    let original = fs::read(&output).unwrap();
    let parts = split_file(&output, 16 * 1024).unwrap();
    assert!(parts.len() > 1);
    let mut joined = Vec::new();
    for part in &parts {
        let bytes = fs::read(part).unwrap();
        assert!(bytes.len() <= 16 * 1024);
        assert!(bytes.ends_with(b" .\n"));
        joined.extend(bytes);
    }
    assert_eq!(joined, original);
}

#[test]
fn reader_yields_typed_records_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("records.xml");
    write_records(&input, 3);
    let records: Vec<_> = RecordReader::from_path(&input)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].document_id, "doc2");
    assert_eq!(records[2].field("publication_year"), Some("1992"));
    assert_eq!(
        records[2].repeated(RepeatedField::Classification),
        ["05C02".to_string(), "68R10".to_string()]
    );
    assert_eq!(records[2].repeated(RepeatedField::AuthorId), ["author.2"]);
}
