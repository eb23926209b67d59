//! Turns SPARQL XML results into typed answers and writes the solutions report.

use crate::consts::{AUTHOR_SEARCH_URL, KEYWORD_SEARCH_URL, PAPER_SEARCH_URL};
use anyhow::{Context, Result};
use oxigraph::model::Term;
use oxigraph::sparql::results::{
    QueryResultsFormat, QueryResultsParser, ReaderQueryResultsParserOutput,
};
use oxigraph::sparql::QuerySolution;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Answer {
    Keyword(String),
    Paper(String),
    Author { url: String, count: String },
}

impl Answer {
    fn element_name(&self) -> &'static str {
        match self {
            Answer::Keyword(_) => "Keyword",
            Answer::Paper(_) => "Paper",
            Answer::Author { .. } => "Author",
        }
    }

    fn url(&self) -> &str {
        match self {
            Answer::Keyword(url) | Answer::Paper(url) => url,
            Answer::Author { url, .. } => url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub id: String,
    pub query: String,
    pub answers: Vec<Answer>,
}

impl Solution {
    pub fn empty(id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            query: query.into(),
            answers: Vec::new(),
        }
    }
}

fn literal_value(solution: &QuerySolution, name: &str) -> Option<String> {
    match solution.get(name) {
        Some(Term::Literal(l)) => Some(l.value().to_string()),
        _ => None,
    }
}

fn iri_value(solution: &QuerySolution, name: &str) -> Option<String> {
    match solution.get(name) {
        Some(Term::NamedNode(n)) => Some(n.as_str().to_string()),
        _ => None,
    }
}

fn value_text(solution: &QuerySolution, name: &str) -> Option<String> {
    literal_value(solution, name).or_else(|| iri_value(solution, name))
}

fn keyword_answers(rows: &[QuerySolution]) -> Vec<Answer> {
    rows.iter()
        .filter_map(|row| literal_value(row, "keyword"))
        .map(|k| Answer::Keyword(format!("{KEYWORD_SEARCH_URL}{}", k.replace(' ', "+"))))
        .collect()
}

fn paper_answers(rows: &[QuerySolution]) -> Vec<Answer> {
    rows.iter()
        .filter_map(|row| iri_value(row, "document"))
        .map(|iri| {
            let local = iri.rsplit(':').next().unwrap_or(&iri).to_string();
            Answer::Paper(format!("{PAPER_SEARCH_URL}{local}"))
        })
        .collect()
}

fn author_answers(rows: &[QuerySolution]) -> Vec<Answer> {
    rows.iter()
        .filter_map(|row| Some((value_text(row, "author_id")?, value_text(row, "count")?)))
        .map(|(author, count)| Answer::Author {
            url: format!("{AUTHOR_SEARCH_URL}{author}"),
            count,
        })
        .collect()
}

/// Shapes the answers of one problem from its SPARQL XML results. Keyword
/// bindings win over document bindings, which win over author/count rows.
pub fn answers_from_results(results_xml: &str) -> Result<Vec<Answer>> {
    let parsed = QueryResultsParser::from_format(QueryResultsFormat::Xml)
        .for_reader(results_xml.as_bytes())
        .context("Failed to parse SPARQL results")?;
    let rows = match parsed {
        ReaderQueryResultsParserOutput::Solutions(solutions) => solutions
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to parse SPARQL results")?,
        ReaderQueryResultsParserOutput::Boolean(_) => return Ok(Vec::new()),
    };

    for shape in [keyword_answers, paper_answers, author_answers] {
        let answers = shape(&rows);
        if !answers.is_empty() {
            return Ok(answers);
        }
    }
    Ok(Vec::new())
}

/// Builds the solution for problem `id` answered by `results_xml`.
pub fn format_solution(id: &str, query: &str, results_xml: &str) -> Result<Solution> {
    Ok(Solution {
        id: id.to_string(),
        query: query.to_string(),
        answers: answers_from_results(results_xml)
            .with_context(|| format!("Bad results for problem {id}"))?,
    })
}

/// Writes the `<Solutions>` report.
pub fn write_solutions<W: Write>(solutions: &[Solution], output: W) -> Result<()> {
    let mut writer = Writer::new_with_indent(output, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("Solutions")))?;
    for solution in solutions {
        writer.write_event(Event::Start(
            BytesStart::new("Solution").with_attributes([("id", solution.id.as_str())]),
        ))?;
        writer.write_event(Event::Start(BytesStart::new("Query")))?;
        writer.write_event(Event::Text(BytesText::new(&solution.query)))?;
        writer.write_event(Event::End(BytesEnd::new("Query")))?;
        for answer in &solution.answers {
            let name = answer.element_name();
            let start = match answer {
                Answer::Author { count, .. } => {
                    BytesStart::new(name).with_attributes([("count", count.as_str())])
                }
                _ => BytesStart::new(name),
            };
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Text(BytesText::new(answer.url())))?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        writer.write_event(Event::End(BytesEnd::new("Solution")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("Solutions")))?;
    let mut output = writer.into_inner();
    output.write_all(b"\n")?;
    output.flush()?;
    Ok(())
}

pub fn write_solutions_file(solutions: &[Solution], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create solutions file {}", path.display()))?;
    write_solutions(solutions, BufWriter::new(file))
        .with_context(|| format!("Failed to write solutions to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(vars: &[&str], rows: &[&[(&str, &str)]]) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\"?>\n<sparql xmlns=\"http://www.w3.org/2005/sparql-results#\">\n<head>",
        );
        for v in vars {
            xml.push_str(&format!("<variable name=\"{v}\"/>"));
        }
        xml.push_str("</head>\n<results>\n");
        for row in rows {
            xml.push_str("<result>");
            for (name, value) in row.iter() {
                xml.push_str(&format!("<binding name=\"{name}\">{value}</binding>"));
            }
            xml.push_str("</result>\n");
        }
        xml.push_str("</results>\n</sparql>\n");
        xml
    }

    #[test]
    fn test_keyword_answers() {
        let xml = results(
            &["keyword"],
            &[
                &[("keyword", "<literal>graph theory</literal>")],
                &[("keyword", "<literal>matroids</literal>")],
            ],
        );
        assert_eq!(
            answers_from_results(&xml).unwrap(),
            vec![
                Answer::Keyword("https://zbmath.org/?q=ut%3Agraph+theory".into()),
                Answer::Keyword("https://zbmath.org/?q=ut%3Amatroids".into()),
            ]
        );
    }

    #[test]
    fn test_paper_answers_use_text_after_last_colon() {
        let xml = results(
            &["document"],
            &[&[(
                "document",
                "<uri>http://zbmath.org/zbmath/elements/1.0/zbmath:1234.05001</uri>",
            )]],
        );
        assert_eq!(
            answers_from_results(&xml).unwrap(),
            vec![Answer::Paper("https://zbmath.org/?q=an%3A1234.05001".into())]
        );
    }

    #[test]
    fn test_author_answers_carry_count() {
        let count = "<literal datatype=\"http://www.w3.org/2001/XMLSchema#integer\">7</literal>";
        let xml = results(
            &["author_id", "count"],
            &[&[("author_id", "<literal>erdos.paul</literal>"), ("count", count)]],
        );
        assert_eq!(
            answers_from_results(&xml).unwrap(),
            vec![Answer::Author {
                url: "https://zbmath.org/authors/?q=ai%3Aerdos.paul".into(),
                count: "7".into()
            }]
        );
    }

    #[test]
    fn test_no_rows_gives_no_answers() {
        let xml = results(&["keyword"], &[]);
        assert!(answers_from_results(&xml).unwrap().is_empty());
    }

    #[test]
    fn test_garbage_results_are_an_error() {
        assert!(format_solution("1", "q", "not xml at all").is_err());
    }

    #[test]
    fn test_report_layout() {
        let solutions = vec![
            Solution {
                id: "p1".into(),
                query: "SELECT ?x WHERE { ?x ?p ?o FILTER(?o < 3) }".into(),
                answers: vec![Answer::Keyword("https://zbmath.org/?q=ut%3Aa".into())],
            },
            Solution {
                id: "p3".into(),
                query: "q3".into(),
                answers: vec![Answer::Author {
                    url: "https://zbmath.org/authors/?q=ai%3Ax".into(),
                    count: "3".into(),
                }],
            },
            Solution::empty("p9", "Unknown problem type"),
        ];
        let mut out = Vec::new();
        write_solutions(&solutions, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("<Solution id=\"p1\">"));
        assert!(text.contains("<Query>SELECT ?x WHERE { ?x ?p ?o FILTER(?o &lt; 3) }</Query>"));
        assert!(text.contains("<Keyword>https://zbmath.org/?q=ut%3Aa</Keyword>"));
        assert!(text.contains("<Author count=\"3\">https://zbmath.org/authors/?q=ai%3Ax</Author>"));
        assert!(text.contains("<Query>Unknown problem type</Query>"));
        assert!(text.trim_end().ends_with("</Solutions>"));
        let query_pos = text.find("<Query>q3").unwrap();
        let author_pos = text.find("<Author").unwrap();
        assert!(query_pos < author_pos);
    }
}
