//! Typed "problems" read from the problems XML file.
//!
//! ```xml
//! <Problems>
//!   <Problem id="1" type="keywords">
//!     <Author>https://zbmath.org/authors/?q=ai%3Ahilbert.david</Author>
//!   </Problem>
//!   <Problem id="2" type="msc-intersection">
//!     <Classification>https://zbmath.org/?q=cc%3A05C</Classification>
//!     <Classification>https://zbmath.org/?q=cc%3A68R</Classification>
//!   </Problem>
//!   <Problem id="3" type="top-authors">
//!     <Keyword>https://zbmath.org/?q=ut%3Agraph+theory</Keyword>
//!     <BeforeYear>2010</BeforeYear>
//!     <AfterYear>2000</AfterYear>
//!   </Problem>
//! </Problems>
//! ```

use crate::errors::MalformedProblemError;
use anyhow::{anyhow, Context, Result};
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemKind {
    /// All keywords used on documents by one author
    Keywords { author_id: String },
    /// Documents carrying a classification under every given prefix
    ClassificationIntersection { classifications: Vec<String> },
    /// Ten most prolific authors for a keyword within an exclusive year range
    TopAuthors {
        keyword: String,
        before_year: String,
        after_year: String,
    },
    Unknown { kind: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub id: String,
    pub kind: ProblemKind,
}

/// Extracts the search term from a zbMATH search URL such as
/// `https://zbmath.org/?q=ut%3Agraph+theory`: the decoded `q` parameter with
/// `prefix` (e.g. `ut:`) removed. Text that is not a URL is used as-is.
pub fn search_term(uri: &str, prefix: &str) -> String {
    let uri = uri.trim();
    let term = match url::Url::parse(uri) {
        Ok(url) => url
            .query_pairs()
            .find(|(k, _)| k == "q")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default(),
        Err(_) => uri.to_string(),
    };
    match term.strip_prefix(prefix) {
        Some(rest) => rest.to_string(),
        None => term,
    }
}

#[derive(Default)]
struct ProblemElement {
    id: String,
    kind: String,
    children: HashMap<String, Vec<String>>,
}

impl ProblemElement {
    fn from_start(e: &BytesStart) -> Result<Self> {
        let attr = |name: &str| -> Result<String> {
            Ok(match e.try_get_attribute(name)? {
                Some(a) => a.unescape_value()?.into_owned(),
                None => String::new(),
            })
        };
        Ok(Self {
            id: attr("id")?,
            kind: attr("type")?,
            children: HashMap::new(),
        })
    }

    fn first(&self, name: &'static str) -> Result<&str> {
        self.children
            .get(name)
            .and_then(|v| v.first())
            .map(|s| s.as_str())
            .ok_or_else(|| {
                MalformedProblemError {
                    id: self.id.clone(),
                    missing: name,
                }
                .into()
            })
    }

    fn into_problem(self) -> Result<Problem> {
        let kind = match self.kind.as_str() {
            "keywords" => ProblemKind::Keywords {
                author_id: search_term(self.first("Author")?, "ai:"),
            },
            "msc-intersection" => {
                let classifications: Vec<String> = self
                    .children
                    .get("Classification")
                    .map(|values| values.iter().map(|v| search_term(v, "cc:")).collect())
                    .unwrap_or_default();
                if classifications.is_empty() {
                    return Err(MalformedProblemError {
                        id: self.id,
                        missing: "Classification",
                    }
                    .into());
                }
                ProblemKind::ClassificationIntersection { classifications }
            }
            "top-authors" => ProblemKind::TopAuthors {
                keyword: search_term(self.first("Keyword")?, "ut:"),
                before_year: self.first("BeforeYear")?.to_string(),
                after_year: self.first("AfterYear")?.to_string(),
            },
            other => ProblemKind::Unknown {
                kind: other.to_string(),
            },
        };
        Ok(Problem { id: self.id, kind })
    }
}

/// Reads every `Problem` element of the document, in document order.
pub fn parse_problems<R: BufRead>(input: R) -> Result<Vec<Problem>> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut problems = Vec::new();
    let mut current: Option<ProblemElement> = None;
    let mut child: Option<(String, String)> = None;

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| anyhow!("Problems XML error at byte {position}: {e}"))?;
        match event {
            Event::Start(e) if e.local_name().as_ref() == b"Problem" => {
                current = Some(ProblemElement::from_start(&e)?);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"Problem" => {
                problems.push(ProblemElement::from_start(&e)?.into_problem()?);
            }
            Event::Start(e) if current.is_some() => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                child = Some((name, String::new()));
            }
            Event::Text(e) => {
                if let Some((_, text)) = child.as_mut() {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some((_, text)) = child.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"Problem" => {
                if let Some(element) = current.take() {
                    let problem = element.into_problem()?;
                    debug!("Read problem {}: {:?}", problem.id, problem.kind);
                    problems.push(problem);
                }
            }
            Event::End(_) => {
                if let (Some(element), Some((name, text))) = (current.as_mut(), child.take()) {
                    element
                        .children
                        .entry(name)
                        .or_default()
                        .push(text.trim().to_string());
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(problems)
}

pub fn read_problems_file(path: &Path) -> Result<Vec<Problem>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open problems file {}", path.display()))?;
    parse_problems(BufReader::new(file))
        .with_context(|| format!("Failed to read problems from {}", path.display()))
}
