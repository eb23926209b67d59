//! Streaming reader that turns a zbMATH XML export into [`Record`]s.
//!
//! The document is consumed event by event with `quick-xml`, so only the record
//! currently being read is held in memory. Parsing is an explicit state machine:
//!
//! - `OutsideRecord`: everything is ignored until a `record` element opens.
//! - `InRecord`: between child elements of a record.
//! - `InField`: inside one or more nested elements of a record; character data
//!   is appended to the innermost open element only.
//!
//! Element names are compared by local name, so `zbmath:keyword` and `keyword`
//! are treated alike.

use crate::consts::RECORD_ELEMENT;
use crate::record::{Record, RecordBuilder};
use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug)]
struct OpenElement {
    name: String,
    text: String,
}

#[derive(Debug)]
enum ParseState {
    OutsideRecord,
    InRecord(RecordBuilder),
    InField {
        builder: RecordBuilder,
        open: Vec<OpenElement>,
    },
}

/// Owned view of the XML events the state machine cares about.
enum Step {
    Open(String),
    Close(String),
    Leaf(String),
    Text(String),
    Eof,
    Skip,
}

pub struct RecordReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    state: ParseState,
    records_seen: usize,
    skipped: usize,
    finished: bool,
}

impl RecordReader<BufReader<File>> {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open input {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            reader: Reader::from_reader(input),
            buf: Vec::new(),
            state: ParseState::OutsideRecord,
            records_seen: 0,
            skipped: 0,
            finished: false,
        }
    }

    /// Number of record elements closed so far, including skipped ones.
    pub fn records_seen(&self) -> usize {
        self.records_seen
    }

    /// Number of records dropped because they carried no document identifier.
    pub fn skipped_records(&self) -> usize {
        self.skipped
    }

    /// Reads ahead until the next record with an identifier is complete.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        while !self.finished {
            let step = self.read_step()?;
            if let Some(record) = self.apply(step) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    fn read_step(&mut self) -> Result<Step> {
        let position = self.reader.buffer_position();
        let event = self
            .reader
            .read_event_into(&mut self.buf)
            .map_err(|e| anyhow!("XML parse error at byte {position}: {e}"))?;
        let step = match event {
            Event::Start(e) => Step::Open(utf8_name(e.local_name().as_ref())?),
            Event::End(e) => Step::Close(utf8_name(e.local_name().as_ref())?),
            Event::Empty(e) => Step::Leaf(utf8_name(e.local_name().as_ref())?),
            Event::Text(e) => Step::Text(
                e.unescape()
                    .map_err(|e| anyhow!("XML text error at byte {position}: {e}"))?
                    .into_owned(),
            ),
            Event::CData(e) => {
                let raw = e.into_inner();
                Step::Text(
                    std::str::from_utf8(&raw)
                        .with_context(|| format!("CDATA at byte {position} is not UTF-8"))?
                        .to_string(),
                )
            }
            Event::Eof => Step::Eof,
            _ => Step::Skip,
        };
        self.buf.clear();
        Ok(step)
    }

    fn apply(&mut self, step: Step) -> Option<Record> {
        let state = std::mem::replace(&mut self.state, ParseState::OutsideRecord);
        let (next, done) = match step {
            Step::Open(name) if name == RECORD_ELEMENT => {
                if !matches!(state, ParseState::OutsideRecord) {
                    warn!("Record started inside another record; dropping the partial record");
                }
                (ParseState::InRecord(RecordBuilder::new()), None)
            }
            Step::Open(name) => match state {
                ParseState::OutsideRecord => (ParseState::OutsideRecord, None),
                ParseState::InRecord(builder) => (
                    ParseState::InField {
                        builder,
                        open: vec![OpenElement::new(name)],
                    },
                    None,
                ),
                ParseState::InField { builder, mut open } => {
                    open.push(OpenElement::new(name));
                    (ParseState::InField { builder, open }, None)
                }
            },
            Step::Leaf(name) if name == RECORD_ELEMENT => match state {
                ParseState::OutsideRecord => {
                    self.records_seen += 1;
                    self.skip_record();
                    (ParseState::OutsideRecord, None)
                }
                other => (other, None),
            },
            Step::Leaf(name) => match state {
                ParseState::InRecord(mut builder) => {
                    builder.push_element(&name, "");
                    (ParseState::InRecord(builder), None)
                }
                ParseState::InField { mut builder, open } => {
                    builder.push_element(&name, "");
                    (ParseState::InField { builder, open }, None)
                }
                ParseState::OutsideRecord => (ParseState::OutsideRecord, None),
            },
            Step::Text(text) => match state {
                ParseState::InField { builder, mut open } => {
                    if let Some(top) = open.last_mut() {
                        top.text.push_str(&text);
                    }
                    (ParseState::InField { builder, open }, None)
                }
                other => (other, None),
            },
            Step::Close(name) => match state {
                ParseState::InField {
                    mut builder,
                    mut open,
                } => {
                    if let Some(closed) = open.pop() {
                        builder.push_element(&closed.name, &closed.text);
                    }
                    if open.is_empty() {
                        (ParseState::InRecord(builder), None)
                    } else {
                        (ParseState::InField { builder, open }, None)
                    }
                }
                ParseState::InRecord(builder) if name == RECORD_ELEMENT => {
                    self.records_seen += 1;
                    let record = builder.finish();
                    if record.is_none() {
                        self.skip_record();
                    }
                    (ParseState::OutsideRecord, record)
                }
                ParseState::OutsideRecord if name == RECORD_ELEMENT => {
                    debug!(
                        "Ignoring a record end without a matching start after record #{}",
                        self.records_seen
                    );
                    (ParseState::OutsideRecord, None)
                }
                other => (other, None),
            },
            Step::Eof => {
                if !matches!(state, ParseState::OutsideRecord) {
                    warn!("Input ended inside a record; the partial record was dropped");
                }
                self.finished = true;
                (ParseState::OutsideRecord, None)
            }
            Step::Skip => (state, None),
        };
        self.state = next;
        done
    }

    fn skip_record(&mut self) {
        self.skipped += 1;
        debug!(
            "Skipping record #{} without a document identifier",
            self.records_seen
        );
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Ok(record) => record.map(Ok),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl OpenElement {
    fn new(name: String) -> Self {
        Self {
            name,
            text: String::new(),
        }
    }
}

fn utf8_name(raw: &[u8]) -> Result<String> {
    Ok(std::str::from_utf8(raw)
        .context("Element name is not valid UTF-8")?
        .to_string())
}
