//! One conversion run: stream records out of the XML input, turn each into
//! N-Triples lines and push them through a [`TripleBuffer`] into the output.

use crate::buffer::TripleBuffer;
use crate::errors::InvalidRecordError;
use crate::parser::RecordReader;
use crate::triples::serialize_record;
use anyhow::{Context, Result};
use log::{info, warn};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub records_seen: usize,
    pub records_converted: usize,
    /// Records without a document identifier
    pub skipped_records: usize,
    /// Records whose identifier or field names could not form IRIs
    pub invalid_records: usize,
    pub triples_written: usize,
    pub bytes_written: u64,
    pub flushes: usize,
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Records read: {}", self.records_seen)?;
        writeln!(f, "Records converted: {}", self.records_converted)?;
        writeln!(f, "Records skipped (no identifier): {}", self.skipped_records)?;
        writeln!(f, "Records skipped (invalid IRI): {}", self.invalid_records)?;
        writeln!(f, "Triples written: {}", self.triples_written)?;
        write!(
            f,
            "Bytes written: {} in {} writes",
            pretty_bytes::converter::convert(self.bytes_written as f64),
            self.flushes
        )
    }
}

/// Converts everything `input` yields into `output`. The threshold is checked
/// after each record, never in the middle of one.
pub fn convert<R: BufRead, W: Write>(
    input: R,
    output: W,
    flush_threshold: usize,
) -> Result<ConversionReport> {
    let mut records = RecordReader::new(input);
    let mut buffer = TripleBuffer::new(output, flush_threshold);
    let mut report = ConversionReport::default();

    while let Some(record) = records.next_record()? {
        match serialize_record(&record) {
            Ok(lines) => {
                for line in lines {
                    buffer.append(line);
                }
                report.records_converted += 1;
            }
            Err(e) if e.downcast_ref::<InvalidRecordError>().is_some() => {
                warn!("{e}");
                report.invalid_records += 1;
            }
            Err(e) => return Err(e),
        }
        buffer.flush_if_over_threshold()?;
    }

    let stats = buffer.finish()?;
    report.records_seen = records.records_seen();
    report.skipped_records = records.skipped_records();
    report.triples_written = stats.triples_flushed;
    report.bytes_written = stats.bytes_flushed;
    report.flushes = stats.flushes;

    if report.skipped_records > 0 {
        warn!(
            "{} of {} records had no document identifier and were skipped",
            report.skipped_records, report.records_seen
        );
    }
    Ok(report)
}

/// Converts the XML file at `input`, appending triples to `output` (created if
/// missing, never truncated).
pub fn convert_file(input: &Path, output: &Path, flush_threshold: usize) -> Result<ConversionReport> {
    info!(
        "Converting {} to {} (flush threshold {})",
        input.display(),
        output.display(),
        pretty_bytes::converter::convert(flush_threshold as f64)
    );
    let source = File::open(input)
        .with_context(|| format!("Failed to open input {}", input.display()))?;
    let destination = OpenOptions::new()
        .create(true)
        .append(true)
        .open(output)
        .with_context(|| format!("Failed to open output {}", output.display()))?;
    let report = convert(BufReader::new(source), destination, flush_threshold)?;
    info!(
        "Converted {} records into {} triples",
        report.records_converted, report.triples_written
    );
    Ok(report)
}
