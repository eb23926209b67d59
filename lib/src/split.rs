//! Re-partitions a large line-oriented file (typically the N-Triples output of a
//! conversion) into `<name>.part1`, `<name>.part2`, ... files.
//!
//! The ceiling is a soft bound on the size of each part: a part is closed
//! before a line that would push it over the ceiling, but a line is never split,
//! so a single line longer than the ceiling ends up alone in its own part.
//! Parts are streamed to disk as they are built.

use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Path of the `number`th (1-indexed) part for `input`.
pub fn part_path(input: &Path, number: usize) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(format!(".part{number}"));
    PathBuf::from(name)
}

struct OpenPart {
    path: PathBuf,
    writer: BufWriter<File>,
    bytes: u64,
}

impl OpenPart {
    fn create(path: PathBuf) -> Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create part file {}", path.display()))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            bytes: 0,
        })
    }

    fn close(mut self) -> Result<PathBuf> {
        self.writer
            .flush()
            .with_context(|| format!("Failed to write part file {}", self.path.display()))?;
        info!(
            "Created part file: {} ({})",
            self.path.display(),
            pretty_bytes::converter::convert(self.bytes as f64)
        );
        Ok(self.path)
    }
}

/// Splits the file at `input` into parts of at most `max_part_bytes` each
/// (see the module docs for the single-long-line exception). Returns the part
/// paths in order; an empty input produces no parts.
pub fn split_file(input: &Path, max_part_bytes: u64) -> Result<Vec<PathBuf>> {
    let file = File::open(input)
        .with_context(|| format!("Failed to open {} for splitting", input.display()))?;
    let mut reader = BufReader::new(file);
    let mut parts = Vec::new();
    let mut current: Option<OpenPart> = None;
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        if read == 0 {
            break;
        }
        let line_bytes = read as u64;

        let rollover = matches!(
            &current,
            Some(part) if part.bytes > 0 && part.bytes + line_bytes > max_part_bytes
        );
        if rollover {
            if let Some(part) = current.take() {
                parts.push(part.close()?);
            }
        }
        if current.is_none() {
            current = Some(OpenPart::create(part_path(input, parts.len() + 1))?);
        }
        if let Some(part) = current.as_mut() {
            part.writer
                .write_all(&line)
                .with_context(|| format!("Failed to write part file {}", part.path.display()))?;
            part.bytes += line_bytes;
        }
    }

    if let Some(part) = current.take() {
        parts.push(part.close()?);
    }
    Ok(parts)
}
