//! Bounded in-memory buffer of serialized triples in front of an append-only
//! destination.
//!
//! Lines are accumulated until the caller asks for a threshold check (once per
//! record); when the buffered size strictly exceeds the threshold the whole
//! buffer is written with a single `write_all` and cleared. [`TripleBuffer::finish`]
//! writes whatever is left. If the buffer is dropped without `finish` (for
//! instance because the conversion bailed out with an error), `Drop` makes a
//! last attempt to write the pending lines so complete triples are not lost.

use crate::triples::SerializedTriple;
use anyhow::{Context, Result};
use log::{debug, error};
use std::io::Write;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WriterState {
    Accumulating,
    Flushing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferStats {
    /// Number of writes issued to the destination
    pub flushes: usize,
    pub triples_flushed: usize,
    pub bytes_appended: u64,
    pub bytes_flushed: u64,
}

pub struct TripleBuffer<W: Write> {
    destination: W,
    threshold: usize,
    pending: Vec<String>,
    pending_bytes: usize,
    state: WriterState,
    stats: BufferStats,
    // set when a write failed part-way; nothing is retried after that
    poisoned: bool,
}

impl<W: Write> TripleBuffer<W> {
    pub fn new(destination: W, threshold: usize) -> Self {
        Self {
            destination,
            threshold,
            pending: Vec::new(),
            pending_bytes: 0,
            state: WriterState::Accumulating,
            stats: BufferStats::default(),
            poisoned: false,
        }
    }

    pub fn append(&mut self, triple: SerializedTriple) {
        self.pending_bytes += triple.len();
        self.stats.bytes_appended += triple.len() as u64;
        self.pending.push(triple.into_string());
    }

    pub fn pending_bytes(&self) -> usize {
        self.pending_bytes
    }

    pub fn pending_triples(&self) -> usize {
        self.pending.len()
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn stats(&self) -> &BufferStats {
        &self.stats
    }

    pub fn get_ref(&self) -> &W {
        &self.destination
    }

    /// Flushes when the buffered size is strictly above the threshold.
    /// Returns whether a flush happened.
    pub fn flush_if_over_threshold(&mut self) -> Result<bool> {
        if self.pending_bytes > self.threshold {
            self.flush()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Writes any pending lines. Call once at end of stream.
    pub fn finish(&mut self) -> Result<BufferStats> {
        if !self.pending.is_empty() {
            self.flush()?;
        }
        Ok(self.stats.clone())
    }

    fn flush(&mut self) -> Result<()> {
        self.state = WriterState::Flushing;
        let chunk = self.pending.concat();
        debug!(
            "Flushing {} triples ({})",
            self.pending.len(),
            pretty_bytes::converter::convert(chunk.len() as f64)
        );
        let written = self
            .destination
            .write_all(chunk.as_bytes())
            .and_then(|_| self.destination.flush());
        self.state = WriterState::Accumulating;
        if let Err(e) = written {
            self.poisoned = true;
            return Err(e).context("Failed to write buffered triples");
        }
        self.stats.flushes += 1;
        self.stats.triples_flushed += self.pending.len();
        self.stats.bytes_flushed += chunk.len() as u64;
        self.pending.clear();
        self.pending_bytes = 0;
        Ok(())
    }
}

impl<W: Write> Drop for TripleBuffer<W> {
    fn drop(&mut self) {
        if self.pending.is_empty() || self.poisoned {
            return;
        }
        if let Err(e) = self.flush() {
            error!("Could not write {} pending triples: {e:#}", self.pending.len());
        }
    }
}
