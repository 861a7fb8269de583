//! Output sinks for final `(key, value)` sequences.
//!
//! Sinks receive pairs in exactly the order the reducer produced them.
//!
//! - [`VecSink`] -- keeps the pairs in memory.
//! - [`TsvSink`] -- `"key"\tvalue` lines, both sides JSON-encoded (the classic
//!   streaming map-reduce output format).
//! - [`JsonlSink`] -- one `["key", value]` JSON array per line.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

/// Consumer of the final ordered result sequence.
pub trait Sink<V> {
    /// Accept the next pair.
    ///
    /// # Errors
    /// Returns an error if the pair cannot be written.
    fn accept(&mut self, key: &str, value: &V) -> Result<()>;

    /// Flush anything buffered.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Feed every pair to `sink` and finish it; returns the number of pairs written.
///
/// # Errors
/// Stops at the first failing pair.
pub fn write_all<V, S: Sink<V> + ?Sized>(sink: &mut S, pairs: &[(String, V)]) -> Result<usize> {
    for (i, (k, v)) in pairs.iter().enumerate() {
        sink.accept(k, v)
            .with_context(|| format!("write result #{}", i + 1))?;
    }
    sink.finish()?;
    Ok(pairs.len())
}

/// Collects pairs in memory.
#[derive(Debug, Clone, Default)]
pub struct VecSink<V> {
    pairs: Vec<(String, V)>,
}

impl<V> VecSink<V> {
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    #[must_use]
    pub fn pairs(&self) -> &[(String, V)] {
        &self.pairs
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<(String, V)> {
        self.pairs
    }
}

impl<V: Clone> Sink<V> for VecSink<V> {
    fn accept(&mut self, key: &str, value: &V) -> Result<()> {
        self.pairs.push((key.to_string(), value.clone()));
        Ok(())
    }
}

/// Tab-separated, JSON-encoded key and value per line.
pub struct TsvSink<W: Write> {
    out: W,
}

impl<W: Write> TsvSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<V: Serialize, W: Write> Sink<V> for TsvSink<W> {
    fn accept(&mut self, key: &str, value: &V) -> Result<()> {
        serde_json::to_writer(&mut self.out, key)?;
        self.out.write_all(b"\t")?;
        serde_json::to_writer(&mut self.out, value)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// One `[key, value]` JSON array per line.
pub struct JsonlSink<W: Write> {
    out: W,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<V: Serialize, W: Write> Sink<V> for JsonlSink<W> {
    fn accept(&mut self, key: &str, value: &V) -> Result<()> {
        serde_json::to_writer(&mut self.out, &(key, value))?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
