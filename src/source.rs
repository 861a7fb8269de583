//! Record sources.
//!
//! A [`Source`] is a finite, forward-only, single-pass sequence of
//! [`Record`]s. Once it returns `Ok(None)` it stays exhausted; nothing in the
//! engine ever rewinds a source, so there is no "already loaded" flag to keep
//! in sync between calls.
//!
//! Built-in sources:
//! - [`VecSource`] -- in-memory records, consumed by value.
//! - [`LineSource`] -- one [`Record::Line`] per line of any `BufRead`.
//! - [`ChainSource`] -- several sources drained back to back.
//! - [`CsvSource`](crate::io::csv::CsvSource) -- one [`Record::Row`] per CSV row
//!   (feature `io-csv`).

use crate::error::{EngineError, EngineResult};
use crate::record::Record;
use std::collections::VecDeque;
use std::io::BufRead;

/// A finite, single-pass producer of records.
pub trait Source {
    /// Human-readable name used in logs and errors (usually a path).
    fn name(&self) -> &str;

    /// Produce the next record, `Ok(None)` at end of stream.
    ///
    /// # Errors
    /// Any error is fatal for the run: the runner aborts before merging.
    fn next_record(&mut self) -> EngineResult<Option<Record>>;
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn next_record(&mut self) -> EngineResult<Option<Record>> {
        (**self).next_record()
    }
}

/// Drain a source to the end, keeping input order.
///
/// # Errors
/// Propagates the first error the source reports.
pub fn drain<S: Source + ?Sized>(source: &mut S) -> EngineResult<Vec<Record>> {
    let mut out = Vec::new();
    while let Some(rec) = source.next_record()? {
        out.push(rec);
    }
    Ok(out)
}

/// In-memory source.
pub struct VecSource {
    name: String,
    records: std::vec::IntoIter<Record>,
}

impl VecSource {
    pub fn new<I, R>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Record>,
    {
        Self::named("memory", records)
    }

    pub fn named<I, R>(name: impl Into<String>, records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Record>,
    {
        let records: Vec<Record> = records.into_iter().map(Into::into).collect();
        Self {
            name: name.into(),
            records: records.into_iter(),
        }
    }

    /// A source with no records.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::<Record>::new())
    }
}

impl Source for VecSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_record(&mut self) -> EngineResult<Option<Record>> {
        Ok(self.records.next())
    }
}

/// Line-oriented text source over any buffered reader.
///
/// Lines are split on `\n`; a trailing `\r` is dropped and invalid UTF-8 is
/// replaced rather than rejected, so a stray byte never fails a whole file.
pub struct LineSource<R> {
    name: String,
    reader: R,
    line_no: u64,
    done: bool,
    buf: Vec<u8>,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader,
            line_no: 0,
            done: false,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Source for LineSource<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_record(&mut self) -> EngineResult<Option<Record>> {
        if self.done {
            return Ok(None);
        }
        self.buf.clear();
        let n = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|e| EngineError::SourceRead {
                source_name: self.name.clone(),
                record: self.line_no + 1,
                source: e.into(),
            })?;
        if n == 0 {
            self.done = true;
            return Ok(None);
        }
        self.line_no += 1;
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        Ok(Some(Record::Line(String::from_utf8_lossy(&self.buf).into_owned())))
    }
}

/// Several sources read one after another, in the given order.
pub struct ChainSource {
    name: String,
    sources: VecDeque<Box<dyn Source>>,
}

impl ChainSource {
    #[must_use]
    pub fn new(sources: Vec<Box<dyn Source>>) -> Self {
        let name = sources
            .iter()
            .map(|s| s.name().to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self {
            name,
            sources: sources.into(),
        }
    }
}

impl Source for ChainSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_record(&mut self) -> EngineResult<Option<Record>> {
        while let Some(front) = self.sources.front_mut() {
            if let Some(rec) = front.next_record()? {
                return Ok(Some(rec));
            }
            self.sources.pop_front();
        }
        Ok(None)
    }
}
