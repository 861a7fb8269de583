//! CSV row sources.
//!
//! Rows are read as raw bytes and decoded per [`Encoding`], so a Latin-1 file
//! never fails on bytes that are invalid UTF-8. Row lengths may vary; a short
//! row is the mapper's problem, not the reader's.

use crate::config::Encoding;
use crate::error::{EngineError, EngineResult};
use crate::io::compression::auto_detect_reader;
use crate::record::Record;
use crate::source::Source;
use csv::{ByteRecord, ReaderBuilder};
use std::fs::File;
use std::io::{BufRead, Read};
use std::path::Path;

/// One [`Record::Row`] per CSV row.
pub struct CsvSource<R> {
    name: String,
    reader: csv::Reader<R>,
    encoding: Encoding,
    row: ByteRecord,
    rows_read: u64,
}

impl<R: Read> CsvSource<R> {
    /// Wrap any reader. When `has_headers` is set the first row is skipped.
    pub fn new(name: impl Into<String>, reader: R, has_headers: bool, encoding: Encoding) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(has_headers)
            .flexible(true)
            .from_reader(reader);
        Self {
            name: name.into(),
            reader,
            encoding,
            row: ByteRecord::new(),
            rows_read: 0,
        }
    }
}

impl<R: Read> Source for CsvSource<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_record(&mut self) -> EngineResult<Option<Record>> {
        let more = self
            .reader
            .read_byte_record(&mut self.row)
            .map_err(|e| EngineError::SourceRead {
                source_name: self.name.clone(),
                record: self.rows_read + 1,
                source: e.into(),
            })?;
        if !more {
            return Ok(None);
        }
        self.rows_read += 1;
        let fields = self.row.iter().map(|f| decode(f, self.encoding)).collect();
        Ok(Some(Record::Row(fields)))
    }
}

/// Decode one field.
#[must_use]
pub fn decode(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        Encoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Open `path` as a [`CsvSource`], decompressing it if needed.
///
/// # Errors
/// [`EngineError::SourceUnavailable`] if the file cannot be opened.
pub fn open_csv(
    path: impl AsRef<Path>,
    has_headers: bool,
    encoding: Encoding,
) -> EngineResult<CsvSource<Box<dyn BufRead>>> {
    let path = path.as_ref();
    let name = path.display().to_string();
    let f = File::open(path).map_err(|e| EngineError::unavailable(&name, e))?;
    let reader = auto_detect_reader(f, path).map_err(|e| EngineError::unavailable(&name, e))?;
    Ok(CsvSource::new(name, reader, has_headers, encoding))
}
