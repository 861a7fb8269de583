//! Text-line sources backed by files.

use crate::error::{EngineError, EngineResult};
use crate::io::compression::auto_detect_reader;
use crate::source::LineSource;
use std::fs::File;
use std::io::BufRead;
use std::path::Path;

/// Open `path` as a [`LineSource`], decompressing it if needed.
///
/// # Errors
/// [`EngineError::SourceUnavailable`] if the file cannot be opened.
pub fn open_lines(path: impl AsRef<Path>) -> EngineResult<LineSource<Box<dyn BufRead>>> {
    let path = path.as_ref();
    let name = path.display().to_string();
    let f = File::open(path).map_err(|e| EngineError::unavailable(&name, e))?;
    let reader = auto_detect_reader(f, path).map_err(|e| EngineError::unavailable(&name, e))?;
    Ok(LineSource::new(name, reader))
}
