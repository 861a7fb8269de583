//! Transparent decompression of input files.
//!
//! Inputs are checked by file extension first and by magic bytes second, so a
//! gzip file is read correctly even without a `.gz` suffix. Without any
//! compression feature the detection is a buffered pass-through.
//!
//! Built-in codecs:
//! - **Gzip** (`.gz`) - via `flate2` crate (feature: `compression-gzip`)

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// A decompression codec.
pub trait CompressionCodec: Send + Sync {
    /// Human-readable codec name (e.g., "gzip").
    fn name(&self) -> &str;

    /// Lowercase file extensions with the leading dot (e.g., `&[".gz"]`).
    fn extensions(&self) -> &[&str];

    /// Leading bytes identifying the format, if it has any.
    fn magic_bytes(&self) -> Option<&[u8]>;

    /// Wrap a reader with decompression.
    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>>;
}

fn codecs() -> Vec<Box<dyn CompressionCodec>> {
    vec![
        #[cfg(feature = "compression-gzip")]
        Box::new(GzipCodec),
    ]
}

fn detect_from_extension(path: &Path) -> Option<Box<dyn CompressionCodec>> {
    let path_str = path.to_string_lossy().to_lowercase();
    codecs()
        .into_iter()
        .find(|c| c.extensions().iter().any(|ext| path_str.ends_with(ext)))
}

/// Peek at the start of the stream without consuming it.
fn detect_from_magic<R: BufRead>(reader: &mut R) -> Option<Box<dyn CompressionCodec>> {
    let buf = reader.fill_buf().ok()?;
    if buf.is_empty() {
        return None;
    }
    codecs()
        .into_iter()
        .find(|c| c.magic_bytes().is_some_and(|m| buf.starts_with(m)))
}

/// Wrap `reader` with a decompressor if `path_hint` or the leading bytes call for one.
///
/// # Errors
/// Returns an error if the codec cannot initialize on the stream.
pub fn auto_detect_reader<R: Read + 'static>(
    reader: R,
    path_hint: impl AsRef<Path>,
) -> Result<Box<dyn BufRead>> {
    if let Some(codec) = detect_from_extension(path_hint.as_ref()) {
        let inner = codec
            .wrap_reader_dyn(Box::new(reader))
            .with_context(|| format!("wrap reader with {} codec", codec.name()))?;
        return Ok(Box::new(BufReader::new(inner)));
    }

    let mut buf_reader = BufReader::new(reader);
    if let Some(codec) = detect_from_magic(&mut buf_reader) {
        let inner = codec
            .wrap_reader_dyn(Box::new(buf_reader))
            .with_context(|| format!("wrap reader with {} codec", codec.name()))?;
        return Ok(Box::new(BufReader::new(inner)));
    }

    Ok(Box::new(buf_reader))
}

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn extensions(&self) -> &[&str] {
        &[".gz", ".gzip"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x1f, 0x8b])
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        use flate2::read::MultiGzDecoder;
        Ok(Box::new(MultiGzDecoder::new(reader)))
    }
}
