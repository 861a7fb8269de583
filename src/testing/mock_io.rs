//! Temporary input files for tests.
//!
//! Every helper returns a guard that deletes the file when dropped.

#[cfg(feature = "io-csv")]
use crate::config::Encoding;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

/// A temporary file, deleted on drop.
pub struct TempFilePath {
    #[allow(dead_code)]
    temp_file: NamedTempFile,
    path: PathBuf,
}

impl TempFilePath {
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let temp_file = NamedTempFile::new()?;
        let path = temp_file.path().to_path_buf();
        Ok(Self { temp_file, path })
    }

    /// Create a temporary file whose name ends in `.{extension}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn with_extension(extension: &str) -> std::io::Result<Self> {
        let temp_file = tempfile::Builder::new()
            .suffix(&format!(".{extension}"))
            .tempfile()?;
        let path = temp_file.path().to_path_buf();
        Ok(Self { temp_file, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A temporary directory, deleted with its contents on drop.
pub struct TempDirPath {
    #[allow(dead_code)]
    temp_dir: TempDir,
    path: PathBuf,
}

impl TempDirPath {
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        Ok(Self { temp_dir, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of `filename` inside this directory.
    #[must_use]
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.path.join(filename)
    }

    /// Write `lines` to `filename` inside this directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_lines<S: AsRef<str>>(&self, filename: &str, lines: &[S]) -> std::io::Result<PathBuf> {
        let path = self.file_path(filename);
        write_lines_to(File::create(&path)?, lines)?;
        Ok(path)
    }
}

fn write_lines_to<W: Write, S: AsRef<str>>(mut out: W, lines: &[S]) -> std::io::Result<W> {
    for line in lines {
        out.write_all(line.as_ref().as_bytes())?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(out)
}

/// Create a temporary `.txt` file with one line per entry.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created.
///
/// # Example
///
/// ```
/// use irontally::testing::mock_lines_file;
///
/// let file = mock_lines_file(&["a #x", "b"]).unwrap();
/// assert!(file.path().exists());
/// ```
pub fn mock_lines_file<S: AsRef<str>>(lines: &[S]) -> std::io::Result<TempFilePath> {
    let temp = TempFilePath::with_extension("txt")?;
    write_lines_to(File::create(temp.path())?, lines)?;
    Ok(temp)
}

/// Create a gzip-compressed temporary file with one line per entry.
///
/// Pass an extension other than `gz` to exercise magic-byte detection.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created.
#[cfg(feature = "compression-gzip")]
pub fn mock_gz_lines_file<S: AsRef<str>>(
    lines: &[S],
    extension: &str,
) -> std::io::Result<TempFilePath> {
    use flate2::Compression;
    use flate2::write::GzEncoder;

    let temp = TempFilePath::with_extension(extension)?;
    let encoder = GzEncoder::new(File::create(temp.path())?, Compression::default());
    write_lines_to(encoder, lines)?.finish()?;
    Ok(temp)
}

/// Create a temporary CSV file from raw rows, optionally led by a header.
///
/// Fields are written in `encoding`; with [`Encoding::Latin1`] a character
/// above U+00FF becomes `?`.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created.
#[cfg(feature = "io-csv")]
pub fn mock_csv_file(
    rows: &[Vec<String>],
    header: Option<&[String]>,
    encoding: Encoding,
) -> std::io::Result<TempFilePath> {
    let temp = TempFilePath::with_extension("csv")?;
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(temp.path())?;

    for row in header.into_iter().chain(rows.iter().map(Vec::as_slice)) {
        writer.write_record(row.iter().map(|f| encode(f, encoding)))?;
    }
    writer.flush()?;
    Ok(temp)
}

#[cfg(feature = "io-csv")]
fn encode(field: &str, encoding: Encoding) -> Vec<u8> {
    match encoding {
        Encoding::Utf8 => field.as_bytes().to_vec(),
        Encoding::Latin1 => field
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect(),
    }
}
