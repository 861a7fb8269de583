//! Input discovery: turn command-line input arguments into file lists.
//!
//! # Examples
//!
//! ```no_run
//! use irontally::io::glob::expand_inputs;
//!
//! // Literal paths pass through; patterns expand to their sorted matches.
//! let files = expand_inputs(&["tweets.txt".to_string(), "logs/*.txt.gz".to_string()])?;
//! # use anyhow::Error; Ok::<(), Error>(())
//! ```

use anyhow::{Context, Result, bail};
use glob::glob;
use std::path::PathBuf;

/// Expand a glob pattern into a sorted vector of matching files.
///
/// Supports the usual syntax: `*`, `?`, `**`, `[abc]`, `[!abc]`. Directories
/// are skipped. Zero matches is an empty vector, not an error.
///
/// # Errors
/// Returns an error if the pattern is invalid or a match cannot be read.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut result = Vec::new();
    for entry in paths {
        let path =
            entry.with_context(|| format!("error reading glob entry for pattern: {pattern}"))?;
        if path.is_file() {
            result.push(path);
        }
    }

    // Sort for deterministic order
    result.sort();

    Ok(result)
}

/// Like [`expand_glob`] but zero matches is an error.
///
/// # Errors
/// Returns an error if the pattern is invalid or matches no file.
pub fn expand_glob_required(pattern: &str) -> Result<Vec<PathBuf>> {
    let files = expand_glob(pattern)?;
    if files.is_empty() {
        bail!("no files found matching pattern: {pattern}");
    }
    Ok(files)
}

fn is_pattern(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// Expand every argument, keeping argument order.
///
/// Arguments without glob metacharacters are taken literally, so a missing
/// file surfaces later as an unavailable source with its real path.
///
/// # Errors
/// Returns an error if a pattern is invalid or matches no file.
pub fn expand_inputs(args: &[String]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for arg in args {
        if is_pattern(arg) {
            out.extend(expand_glob_required(arg)?);
        } else {
            out.push(PathBuf::from(arg));
        }
    }
    Ok(out)
}
