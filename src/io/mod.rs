//! File-backed sources and input discovery.
//!
//! - [`text`] -- line sources over (optionally compressed) text files.
//! - [`csv`] -- row sources over CSV files (feature `io-csv`).
//! - [`compression`] -- transparent decompression by extension or magic bytes.
//! - [`glob`] -- expansion of input patterns into file lists.

pub mod compression;
pub mod glob;
pub mod text;

#[cfg_attr(docsrs, doc(cfg(feature = "io-csv")))]
#[cfg(feature = "io-csv")]
pub mod csv;
