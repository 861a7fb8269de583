//! Run-level errors.
//!
//! Record-level problems never show up here: a record the mapper cannot use is
//! a [`MalformedRecord`](crate::mapper::MalformedRecord), which the aggregator
//! absorbs and counts. Everything in [`EngineError`] aborts the run before the
//! merge barrier and reaches the caller unchanged.

use thiserror::Error;

/// Fatal errors surfaced by sources, configuration, and the runner.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The source could not produce records at all (missing or unreadable backing data).
    #[error("source `{source_name}` is unavailable")]
    SourceUnavailable {
        source_name: String,
        #[source]
        source: anyhow::Error,
    },

    /// The source opened but failed partway through.
    #[error("failed reading record #{record} from source `{source_name}`")]
    SourceRead {
        source_name: String,
        record: u64,
        #[source]
        source: anyhow::Error,
    },

    /// The job configuration is unusable; raised before any record is read.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("failed to build worker thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The run was cancelled before every partition finished.
    #[error("run cancelled before the merge barrier")]
    Cancelled,
}

impl EngineError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub fn unavailable(source_name: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            source: source.into(),
        }
    }
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
