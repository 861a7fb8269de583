//! # Irontally
//!
//! A **batch aggregation engine**: map every input record to keyed
//! contributions, combine them per partition, merge the partitions behind a
//! single barrier, then emit either the full aggregate or the top K keys.
//!
//! ## Key Features
//!
//! - **Pluggable mappers** - the [`Mapper`] trait, closures via [`FnMapper`],
//!   and two built-ins: token counting and field joining
//! - **Associative merge ops** - [`Sum`], [`Count`], [`Max`], [`Min`], or any
//!   custom [`CombineFn`]
//! - **Deterministic top-K** - a bounded min-heap with first-seen tie-breaking
//! - **Sequential and parallel execution** - Rayon workers over contiguous
//!   partitions with identical results
//! - **File inputs** - text lines and CSV rows, gzip detected automatically
//!   (optional via feature flags)
//!
//! ## Quick Start
//!
//! ```
//! use irontally::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let job = JobConfig::hashtag_count().validate()?;
//! let mut source = VecSource::new(["a #x #y", "b", "c #z"]);
//!
//! let out = run_job(&job, &mut source, None)?;
//! assert_eq!(
//!     out.results,
//!     vec![("tweets".to_string(), 3), ("hashtags".to_string(), 3)]
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Phases
//!
//! 1. **Source** - a [`Source`] yields records once, front to back.
//! 2. **Map + local combine** - each partition folds its mapper output into
//!    its own [`AggregateState`]. Records the mapper rejects are skipped and
//!    counted.
//! 3. **Merge** - after every partition returns, one owner merges the states.
//! 4. **Reduce** - [`reducer::reduce`] emits every key in first-seen order,
//!    or the K largest through a [`TopKSelector`].
//!
//! ## Feature Flags
//!
//! - `io-csv` - CSV row sources (default)
//! - `compression-gzip` - transparent gzip input (default)

pub mod aggregate;
pub mod combiners;
pub mod config;
pub mod error;
pub mod io;
pub mod job;
pub mod mapper;
pub mod mappers;
pub mod metrics;
pub mod record;
pub mod reducer;
pub mod runner;
pub mod sink;
pub mod source;
pub mod testing;
pub mod topk;

// Re-exports for a flat public API
pub use aggregate::{AggregateState, Aggregated, FirstSeen};
pub use combiners::{CombineFn, Count, Max, Min, Sum};
pub use config::{JobConfig, MergeOp, Mode, ValidatedJob};
pub use error::{EngineError, EngineResult};
pub use job::{JobOutput, open_sources, run_job, write_results};
pub use mapper::{FnMapper, MalformedRecord, Mapper};
pub use mappers::{BuiltinMapper, FieldJoin, TokenCounter};
pub use metrics::MetricsCollector;
pub use record::Record;
pub use reducer::OutputMode;
pub use runner::{CancelToken, ExecMode, RunStats, Runner};
pub use sink::{JsonlSink, Sink, TsvSink, VecSink};
pub use source::{ChainSource, LineSource, Source, VecSource};
pub use topk::TopKSelector;

#[cfg(feature = "io-csv")]
pub use io::csv::{CsvSource, open_csv};
pub use io::glob::expand_inputs;
pub use io::text::open_lines;
