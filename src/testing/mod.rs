//! Testing utilities for aggregation jobs.
//!
//! - **Assertions**: compare full aggregates and rankings with readable failures
//! - **Fixtures**: small tweet and visitor datasets with known answers
//! - **Mock I/O**: temporary text, gzip and CSV input files
//!
//! # Quick Start
//!
//! ```
//! use irontally::*;
//! use irontally::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let job = JobConfig::hashtag_count().validate()?;
//! let mut source = VecSource::new(sample_tweets());
//! let out = run_job(&job, &mut source, None)?;
//!
//! assert_kv_unordered_equal(out.results, sample_tweets_expected());
//! # Ok(())
//! # }
//! ```

mod assertions;
mod fixtures;
mod mock_io;

pub use assertions::*;
pub use fixtures::*;
pub use mock_io::*;
