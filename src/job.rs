//! Job driver: validated configuration in, ordered results out.
//!
//! [`run_job`] picks the combiner for the configured merge op, runs the
//! map / combine / merge phases through a [`Runner`], and reduces the merged
//! state to the configured output. [`open_sources`] turns input paths into
//! one chained source according to the input format.

use crate::combiners::{CombineFn, Count, Max, Min, Sum};
use crate::config::{InputConfig, InputFormat, MergeOp, ValidatedJob};
use crate::error::EngineResult;
use crate::io::text::open_lines;
use crate::mappers::BuiltinMapper;
use crate::metrics::{GaugeMetric, MetricsCollector, RESULTS_EMITTED};
use crate::reducer::{OutputMode, reduce};
use crate::runner::{CancelToken, RunOutput, RunStats, Runner};
use crate::sink::{Sink, write_all};
use crate::source::{ChainSource, Source};
use std::path::{Path, PathBuf};
use tracing::info;

/// Final results of one job plus its run counters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobOutput {
    pub results: Vec<(String, u64)>,
    pub stats: RunStats,
}

impl JobOutput {
    /// Add this job's counters to `metrics`.
    #[allow(clippy::cast_precision_loss)]
    pub fn record_metrics(&self, metrics: &MetricsCollector) {
        metrics.record_run(&self.stats);
        metrics.increment_counter(RESULTS_EMITTED, self.results.len() as u64);
        if self.stats.elapsed_ms > 0 {
            let per_sec = self.stats.records_read as f64 * 1000.0 / self.stats.elapsed_ms as f64;
            metrics.register(Box::new(
                GaugeMetric::new("records_per_sec", per_sec)
                    .with_description("Records mapped per second of run time"),
            ));
        }
    }
}

/// Runner for a validated job's execution mode.
#[must_use]
pub fn runner_for(job: &ValidatedJob) -> Runner {
    Runner {
        mode: job.exec,
        ..Runner::default()
    }
}

/// Run `job` over `source`.
///
/// # Errors
/// Source errors and [`EngineError::Cancelled`](crate::error::EngineError::Cancelled) propagate unchanged; no
/// partial results are returned.
pub fn run_job<S: Source + ?Sized>(
    job: &ValidatedJob,
    source: &mut S,
    cancel: Option<CancelToken>,
) -> EngineResult<JobOutput> {
    let mut runner = runner_for(job);
    runner.cancel = cancel;
    info!(merge_op = ?job.merge_op, output = ?job.output, "starting job");
    match job.merge_op {
        MergeOp::Sum => execute(&runner, source, &job.mapper, &Sum::<u64>::new(), job.output),
        MergeOp::Count => execute(&runner, source, &job.mapper, &Count, job.output),
        MergeOp::Max => execute(&runner, source, &job.mapper, &Max::<u64>::new(), job.output),
        MergeOp::Min => execute(&runner, source, &job.mapper, &Min::<u64>::new(), job.output),
    }
}

fn execute<S, A, C>(
    runner: &Runner,
    source: &mut S,
    mapper: &BuiltinMapper,
    comb: &C,
    output: OutputMode,
) -> EngineResult<JobOutput>
where
    S: Source + ?Sized,
    C: CombineFn<u64, A, u64>,
    A: Send,
{
    let RunOutput { state, stats } = runner.run(source, mapper, comb)?;
    let results = reduce(state, comb, output);
    info!(results = results.len(), "reduce complete");
    Ok(JobOutput { results, stats })
}

/// Open every path as a source of the configured format, chained in order.
///
/// All files are opened before any is read, so a missing input fails the
/// job before aggregation starts.
///
/// # Errors
/// [`SourceUnavailable`](crate::error::EngineError::SourceUnavailable) for the
/// first path that cannot be opened, or
/// [`InvalidConfiguration`](crate::error::EngineError::InvalidConfiguration) if CSV input was asked for
/// in a build without the `io-csv` feature.
pub fn open_sources(paths: &[PathBuf], input: &InputConfig) -> EngineResult<ChainSource> {
    let mut sources: Vec<Box<dyn Source>> = Vec::with_capacity(paths.len());
    for path in paths {
        let source: Box<dyn Source> = match input.format {
            InputFormat::Lines => Box::new(open_lines(path)?),
            InputFormat::Csv => open_csv_source(path, input)?,
        };
        sources.push(source);
    }
    info!(files = sources.len(), format = ?input.format, "inputs opened");
    Ok(ChainSource::new(sources))
}

#[cfg(feature = "io-csv")]
fn open_csv_source(path: &Path, input: &InputConfig) -> EngineResult<Box<dyn Source>> {
    Ok(Box::new(crate::io::csv::open_csv(
        path,
        input.has_headers,
        input.encoding,
    )?))
}

#[cfg(not(feature = "io-csv"))]
fn open_csv_source(_path: &Path, _input: &InputConfig) -> EngineResult<Box<dyn Source>> {
    Err(crate::error::EngineError::invalid_config(
        "csv input requires the `io-csv` feature",
    ))
}

/// Write `results` to `sink` in order and finish it.
///
/// # Errors
/// Returns the first sink error.
pub fn write_results<S: Sink<u64> + ?Sized>(
    sink: &mut S,
    results: &[(String, u64)],
) -> anyhow::Result<usize> {
    let n = write_all(sink, results)?;
    info!(written = n, "results written");
    Ok(n)
}
