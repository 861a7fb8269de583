//! Execution engine: source → map + local combine per partition → merge barrier.
//!
//! The runner drains the source first, so a source failure aborts the run
//! before any aggregation or merge happens. Records are then cut into
//! contiguous partitions. Each partition is mapped and combined into its own
//! [`AggregateState`] with no shared mutable state, in parallel under rayon in
//! [`ExecMode::Parallel`]. The merge starts only once every partition has
//! returned, and a single owner folds the partial states together.

use crate::aggregate::AggregateState;
use crate::combiners::CombineFn;
use crate::error::{EngineError, EngineResult};
use crate::mapper::Mapper;
use crate::record::Record;
use crate::source::{Source, drain};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecMode {
    /// One partition on the calling thread.
    Sequential,
    /// Rayon workers over `partitions` contiguous chunks; `threads` sizes a
    /// dedicated pool, otherwise the global pool is used.
    Parallel {
        threads: Option<usize>,
        partitions: Option<usize>,
    },
}

/// Cooperative cancellation flag shared with the caller.
///
/// Partitions check it before they start; running partitions always finish.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counters for one run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub records_read: u64,
    pub records_skipped: u64,
    pub pairs_emitted: u64,
    pub partitions: u64,
    pub distinct_keys: u64,
    pub elapsed_ms: u64,
}

/// Merged state plus the counters that produced it.
#[derive(Debug)]
pub struct RunOutput<A> {
    pub state: AggregateState<A>,
    pub stats: RunStats,
}

struct PartitionOutput<A> {
    state: AggregateState<A>,
    records: u64,
    skipped: u64,
    pairs: u64,
}

pub struct Runner {
    pub mode: ExecMode,
    pub default_partitions: usize,
    pub cancel: Option<CancelToken>,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            mode: ExecMode::Parallel {
                threads: None,
                partitions: None,
            },
            default_partitions: 2 * num_cpus::get().max(2),
            cancel: None,
        }
    }
}

impl Runner {
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            mode: ExecMode::Sequential,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn parallel(threads: Option<usize>, partitions: Option<usize>) -> Self {
        Self {
            mode: ExecMode::Parallel {
                threads,
                partitions,
            },
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Number of partitions this runner would cut `len` records into.
    #[must_use]
    pub fn partition_count(&self, len: usize) -> usize {
        match self.mode {
            ExecMode::Sequential => 1,
            ExecMode::Parallel { partitions, .. } => partitions
                .unwrap_or(self.default_partitions)
                .max(1)
                .min(len.max(1)),
        }
    }

    /// Drain `source`, map and combine every record, and merge all partitions.
    ///
    /// # Errors
    /// - Any source error, before anything is merged.
    /// - [`EngineError::Cancelled`] if a partition was skipped because the
    ///   cancel token was set.
    /// - [`EngineError::ThreadPool`] if a dedicated pool cannot be built.
    pub fn run<S, M, V, A, O, C>(
        &self,
        source: &mut S,
        mapper: &M,
        comb: &C,
    ) -> EngineResult<RunOutput<A>>
    where
        S: Source + ?Sized,
        M: Mapper<V> + ?Sized,
        C: CombineFn<V, A, O> + ?Sized,
        A: Send,
    {
        let started = Instant::now();
        let records = drain(source)?;
        info!(source = source.name(), records = records.len(), "source drained");
        self.run_records(&records, mapper, comb, started)
    }

    /// Same as [`run`](Self::run) over records already in memory.
    ///
    /// # Errors
    /// See [`run`](Self::run); there is no source to fail here.
    pub fn run_vec<M, V, A, O, C>(
        &self,
        records: &[Record],
        mapper: &M,
        comb: &C,
    ) -> EngineResult<RunOutput<A>>
    where
        M: Mapper<V> + ?Sized,
        C: CombineFn<V, A, O> + ?Sized,
        A: Send,
    {
        self.run_records(records, mapper, comb, Instant::now())
    }

    fn run_records<M, V, A, O, C>(
        &self,
        records: &[Record],
        mapper: &M,
        comb: &C,
        started: Instant,
    ) -> EngineResult<RunOutput<A>>
    where
        M: Mapper<V> + ?Sized,
        C: CombineFn<V, A, O> + ?Sized,
        A: Send,
    {
        let ranges = split_ranges(records.len(), self.partition_count(records.len()));
        info!(partitions = ranges.len(), mode = ?self.mode, "partitions planned");

        let cancel = self.cancel.as_ref();
        let locals: Vec<Option<PartitionOutput<A>>> = match self.mode {
            ExecMode::Sequential => ranges
                .iter()
                .map(|&(idx, start, end)| {
                    aggregate_partition(idx, start, &records[start..end], mapper, comb, cancel)
                })
                .collect(),
            ExecMode::Parallel { threads, .. } => {
                let work = || -> Vec<Option<PartitionOutput<A>>> {
                    ranges
                        .par_iter()
                        .map(|&(idx, start, end)| {
                            aggregate_partition(idx, start, &records[start..end], mapper, comb, cancel)
                        })
                        .collect()
                };
                match threads {
                    Some(t) => rayon::ThreadPoolBuilder::new()
                        .num_threads(t.max(1))
                        .build()?
                        .install(work),
                    None => work(),
                }
            }
        };

        // Merge barrier: every partition has returned by now.
        let mut stats = RunStats {
            partitions: locals.len() as u64,
            ..Default::default()
        };
        let mut states = Vec::with_capacity(locals.len());
        for local in locals {
            let Some(local) = local else {
                warn!("partition skipped after cancellation; discarding partial results");
                return Err(EngineError::Cancelled);
            };
            stats.records_read += local.records;
            stats.records_skipped += local.skipped;
            stats.pairs_emitted += local.pairs;
            states.push(local.state);
        }
        let state = AggregateState::merge_all(comb, states);

        stats.distinct_keys = state.len() as u64;
        stats.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        if stats.records_skipped > 0 {
            warn!(
                skipped = stats.records_skipped,
                read = stats.records_read,
                "skipped malformed records"
            );
        }
        info!(
            keys = stats.distinct_keys,
            pairs = stats.pairs_emitted,
            elapsed_ms = stats.elapsed_ms,
            "merge complete"
        );
        Ok(RunOutput { state, stats })
    }
}

/// Map and combine one partition; `None` if it was cancelled before starting.
fn aggregate_partition<M, V, A, O, C>(
    index: usize,
    offset: usize,
    records: &[Record],
    mapper: &M,
    comb: &C,
    cancel: Option<&CancelToken>,
) -> Option<PartitionOutput<A>>
where
    M: Mapper<V> + ?Sized,
    C: CombineFn<V, A, O> + ?Sized,
{
    if cancel.is_some_and(CancelToken::is_cancelled) {
        debug!(partition = index, "cancelled before start");
        return None;
    }
    let mut out = PartitionOutput {
        state: AggregateState::new(),
        records: records.len() as u64,
        skipped: 0,
        pairs: 0,
    };
    for (i, rec) in records.iter().enumerate() {
        let at = (offset + i) as u64;
        match mapper.map(rec) {
            Ok(pairs) => {
                out.pairs += pairs.len() as u64;
                out.state.combine(comb, pairs, at);
            }
            Err(e) => {
                out.skipped += 1;
                debug!(record = at, error = %e, "skipping record");
            }
        }
    }
    debug!(
        partition = index,
        records = out.records,
        keys = out.state.len(),
        "partition aggregated"
    );
    Some(out)
}

/// Split `[0, len)` into `parts` contiguous ranges as `(chunk_idx, start, end)`.
///
/// Ensures `parts` in `[1, len]` (when `len > 0`) and distributes the remainder
/// over the first chunks. An empty input still yields one empty range so the
/// pipeline runs its normal path.
#[must_use]
pub fn split_ranges(len: usize, parts: usize) -> Vec<(usize, usize, usize)> {
    let parts = parts.max(1).min(len.max(1));
    let base = len / parts;
    let rem = len % parts;

    let mut out = Vec::with_capacity(parts);
    let mut start = 0usize;
    for idx in 0..parts {
        let extra = usize::from(idx < rem);
        let end = start + base + extra;
        out.push((idx, start, end));
        start = end;
    }
    out
}
