//! Terminal step over the fully merged state.

use crate::aggregate::AggregateState;
use crate::combiners::CombineFn;
use crate::topk::TopKSelector;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What the reducer emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputMode {
    /// Every key once, in first-seen order.
    FullAggregate,
    /// The `k` largest values, descending; ties by first-seen order.
    TopK(usize),
}

/// Emit every `(key, value)` of the merged state in first-seen order.
pub fn reduce_full<V, A, O, C>(state: AggregateState<A>, comb: &C) -> Vec<(String, O)>
where
    C: CombineFn<V, A, O> + ?Sized,
{
    state
        .finish(comb)
        .into_iter()
        .map(|a| (a.key, a.value))
        .collect()
}

/// Select the `k` largest finished values.
///
/// Returns exactly `min(k, state.len())` pairs, largest first.
pub fn reduce_top_k<V, A, O, C>(state: AggregateState<A>, comb: &C, k: usize) -> Vec<(String, O)>
where
    C: CombineFn<V, A, O> + ?Sized,
    O: Ord,
{
    let keys = state.len();
    let mut selector = TopKSelector::new(k);
    selector.extend(state.finish(comb));
    debug!(k, keys, kept = selector.len(), "top-k selection done");
    selector.into_ranked()
}

/// Run the reducer for `mode`.
pub fn reduce<V, A, O, C>(state: AggregateState<A>, comb: &C, mode: OutputMode) -> Vec<(String, O)>
where
    C: CombineFn<V, A, O> + ?Sized,
    O: Ord,
{
    match mode {
        OutputMode::FullAggregate => reduce_full(state, comb),
        OutputMode::TopK(k) => reduce_top_k(state, comb, k),
    }
}
