//! Merge operations for per-key aggregation.
//!
//! A [`CombineFn`] describes how contributions fold into an accumulator and how
//! two accumulators merge. The local aggregator and the global merger share the
//! same `CombineFn`, which is only sound because every implementation here is
//! associative and commutative: grouping contributions into partitions, or
//! reordering them, never changes the finished value.
//!
//! - [`Sum<T>`] -- sum of contributions.
//! - [`Count`] -- number of contributions, values ignored.
//! - [`Max<T>`] / [`Min<T>`] -- largest / smallest contribution.
//!
//! # Examples
//! ```
//! use irontally::combiners::{CombineFn, Sum};
//!
//! let sum = Sum::<u64>::new();
//! let mut left = sum.create();
//! sum.add_input(&mut left, 2);
//! let mut right = sum.create();
//! sum.add_input(&mut right, 3);
//! sum.merge(&mut left, right);
//! assert_eq!(sum.finish(left), 5);
//! ```

mod basic;

pub use basic::{Count, Max, Min, Sum};

/// Associative, commutative combination of values `V` through accumulator `A`
/// into output `O`.
pub trait CombineFn<V, A, O>: Send + Sync + 'static {
    /// A fresh accumulator (the identity of `merge`).
    fn create(&self) -> A;
    /// Fold one contribution into `acc`.
    fn add_input(&self, acc: &mut A, v: V);
    /// Fold another accumulator into `acc`.
    fn merge(&self, acc: &mut A, other: A);
    /// Turn the accumulator into the output value.
    fn finish(&self, acc: A) -> O;
}
