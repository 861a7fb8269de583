//! Top-K selection over finished aggregates.
//!
//! Entries rank by value, largest first; equal values rank by
//! [`FirstSeen`](crate::aggregate::FirstSeen),
//! earliest first. Positions are unique per key, so this is a total order and
//! the selection is deterministic.
//!
//! [`TopKSelector`] keeps a **min-heap** (via `BinaryHeap<Reverse<_>>`) of at
//! most `k` entries, so memory is bounded by `k` no matter how many keys are
//! offered. [`rank_by_sort`] does the same job with a full sort and exists as
//! the reference the heap must agree with.

use crate::aggregate::Aggregated;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Heap entry; `Greater` means "ranks higher".
#[derive(Debug)]
struct Candidate<O>(Aggregated<O>);

impl<O: Ord> Ord for Candidate<O> {
    fn cmp(&self, other: &Self) -> Ordering {
        rank(&self.0, &other.0)
    }
}

impl<O: Ord> PartialOrd for Candidate<O> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<O: Ord> PartialEq for Candidate<O> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<O: Ord> Eq for Candidate<O> {}

fn rank<O: Ord>(a: &Aggregated<O>, b: &Aggregated<O>) -> Ordering {
    a.value
        .cmp(&b.value)
        .then_with(|| b.first_seen.cmp(&a.first_seen))
}

/// Bounded selector of the `k` highest-ranked entries.
///
/// - `k == 0` keeps nothing.
/// - Offering fewer than `k` entries keeps all of them.
///
/// ```
/// use irontally::aggregate::{Aggregated, FirstSeen};
/// use irontally::topk::TopKSelector;
///
/// let mut top = TopKSelector::new(1);
/// top.offer(Aggregated { key: "a".into(), value: 3u64, first_seen: FirstSeen::new(0, 0) });
/// top.offer(Aggregated { key: "b".into(), value: 5u64, first_seen: FirstSeen::new(1, 0) });
/// assert_eq!(top.into_ranked(), vec![("b".to_string(), 5)]);
/// ```
#[derive(Debug)]
pub struct TopKSelector<O> {
    k: usize,
    heap: BinaryHeap<Reverse<Candidate<O>>>,
}

impl<O: Ord> TopKSelector<O> {
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k.saturating_add(1).min(1024)),
        }
    }

    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Offer one entry; the lowest-ranked entry is dropped once more than `k` are held.
    pub fn offer(&mut self, entry: Aggregated<O>) {
        if self.k == 0 {
            return;
        }
        if self.heap.len() == self.k {
            // Full: only a strictly better entry can get in.
            if let Some(Reverse(worst)) = self.heap.peek()
                && rank(&entry, &worst.0) != Ordering::Greater
            {
                return;
            }
            self.heap.pop();
        }
        self.heap.push(Reverse(Candidate(entry)));
    }

    /// Held entries, highest rank first.
    #[must_use]
    pub fn into_sorted(self) -> Vec<Aggregated<O>> {
        // Ascending under Reverse, so best first.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(Candidate(a))| a)
            .collect()
    }

    /// Held entries as `(key, value)`, highest rank first.
    #[must_use]
    pub fn into_ranked(self) -> Vec<(String, O)> {
        self.into_sorted()
            .into_iter()
            .map(|a| (a.key, a.value))
            .collect()
    }
}

impl<O: Ord> Extend<Aggregated<O>> for TopKSelector<O> {
    fn extend<I: IntoIterator<Item = Aggregated<O>>>(&mut self, iter: I) {
        for entry in iter {
            self.offer(entry);
        }
    }
}

/// Select the top `k` by sorting everything and truncating.
#[must_use]
pub fn rank_by_sort<O: Ord>(mut entries: Vec<Aggregated<O>>, k: usize) -> Vec<Aggregated<O>> {
    entries.sort_by(|a, b| rank(b, a));
    entries.truncate(k);
    entries
}

/// Compare two entries by rank; `Greater` means `a` ranks above `b`.
#[must_use]
pub fn compare_rank<O: Ord>(a: &Aggregated<O>, b: &Aggregated<O>) -> Ordering {
    rank(a, b)
}
