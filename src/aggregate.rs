//! Per-key aggregate state: the local combine and the global merge.
//!
//! An [`AggregateState`] maps each key to a combiner accumulator plus the
//! [`FirstSeen`] position of the contribution that created it. Partitions
//! build their own state; the runner then merges all of them into one. Both
//! steps go through the same [`CombineFn`], and positions merge by taking the
//! minimum, so the result does not depend on how the input was split.
//!
//! ```
//! use irontally::aggregate::AggregateState;
//! use irontally::combiners::Sum;
//!
//! let sum = Sum::<u64>::new();
//! let mut left = AggregateState::new();
//! left.combine(&sum, vec![("w1".to_string(), 1), ("w2".to_string(), 1)], 0);
//! let mut right = AggregateState::new();
//! right.combine(&sum, vec![("w1".to_string(), 1)], 1);
//!
//! let merged = AggregateState::merge_all(&sum, vec![left, right]);
//! assert_eq!(merged.get("w1"), Some(&2));
//! ```

use crate::combiners::CombineFn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Position of a contribution in the input: record index, then pair index
/// within that record's mapper output.
///
/// Orders lexicographically, so the smallest position is the first seen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FirstSeen {
    pub record: u64,
    pub pair: u32,
}

impl FirstSeen {
    #[must_use]
    pub const fn new(record: u64, pair: u32) -> Self {
        Self { record, pair }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Slot<A> {
    acc: A,
    first_seen: FirstSeen,
}

/// One finished `(key, value)` with its first-seen position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aggregated<O> {
    pub key: String,
    pub value: O,
    pub first_seen: FirstSeen,
}

/// Mapping from key to accumulated value.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateState<A> {
    slots: HashMap<String, Slot<A>>,
}

impl<A> Default for AggregateState<A> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }
}

impl<A> AggregateState<A> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current accumulator for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&A> {
        self.slots.get(key).map(|s| &s.acc)
    }

    #[must_use]
    pub fn first_seen(&self, key: &str) -> Option<FirstSeen> {
        self.slots.get(key).map(|s| s.first_seen)
    }

    /// Iterate `(key, accumulator, first_seen)` in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &A, FirstSeen)> {
        self.slots
            .iter()
            .map(|(k, s)| (k.as_str(), &s.acc, s.first_seen))
    }

    /// Fold one contribution into the state.
    ///
    /// An absent key starts from `comb.create()`. The key keeps the smaller of
    /// its current and the given position.
    pub fn add<V, O, C>(&mut self, comb: &C, key: String, v: V, at: FirstSeen)
    where
        C: CombineFn<V, A, O> + ?Sized,
    {
        match self.slots.entry(key) {
            Entry::Occupied(mut e) => {
                let slot = e.get_mut();
                comb.add_input(&mut slot.acc, v);
                slot.first_seen = slot.first_seen.min(at);
            }
            Entry::Vacant(e) => {
                let mut acc = comb.create();
                comb.add_input(&mut acc, v);
                e.insert(Slot { acc, first_seen: at });
            }
        }
    }

    /// Fold every pair one record produced; `record` is the record's global index.
    pub fn combine<V, O, C, I>(&mut self, comb: &C, pairs: I, record: u64)
    where
        C: CombineFn<V, A, O> + ?Sized,
        I: IntoIterator<Item = (String, V)>,
    {
        for (i, (k, v)) in pairs.into_iter().enumerate() {
            let pair = u32::try_from(i).unwrap_or(u32::MAX);
            self.add(comb, k, v, FirstSeen::new(record, pair));
        }
    }

    /// Merge another partition's state into this one.
    ///
    /// Keys missing on either side are taken as they are; merging with an
    /// empty state leaves `self` unchanged.
    pub fn merge<V, O, C>(&mut self, comb: &C, other: Self)
    where
        C: CombineFn<V, A, O> + ?Sized,
    {
        if self.slots.is_empty() {
            self.slots = other.slots;
            return;
        }
        for (k, theirs) in other.slots {
            match self.slots.entry(k) {
                Entry::Occupied(mut e) => {
                    let mine = e.get_mut();
                    comb.merge(&mut mine.acc, theirs.acc);
                    mine.first_seen = mine.first_seen.min(theirs.first_seen);
                }
                Entry::Vacant(e) => {
                    e.insert(theirs);
                }
            }
        }
    }

    /// Merge any number of states into one, left to right.
    pub fn merge_all<V, O, C, I>(comb: &C, states: I) -> Self
    where
        C: CombineFn<V, A, O> + ?Sized,
        I: IntoIterator<Item = Self>,
    {
        let mut it = states.into_iter();
        let mut acc = it.next().unwrap_or_default();
        for s in it {
            acc.merge(comb, s);
        }
        acc
    }

    /// Finish every accumulator, ordered by first-seen position.
    pub fn finish<V, O, C>(self, comb: &C) -> Vec<Aggregated<O>>
    where
        C: CombineFn<V, A, O> + ?Sized,
    {
        let mut slots: Vec<(String, Slot<A>)> = self.slots.into_iter().collect();
        slots.sort_by_key(|(_, s)| s.first_seen);
        slots
            .into_iter()
            .map(|(key, s)| Aggregated {
                key,
                value: comb.finish(s.acc),
                first_seen: s.first_seen,
            })
            .collect()
    }

    /// Finish into a plain key → value map.
    pub fn into_map<V, O, C>(self, comb: &C) -> HashMap<String, O>
    where
        C: CombineFn<V, A, O> + ?Sized,
    {
        self.finish(comb)
            .into_iter()
            .map(|a| (a.key, a.value))
            .collect()
    }
}
