//! Basic arithmetic combiners: Sum, Count, Min, Max

use super::CombineFn;
use std::cmp::Ord;
use std::marker::PhantomData;
use std::mem::take;
use std::ops::Add;

/* ===================== Sum<T> ===================== */

/// Sum of contributions per key.
///
/// - Accumulator: `T`
/// - Output: `T`
///
/// Requires `T: Add<Output=T> + Default`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sum<T>(pub PhantomData<fn() -> T>);
impl<T> Sum<T> {
    /// Convenience constructor (same as `Default`).
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> CombineFn<T, T, T> for Sum<T>
where
    T: Add<Output = T> + Default + 'static,
{
    fn create(&self) -> T {
        T::default()
    }

    fn add_input(&self, acc: &mut T, v: T) {
        *acc = take(acc) + v;
    }

    fn merge(&self, acc: &mut T, other: T) {
        *acc = take(acc) + other;
    }

    fn finish(&self, acc: T) -> T {
        acc
    }
}

/* ===================== Count ===================== */

/// Number of contributions per key; contribution values are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct Count;

impl<V> CombineFn<V, u64, u64> for Count {
    fn create(&self) -> u64 {
        0
    }

    fn add_input(&self, acc: &mut u64, _v: V) {
        *acc += 1;
    }

    fn merge(&self, acc: &mut u64, other: u64) {
        *acc += other;
    }

    fn finish(&self, acc: u64) -> u64 {
        acc
    }
}

/* ===================== Max<T> ===================== */

/// Largest contribution per key (requires `Ord`).
///
/// - Accumulator: `Option<T>`
/// - Output: `T`; an accumulator that never saw a value finishes as `T::default()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Max<T>(pub PhantomData<fn() -> T>);
impl<T> Max<T> {
    /// Convenience constructor (same as `Default`).
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> CombineFn<T, Option<T>, T> for Max<T>
where
    T: Ord + Default + 'static,
{
    fn create(&self) -> Option<T> {
        None
    }

    fn add_input(&self, acc: &mut Option<T>, v: T) {
        match acc {
            Some(cur) => {
                if v > *cur {
                    *cur = v
                }
            }
            None => *acc = Some(v),
        }
    }

    fn merge(&self, acc: &mut Option<T>, other: Option<T>) {
        if let Some(b) = other {
            self.add_input(acc, b);
        }
    }

    fn finish(&self, acc: Option<T>) -> T {
        acc.unwrap_or_default()
    }
}

/* ===================== Min<T> ===================== */

/// Smallest contribution per key (requires `Ord`).
///
/// - Accumulator: `Option<T>`
/// - Output: `T`; an accumulator that never saw a value finishes as `T::default()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Min<T>(pub PhantomData<fn() -> T>);
impl<T> Min<T> {
    /// Convenience constructor (same as `Default`).
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> CombineFn<T, Option<T>, T> for Min<T>
where
    T: Ord + Default + 'static,
{
    fn create(&self) -> Option<T> {
        None
    }

    fn add_input(&self, acc: &mut Option<T>, v: T) {
        match acc {
            Some(cur) => {
                if v < *cur {
                    *cur = v
                }
            }
            None => *acc = Some(v),
        }
    }

    fn merge(&self, acc: &mut Option<T>, other: Option<T>) {
        if let Some(b) = other {
            self.add_input(acc, b);
        }
    }

    fn finish(&self, acc: Option<T>) -> T {
        acc.unwrap_or_default()
    }
}
