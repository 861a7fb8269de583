//! Mapping records to keyed contributions.

use crate::record::Record;
use std::marker::PhantomData;
use thiserror::Error;

/// A record the mapper could not interpret.
///
/// This never aborts a run: the aggregator skips the record, counts it, and
/// moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed record: {reason}")]
pub struct MalformedRecord {
    pub reason: String,
}

impl MalformedRecord {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Pure function from one record to zero or more `(key, contribution)` pairs.
///
/// Implementations must not have side effects; the runner calls them from
/// several worker threads at once.
pub trait Mapper<V>: Send + Sync {
    /// Map one record.
    ///
    /// # Errors
    /// Returns [`MalformedRecord`] when the record cannot be interpreted. An
    /// empty `Vec` is the right answer for a well-formed record with nothing
    /// to contribute (a header, a blank row).
    fn map(&self, record: &Record) -> Result<Vec<(String, V)>, MalformedRecord>;
}

/// A [`Mapper`] backed by a closure.
///
/// ```
/// use irontally::mapper::{FnMapper, Mapper};
/// use irontally::record::Record;
///
/// let words = FnMapper::new(|r: &Record| {
///     Ok(r.text().split_whitespace().map(|w| (w.to_string(), 1u64)).collect())
/// });
/// let pairs = words.map(&Record::from("a b a")).unwrap();
/// assert_eq!(pairs.len(), 3);
/// ```
pub struct FnMapper<V, F> {
    f: F,
    _v: PhantomData<fn() -> V>,
}

impl<V, F> FnMapper<V, F>
where
    F: Fn(&Record) -> Result<Vec<(String, V)>, MalformedRecord> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f, _v: PhantomData }
    }
}

impl<V, F> Mapper<V> for FnMapper<V, F>
where
    F: Fn(&Record) -> Result<Vec<(String, V)>, MalformedRecord> + Send + Sync,
{
    fn map(&self, record: &Record) -> Result<Vec<(String, V)>, MalformedRecord> {
        (self.f)(record)
    }
}

impl<V, M: Mapper<V> + ?Sized> Mapper<V> for Box<M> {
    fn map(&self, record: &Record) -> Result<Vec<(String, V)>, MalformedRecord> {
        (**self).map(record)
    }
}
