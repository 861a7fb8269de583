//! Assertions for aggregation outputs.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::BuildHasher;

/// Assert two result sequences are equal in order and content.
///
/// Use it for rankings, where order is part of the answer.
///
/// # Panics
///
/// Panics if the sequences differ in length or at any position.
///
/// # Example
///
/// ```
/// use irontally::testing::assert_ranked_equal;
///
/// let ranked = vec![("w1".to_string(), 2u64), ("w2".to_string(), 2)];
/// assert_ranked_equal(&ranked, &[("w1", 2), ("w2", 2)]);
/// ```
pub fn assert_ranked_equal<V: Debug + PartialEq>(actual: &[(String, V)], expected: &[(&str, V)]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Ranking length mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
    for (i, ((ak, av), (ek, ev))) in actual.iter().zip(expected).enumerate() {
        assert!(
            ak == ek && av == ev,
            "Ranking mismatch at position {i}:\n  Expected: ({ek:?}, {ev:?})\n  Actual: ({ak:?}, {av:?})\n  Full expected: {expected:?}\n  Full actual: {actual:?}"
        );
    }
}

/// Assert two collections of key-value pairs are equal after sorting by key.
///
/// # Panics
///
/// Panics if the collections differ after sorting by key.
///
/// # Example
///
/// ```
/// use irontally::testing::assert_kv_unordered_equal;
///
/// let actual = vec![("b", 2), ("a", 1)];
/// let expected = vec![("a", 1), ("b", 2)];
/// assert_kv_unordered_equal(actual, expected);
/// ```
pub fn assert_kv_unordered_equal<K, V>(mut actual: Vec<(K, V)>, mut expected: Vec<(K, V)>)
where
    K: Debug + Ord,
    V: Debug + PartialEq,
{
    actual.sort_by(|a, b| a.0.cmp(&b.0));
    expected.sort_by(|a, b| a.0.cmp(&b.0));

    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
    for (i, ((ak, av), (ek, ev))) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            ak == ek && av == ev,
            "Collection mismatch at index {i} after sorting:\n  Expected: ({ek:?}, {ev:?})\n  Actual: ({ak:?}, {av:?})"
        );
    }
}

/// Assert a ranking is sorted by value, largest first.
///
/// # Panics
///
/// Panics at the first pair that increases.
pub fn assert_descending<V: Debug + PartialOrd>(ranked: &[(String, V)]) {
    for (i, w) in ranked.windows(2).enumerate() {
        assert!(
            w[0].1 >= w[1].1,
            "Ranking not descending at position {}:\n  {:?} then {:?}",
            i + 1,
            w[0],
            w[1]
        );
    }
}

/// Assert two maps hold the same entries.
///
/// # Panics
///
/// Panics if the maps differ in size, keys, or values.
pub fn assert_maps_equal<V, S1: BuildHasher, S2: BuildHasher>(
    actual: &HashMap<String, V, S1>,
    expected: &HashMap<String, V, S2>,
) where
    V: Debug + PartialEq,
{
    assert_eq!(
        actual.len(),
        expected.len(),
        "Map size mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
    for (k, ev) in expected {
        match actual.get(k) {
            Some(av) => assert_eq!(av, ev, "Value mismatch for key {k:?}"),
            None => panic!("Missing key {k:?}\n  Actual: {actual:?}"),
        }
    }
}
