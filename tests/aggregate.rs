use anyhow::Result;
use irontally::aggregate::{AggregateState, FirstSeen};
use irontally::testing::{assert_maps_equal, assert_ranked_equal};
use irontally::*;

/// Each whitespace token contributes its own length.
fn token_lengths() -> FnMapper<u64, impl Fn(&Record) -> std::result::Result<Vec<(String, u64)>, MalformedRecord>> {
    FnMapper::new(|r: &Record| {
        Ok(r.text()
            .split_whitespace()
            .map(|w| (w.to_string(), w.len() as u64))
            .collect())
    })
}

fn corpus() -> Vec<Record> {
    [
        "the quick brown fox",
        "jumps over the lazy dog",
        "the dog barks",
        "",
        "quick quick fox",
        "lazy afternoon for the fox",
        "over and over",
    ]
    .into_iter()
    .map(Record::from)
    .collect()
}

#[test]
fn any_partitioning_gives_the_same_state() -> Result<()> {
    let records = corpus();
    let sum = Sum::<u64>::new();
    let baseline = Runner::sequential().run_vec(&records, &token_lengths(), &sum)?.state;

    for parts in 1..=records.len() + 2 {
        let run = Runner::parallel(None, Some(parts)).run_vec(&records, &token_lengths(), &sum)?;
        assert_eq!(run.state, baseline, "partitions = {parts}");
    }
    Ok(())
}

#[test]
fn shuffled_input_gives_the_same_values() -> Result<()> {
    let records = corpus();
    let mut shuffled = records.clone();
    shuffled.reverse();
    shuffled.rotate_left(3);

    let sum = Sum::<u64>::new();
    let runner = Runner::parallel(Some(2), Some(3));
    let a = runner.run_vec(&records, &token_lengths(), &sum)?.state.into_map(&sum);
    let b = runner.run_vec(&shuffled, &token_lengths(), &sum)?.state.into_map(&sum);

    assert_maps_equal(&a, &b);
    Ok(())
}

#[test]
fn sum_of_results_equals_sum_of_contributions() -> Result<()> {
    let records = corpus();
    let mapper = token_lengths();
    let emitted: u64 = records
        .iter()
        .flat_map(|r| mapper.map(r).unwrap_or_default())
        .map(|(_, v)| v)
        .sum();

    let sum = Sum::<u64>::new();
    let run = Runner::parallel(None, Some(4)).run_vec(&records, &mapper, &sum)?;
    let total: u64 = reducer::reduce_full(run.state, &sum)
        .into_iter()
        .map(|(_, v)| v)
        .sum();

    assert_eq!(total, emitted);
    Ok(())
}

#[test]
fn merging_with_empty_state_is_identity() {
    let sum = Sum::<u64>::new();
    let mut state = AggregateState::new();
    state.combine(&sum, vec![("a".to_string(), 2), ("b".to_string(), 5)], 7);
    let original = state.clone();

    state.merge(&sum, AggregateState::new());
    assert_eq!(state, original);

    let mut empty = AggregateState::new();
    empty.merge(&sum, original.clone());
    assert_eq!(empty, original);
}

#[test]
fn merge_keeps_earliest_first_seen() {
    let sum = Sum::<u64>::new();
    let mut late = AggregateState::new();
    late.combine(&sum, vec![("k".to_string(), 1)], 9);
    let mut early = AggregateState::new();
    early.combine(&sum, vec![("x".to_string(), 1), ("k".to_string(), 1)], 2);

    late.merge(&sum, early);

    assert_eq!(late.get("k"), Some(&2));
    assert_eq!(late.first_seen("k"), Some(FirstSeen::new(2, 1)));
    assert_eq!(late.first_seen("x"), Some(FirstSeen::new(2, 0)));
}

#[test]
fn finish_orders_by_first_seen() {
    let sum = Sum::<u64>::new();
    let mut state = AggregateState::new();
    state.combine(&sum, vec![("b".to_string(), 1), ("a".to_string(), 1)], 0);
    state.combine(&sum, vec![("c".to_string(), 1), ("a".to_string(), 1)], 1);

    let keys: Vec<String> = state.finish(&sum).into_iter().map(|a| a.key).collect();
    assert_eq!(keys, vec!["b", "a", "c"]);
}

#[test]
fn merge_all_matches_pairwise_merges() {
    let sum = Sum::<u64>::new();
    let states: Vec<AggregateState<u64>> = (0..4u64)
        .map(|i| {
            let mut s = AggregateState::new();
            s.combine(&sum, vec![(format!("k{}", i % 2), i), ("all".to_string(), 1)], i);
            s
        })
        .collect();

    let merged = AggregateState::merge_all(&sum, states.clone());

    let mut right_to_left = AggregateState::new();
    for s in states.into_iter().rev() {
        right_to_left.merge(&sum, s);
    }
    assert_eq!(merged, right_to_left);
    assert_eq!(merged.get("all"), Some(&4));
    assert_eq!(merged.get("k1"), Some(&4));
}

#[test]
fn shuffled_input_gives_the_same_ranking_when_values_differ() -> Result<()> {
    let words = FnMapper::new(|r: &Record| {
        Ok(r.text()
            .split_whitespace()
            .map(|w| (w.to_string(), 1u64))
            .collect())
    });
    // Totals: amber 5, birch 4, cedar 3, dune 2, elm 1.
    let records: Vec<Record> = [
        "elm dune cedar",
        "birch amber",
        "amber birch cedar",
        "dune amber",
        "amber birch",
        "cedar amber birch",
    ]
    .into_iter()
    .map(Record::from)
    .collect();
    let mut shuffled = records.clone();
    shuffled.reverse();
    shuffled.swap(0, 3);

    let sum = Sum::<u64>::new();
    for runner in [Runner::sequential(), Runner::parallel(Some(2), Some(4))] {
        let a = reducer::reduce_top_k(runner.run_vec(&records, &words, &sum)?.state, &sum, 3);
        let b = reducer::reduce_top_k(runner.run_vec(&shuffled, &words, &sum)?.state, &sum, 3);

        assert_eq!(a, b);
        assert_ranked_equal(&a, &[("amber", 5), ("birch", 4), ("cedar", 3)]);
    }
    Ok(())
}
