use anyhow::Result;
use irontally::runner::split_ranges;
use irontally::testing::*;
use irontally::*;

fn hashtag_records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| Record::from(format!("post {i} #t{} #all", i % 7)))
        .collect()
}

#[test]
fn split_ranges_covers_input_contiguously() {
    assert_eq!(split_ranges(10, 3), vec![(0, 0, 4), (1, 4, 7), (2, 7, 10)]);
    assert_eq!(split_ranges(2, 8), vec![(0, 0, 1), (1, 1, 2)]);
    assert_eq!(split_ranges(0, 4), vec![(0, 0, 0)]);
    assert_eq!(split_ranges(5, 0), vec![(0, 0, 5)]);
}

#[test]
fn partition_count_is_clamped() {
    let r = Runner::parallel(None, Some(16));
    assert_eq!(r.partition_count(4), 4);
    assert_eq!(r.partition_count(0), 1);
    assert_eq!(Runner::sequential().partition_count(1_000), 1);
}

#[test]
fn sequential_and_parallel_agree() -> Result<()> {
    let records = hashtag_records(500);
    let mapper = TokenCounter::hashtags();
    let sum = Sum::<u64>::new();

    let seq = Runner::sequential().run_vec(&records, &mapper, &sum)?;
    let par = Runner::parallel(Some(4), Some(9)).run_vec(&records, &mapper, &sum)?;

    assert_eq!(seq.state, par.state);
    assert_eq!(seq.stats.records_read, 500);
    assert_eq!(par.stats.records_read, 500);
    assert_eq!(seq.stats.partitions, 1);
    assert_eq!(par.stats.partitions, 9);
    assert_eq!(par.stats.pairs_emitted, 1_000);
    assert_eq!(par.state.get("hashtags"), Some(&1_000));
    Ok(())
}

#[test]
fn word_frequencies_through_a_closure_mapper() -> Result<()> {
    let words = FnMapper::new(|r: &Record| {
        Ok(r.text()
            .split_whitespace()
            .map(|w| (w.to_lowercase(), 1u64))
            .collect())
    });
    let mut source = VecSource::new(["The cat", "the dog", "THE end"]);
    let sum = Sum::<u64>::new();

    let run = Runner::default().run(&mut source, &words, &sum)?;
    let top = reducer::reduce_top_k(run.state, &sum, 1);

    assert_ranked_equal(&top, &[("the", 3)]);
    Ok(())
}

#[test]
fn cancelled_token_aborts_before_merge() {
    let token = CancelToken::new();
    token.cancel();
    let runner = Runner::parallel(None, Some(4)).with_cancel(token);

    let res = runner.run_vec(&hashtag_records(20), &TokenCounter::hashtags(), &Sum::<u64>::new());

    assert!(matches!(res, Err(EngineError::Cancelled)));
}

#[test]
fn untouched_token_does_not_cancel() -> Result<()> {
    let runner = Runner::sequential().with_cancel(CancelToken::new());
    let run = runner.run_vec(&hashtag_records(3), &TokenCounter::hashtags(), &Sum::<u64>::new())?;
    assert_eq!(run.stats.records_read, 3);
    Ok(())
}

#[test]
fn run_job_forwards_cancellation() -> Result<()> {
    let job = JobConfig::hashtag_count().validate()?;
    let token = CancelToken::new();
    token.cancel();

    let res = run_job(&job, &mut VecSource::new(sample_tweets()), Some(token));

    assert!(matches!(res, Err(EngineError::Cancelled)));
    Ok(())
}

#[test]
fn source_failure_aborts_the_run() {
    struct Broken(u32);

    impl Source for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn next_record(&mut self) -> EngineResult<Option<Record>> {
            self.0 += 1;
            if self.0 > 2 {
                return Err(EngineError::SourceRead {
                    source_name: "broken".into(),
                    record: u64::from(self.0),
                    source: anyhow::anyhow!("disk went away"),
                });
            }
            Ok(Some(Record::from("#ok")))
        }
    }

    let res = Runner::default().run(&mut Broken(0), &TokenCounter::hashtags(), &Sum::<u64>::new());

    match res {
        Err(EngineError::SourceRead { record, .. }) => assert_eq!(record, 3),
        other => panic!("expected SourceRead, got {other:?}"),
    }
}

#[test]
fn dedicated_pool_of_one_thread_still_partitions() -> Result<()> {
    let records = hashtag_records(50);
    let run = Runner::parallel(Some(1), Some(5)).run_vec(
        &records,
        &TokenCounter::hashtags(),
        &Count,
    )?;
    assert_eq!(run.stats.partitions, 5);
    assert_eq!(run.state.get("tweets"), Some(&50));
    Ok(())
}

#[test]
fn token_set_while_the_only_partition_runs_does_not_fail() -> Result<()> {
    let token = CancelToken::new();
    let mid_run = token.clone();
    let mapper = FnMapper::new(move |r: &Record| {
        mid_run.cancel();
        TokenCounter::hashtags().map(r)
    });

    for runner in [Runner::sequential(), Runner::parallel(None, Some(1))] {
        let run = runner
            .with_cancel(token.clone())
            .run_vec(&hashtag_records(10), &mapper, &Sum::<u64>::new())?;

        assert!(token.is_cancelled());
        assert_eq!(run.stats.records_read, 10);
        assert_eq!(run.stats.partitions, 1);
        assert_eq!(run.state.get("tweets"), Some(&10));
        assert_eq!(run.state.get("hashtags"), Some(&20));
    }
    Ok(())
}
