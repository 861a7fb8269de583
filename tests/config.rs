use anyhow::Result;
use irontally::config::{
    Encoding, ExecConfig, ExtractorKind, InputFormat, JobOverrides, KeyExtractor, MergeOp, Mode,
};
use irontally::testing::TempFilePath;
use irontally::*;

fn assert_invalid(cfg: &JobConfig, needle: &str) {
    match cfg.validate() {
        Err(EngineError::InvalidConfiguration { message }) => assert!(
            message.contains(needle),
            "message {message:?} should mention {needle:?}"
        ),
        Err(other) => panic!("expected InvalidConfiguration, got {other:?}"),
        Ok(_) => panic!("expected {needle:?} to be rejected"),
    }
}

#[test]
fn defaults_are_the_hashtag_job() -> Result<()> {
    let cfg = JobConfig::from_json_str("{}")?;
    assert_eq!(cfg, JobConfig::hashtag_count());
    assert_eq!(cfg.mode, Mode::FullAggregate);
    assert_eq!(cfg.merge_op, MergeOp::Sum);

    let job = cfg.validate()?;
    assert_eq!(job.output, OutputMode::FullAggregate);
    assert!(matches!(job.mapper, BuiltinMapper::Tokens(_)));
    Ok(())
}

#[test]
fn parses_a_full_document() -> Result<()> {
    let cfg = JobConfig::from_json_str(
        r#"{
            "mode": "top-k",
            "k": 10,
            "merge_op": "count",
            "key_extractor": { "kind": "field-join", "fields": [1, 2], "separator": "," },
            "input": { "format": "csv", "has_headers": true, "encoding": "latin1" },
            "exec": { "partitions": 4, "threads": 2 }
        }"#,
    )?;

    assert_eq!(cfg.k, Some(10));
    assert_eq!(cfg.merge_op, MergeOp::Count);
    assert_eq!(
        cfg.key_extractor,
        KeyExtractor::FieldJoin {
            fields: vec![1, 2],
            separator: ",".into()
        }
    );
    assert_eq!(cfg.input.format, InputFormat::Csv);
    assert_eq!(cfg.input.encoding, Encoding::Latin1);

    let job = cfg.validate()?;
    assert_eq!(job.output, OutputMode::TopK(10));
    assert_eq!(
        job.exec,
        ExecMode::Parallel {
            threads: Some(2),
            partitions: Some(4)
        }
    );
    Ok(())
}

#[test]
fn unknown_fields_are_rejected() {
    let err = JobConfig::from_json_str(r#"{ "mode": "top-k", "kk": 3 }"#).unwrap_err();
    assert!(matches!(err, EngineError::InvalidConfiguration { .. }));
}

#[test]
fn top_k_needs_a_positive_k() {
    let mut cfg = JobConfig::top_visitors(3);
    cfg.k = None;
    assert_invalid(&cfg, "requires k");

    cfg.k = Some(0);
    assert_invalid(&cfg, "positive");
}

#[test]
fn k_without_top_k_mode_is_rejected() {
    let cfg = JobConfig {
        k: Some(5),
        ..JobConfig::hashtag_count()
    };
    assert_invalid(&cfg, "only valid with mode top-k");
}

#[test]
fn extractor_options_are_checked() {
    let both = JobConfig {
        key_extractor: KeyExtractor::Tokens {
            record_key: "tweets".into(),
            token_key: "hashtags".into(),
            prefix: Some("@".into()),
            pattern: Some("^@".into()),
        },
        ..JobConfig::default()
    };
    assert_invalid(&both, "not both");

    let bad_regex = JobConfig {
        key_extractor: KeyExtractor::Tokens {
            record_key: "tweets".into(),
            token_key: "mentions".into(),
            prefix: None,
            pattern: Some("(".into()),
        },
        ..JobConfig::default()
    };
    assert_invalid(&bad_regex, "invalid token pattern");

    let same_keys = JobConfig {
        key_extractor: KeyExtractor::Tokens {
            record_key: "n".into(),
            token_key: "n".into(),
            prefix: None,
            pattern: None,
        },
        ..JobConfig::default()
    };
    assert_invalid(&same_keys, "both `n`");

    let no_fields = JobConfig {
        key_extractor: KeyExtractor::FieldJoin {
            fields: vec![],
            separator: " ".into(),
        },
        ..JobConfig::default()
    };
    assert_invalid(&no_fields, "at least one field");
}

#[test]
fn zero_partitions_or_threads_are_rejected() {
    let cfg = JobConfig {
        exec: ExecConfig {
            partitions: Some(0),
            ..ExecConfig::default()
        },
        ..JobConfig::default()
    };
    assert_invalid(&cfg, "partitions");

    let cfg = JobConfig {
        exec: ExecConfig {
            threads: Some(0),
            ..ExecConfig::default()
        },
        ..JobConfig::default()
    };
    assert_invalid(&cfg, "threads");
}

#[test]
fn sequential_flag_selects_sequential_mode() -> Result<()> {
    let cfg = JobConfig {
        exec: ExecConfig {
            sequential: true,
            ..ExecConfig::default()
        },
        ..JobConfig::default()
    };
    assert_eq!(cfg.validate()?.exec, ExecMode::Sequential);
    Ok(())
}

#[test]
fn pattern_extractor_counts_matching_tokens() -> Result<()> {
    let cfg = JobConfig::from_json_str(
        r#"{ "key_extractor": { "kind": "tokens", "token_key": "mentions", "pattern": "^@\\w+" } }"#,
    )?;
    let job = cfg.validate()?;
    let out = run_job(&job, &mut VecSource::new(["hi @bob and @amy", "@ alone"]), None)?;
    assert_eq!(
        out.results,
        vec![("tweets".to_string(), 2), ("mentions".to_string(), 2)]
    );
    Ok(())
}

#[test]
fn loads_from_file_and_reports_missing_file() -> Result<()> {
    let file = TempFilePath::with_extension("json")?;
    std::fs::write(file.path(), serde_json::to_string(&JobConfig::top_visitors(7))?)?;
    assert_eq!(JobConfig::from_json_file(file.path())?, JobConfig::top_visitors(7));

    let missing = JobConfig::from_json_file(file.path().with_extension("nope"));
    assert!(matches!(missing, Err(EngineError::InvalidConfiguration { .. })));
    Ok(())
}

#[test]
fn full_aggregate_override_drops_the_preset_k() -> Result<()> {
    let mut cfg = JobConfig::top_visitors(10);
    cfg.apply(&JobOverrides {
        mode: Some(Mode::FullAggregate),
        ..Default::default()
    })?;

    assert_eq!(cfg.mode, Mode::FullAggregate);
    assert_eq!(cfg.k, None);
    assert_eq!(cfg.validate()?.output, OutputMode::FullAggregate);
    assert_eq!(cfg.input.format, InputFormat::Csv);
    Ok(())
}

#[test]
fn k_override_implies_top_k_and_replaces_the_preset_k() -> Result<()> {
    let mut hashtags = JobConfig::hashtag_count();
    hashtags.apply(&JobOverrides {
        k: Some(1),
        ..Default::default()
    })?;
    assert_eq!(hashtags.validate()?.output, OutputMode::TopK(1));

    let mut visitors = JobConfig::top_visitors(10);
    visitors.apply(&JobOverrides {
        mode: Some(Mode::TopK),
        k: Some(3),
        ..Default::default()
    })?;
    assert_eq!(visitors.validate()?.output, OutputMode::TopK(3));
    Ok(())
}

#[test]
fn top_k_mode_override_keeps_the_loaded_k() -> Result<()> {
    let mut cfg = JobConfig::top_visitors(7);
    cfg.apply(&JobOverrides {
        mode: Some(Mode::TopK),
        ..Default::default()
    })?;
    assert_eq!(cfg.k, Some(7));
    Ok(())
}

#[test]
fn explicit_k_with_full_aggregate_is_still_rejected() -> Result<()> {
    let mut cfg = JobConfig::hashtag_count();
    cfg.apply(&JobOverrides {
        mode: Some(Mode::FullAggregate),
        k: Some(5),
        ..Default::default()
    })?;
    assert_invalid(&cfg, "only valid with mode top-k");
    Ok(())
}

#[test]
fn header_override_works_both_ways() -> Result<()> {
    let mut visitors = JobConfig::top_visitors(10);
    visitors.apply(&JobOverrides {
        has_headers: Some(false),
        ..Default::default()
    })?;
    assert!(!visitors.input.has_headers);

    let mut csv = JobConfig::hashtag_count();
    csv.apply(&JobOverrides {
        format: Some(InputFormat::Csv),
        has_headers: Some(true),
        encoding: Some(Encoding::Latin1),
        ..Default::default()
    })?;
    assert_eq!(csv.input.format, InputFormat::Csv);
    assert!(csv.input.has_headers);
    assert_eq!(csv.input.encoding, Encoding::Latin1);

    let mut untouched = JobConfig::top_visitors(10);
    untouched.apply(&JobOverrides::default())?;
    assert_eq!(untouched, JobConfig::top_visitors(10));
    Ok(())
}

#[test]
fn extractor_overrides_switch_kind_and_reject_foreign_options() -> Result<()> {
    let mut cfg = JobConfig::hashtag_count();
    cfg.apply(&JobOverrides {
        extractor: Some(ExtractorKind::FieldJoin),
        fields: Some(vec![0, 2]),
        separator: Some(",".into()),
        ..Default::default()
    })?;
    assert_eq!(
        cfg.key_extractor,
        KeyExtractor::FieldJoin {
            fields: vec![0, 2],
            separator: ",".into(),
        }
    );

    let mut tokens = JobConfig::hashtag_count();
    tokens.apply(&JobOverrides {
        token_key: Some("mentions".into()),
        prefix: Some("@".into()),
        ..Default::default()
    })?;
    assert!(matches!(
        &tokens.key_extractor,
        KeyExtractor::Tokens { token_key, prefix: Some(p), pattern: None, .. }
            if token_key == "mentions" && p == "@"
    ));

    let err = JobConfig::hashtag_count()
        .apply(&JobOverrides {
            fields: Some(vec![1]),
            ..Default::default()
        })
        .unwrap_err();
    assert!(err.to_string().contains("field-join"), "{err}");

    let err = JobConfig::top_visitors(10)
        .apply(&JobOverrides {
            prefix: Some("#".into()),
            ..Default::default()
        })
        .unwrap_err();
    assert!(err.to_string().contains("tokens extractor"), "{err}");
    Ok(())
}

#[test]
fn exec_overrides() -> Result<()> {
    let mut cfg = JobConfig::hashtag_count();
    cfg.apply(&JobOverrides {
        sequential: true,
        ..Default::default()
    })?;
    assert_eq!(cfg.validate()?.exec, ExecMode::Sequential);

    cfg.apply(&JobOverrides {
        partitions: Some(3),
        ..Default::default()
    })?;
    assert_eq!(
        cfg.exec,
        ExecConfig {
            sequential: false,
            partitions: Some(3),
            threads: None,
        }
    );
    Ok(())
}
