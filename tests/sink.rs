use anyhow::Result;
use irontally::sink::write_all;
use irontally::*;

fn results() -> Vec<(String, u64)> {
    vec![
        ("SMITH JOHN".to_string(), 3),
        ("say \"hi\"".to_string(), 2),
        ("tab\there".to_string(), 1),
    ]
}

#[test]
fn tsv_lines_are_json_key_tab_json_value() -> Result<()> {
    let mut sink = TsvSink::new(Vec::new());
    let n = write_all(&mut sink, &results())?;

    assert_eq!(n, 3);
    let text = String::from_utf8(sink.into_inner())?;
    assert_eq!(
        text,
        "\"SMITH JOHN\"\t3\n\"say \\\"hi\\\"\"\t2\n\"tab\\there\"\t1\n"
    );
    Ok(())
}

#[test]
fn jsonl_lines_are_key_value_arrays() -> Result<()> {
    let mut sink = JsonlSink::new(Vec::new());
    write_results(&mut sink, &results()[..1])?;

    let text = String::from_utf8(sink.into_inner())?;
    assert_eq!(text, "[\"SMITH JOHN\",3]\n");

    let parsed: (String, u64) = serde_json::from_str(text.trim_end())?;
    assert_eq!(parsed, ("SMITH JOHN".to_string(), 3));
    Ok(())
}

#[test]
fn vec_sink_keeps_order() -> Result<()> {
    let mut sink = VecSink::new();
    write_all(&mut sink, &results())?;
    assert_eq!(sink.pairs(), results().as_slice());
    assert_eq!(sink.into_inner(), results());
    Ok(())
}

#[test]
fn failing_writer_reports_the_result_index() {
    struct Full;

    impl std::io::Write for Full {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let err = write_all(&mut TsvSink::new(Full), &results()).unwrap_err();
    assert!(err.to_string().contains("write result #1"), "{err:#}");
}
