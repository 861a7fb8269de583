//! End-to-end runs of the `irontally` binary.
#![cfg(feature = "io-csv")]

use anyhow::Result;
use irontally::config::Encoding;
use irontally::testing::*;
use std::process::{Command, Output};

fn irontally(args: &[&str]) -> Result<Output> {
    Ok(Command::new(env!("CARGO_BIN_EXE_irontally"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()?)
}

fn stdout_lines(out: &Output) -> Vec<String> {
    String::from_utf8_lossy(&out.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn visitors_preset_ranks_top_names() -> Result<()> {
    let file = mock_csv_file(&visitor_rows(), Some(&visitor_header()[..]), Encoding::Latin1)?;
    let path = file.path().to_string_lossy().into_owned();

    let out = irontally(&["--preset", "visitors", "-k", "2", &path])?;

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(stdout_lines(&out), vec!["\"SMITH JOHN\"\t3", "\"DOE JANE\"\t2"]);
    Ok(())
}

#[test]
fn visitors_preset_in_full_aggregate_mode() -> Result<()> {
    let file = mock_csv_file(&visitor_rows(), Some(&visitor_header()[..]), Encoding::Latin1)?;
    let path = file.path().to_string_lossy().into_owned();

    let out = irontally(&["--preset", "visitors", "--mode", "full-aggregate", &path])?;

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let mut lines = stdout_lines(&out);
    lines.sort();
    assert_eq!(
        lines,
        vec![
            "\"BROWN ALEX\"\t2",
            "\"DOE JANE\"\t2",
            "\"LEE KIM\"\t1",
            "\"SMITH JOHN\"\t3",
        ]
    );
    Ok(())
}

#[test]
fn no_headers_reads_the_first_row_as_data() -> Result<()> {
    let file = mock_csv_file(&visitor_rows(), Some(&visitor_header()[..]), Encoding::Latin1)?;
    let path = file.path().to_string_lossy().into_owned();

    let out = irontally(&[
        "--preset",
        "visitors",
        "--mode",
        "full-aggregate",
        "--no-headers",
        &path,
    ])?;

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let lines = stdout_lines(&out);
    assert_eq!(lines.len(), 5);
    assert!(lines.iter().any(|l| l.starts_with("\"NAMELAST")), "{lines:?}");
    Ok(())
}

#[test]
fn k_with_full_aggregate_fails_before_reading() -> Result<()> {
    let out = irontally(&["--mode", "full-aggregate", "-k", "3", "does-not-exist.txt"])?;

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("k is only valid with mode top-k"), "{stderr}");
    Ok(())
}
