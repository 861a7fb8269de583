use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use irontally::config::{Encoding, ExtractorKind, InputFormat, JobOverrides, MergeOp, Mode};
use irontally::{
    JobConfig, JsonlSink, MetricsCollector, TsvSink, expand_inputs, open_sources, run_job,
    write_results,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Aggregates keyed counts over text or CSV inputs.
///
/// Every input record is mapped to (key, value) pairs, combined per
/// partition, merged, and written either in full or as the top K keys.
/// Results go to stdout (or --output); logs go to stderr.
#[derive(Parser, Debug)]
#[command(author, version)]
struct Cli {
    /// Input files or glob patterns (gzip is detected automatically)
    #[arg(num_args = 1.., required = true)]
    inputs: Vec<String>,

    /// JSON job configuration; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start from a built-in job
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    #[arg(long, value_enum)]
    mode: Option<CliMode>,

    /// Number of keys to keep; implies --mode top-k
    #[arg(short, long)]
    k: Option<usize>,

    #[arg(long, value_enum)]
    merge_op: Option<CliMergeOp>,

    /// Key extractor kind; resets its options to their defaults
    #[arg(long, value_enum)]
    extractor: Option<Extractor>,

    /// Tokens extractor: key counted once per record
    #[arg(long)]
    record_key: Option<String>,

    /// Tokens extractor: key receiving the matching token count
    #[arg(long)]
    token_key: Option<String>,

    /// Tokens extractor: token prefix to count
    #[arg(long, conflicts_with = "pattern")]
    prefix: Option<String>,

    /// Tokens extractor: regular expression a token must match
    #[arg(long)]
    pattern: Option<String>,

    /// Field-join extractor: zero-based field indices
    #[arg(long, value_delimiter = ',')]
    fields: Option<Vec<usize>>,

    /// Field-join extractor: separator between joined fields
    #[arg(long)]
    separator: Option<String>,

    /// Read inputs as CSV rows instead of text lines
    #[arg(long)]
    csv: bool,

    /// Skip the first CSV row
    #[arg(long)]
    has_headers: bool,

    /// Read the first CSV row as data, even if the preset or config skips it
    #[arg(long, conflicts_with = "has_headers")]
    no_headers: bool,

    #[arg(long, value_enum)]
    encoding: Option<CliEncoding>,

    /// Run on the calling thread as a single partition
    #[arg(long, conflicts_with_all = ["partitions", "threads"])]
    sequential: bool,

    #[arg(long)]
    partitions: Option<usize>,

    /// Size of a dedicated worker pool
    #[arg(long)]
    threads: Option<usize>,

    /// Write results here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Tsv)]
    format: OutputFormat,

    /// Print run metrics to stderr
    #[arg(long)]
    metrics: bool,

    /// Save run metrics as JSON
    #[arg(long)]
    metrics_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG wins when set
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    /// Tweet and hashtag totals
    Hashtags,
    /// Ten most frequent visitor names in a Latin-1 CSV
    Visitors,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliMode {
    FullAggregate,
    TopK,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliMergeOp {
    Sum,
    Count,
    Max,
    Min,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Extractor {
    Tokens,
    FieldJoin,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliEncoding {
    Utf8,
    Latin1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// JSON key, tab, JSON value
    Tsv,
    /// One [key, value] JSON array per line
    Jsonl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!(?cli, "parsed arguments");

    let config = build_config(&cli)?;
    let job = config.validate()?;

    let paths = expand_inputs(&cli.inputs)?;
    info!(files = paths.len(), "inputs resolved");
    let mut source = open_sources(&paths, &job.input)?;

    let metrics = MetricsCollector::new();
    metrics.record_start();
    let out = run_job(&job, &mut source, None)?;

    let written = match &cli.output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("create output {}", path.display()))?;
            emit(cli.format, BufWriter::new(file), &out.results)?
        }
        None => emit(cli.format, std::io::stdout().lock(), &out.results)?,
    };
    metrics.record_end();
    out.record_metrics(&metrics);
    info!(written, "done");

    if cli.metrics {
        metrics.print();
    }
    if let Some(path) = &cli.metrics_file {
        metrics.save_to_file(path)?;
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .init();
}

fn emit<W: Write>(format: OutputFormat, out: W, results: &[(String, u64)]) -> Result<usize> {
    match format {
        OutputFormat::Tsv => write_results(&mut TsvSink::new(out), results),
        OutputFormat::Jsonl => write_results(&mut JsonlSink::new(out), results),
    }
}

/// Config file or preset first, then individual flags on top.
fn build_config(cli: &Cli) -> Result<JobConfig> {
    let mut config = match (&cli.config, cli.preset) {
        (Some(_), Some(_)) => bail!("--config and --preset cannot be combined"),
        (Some(path), None) => JobConfig::from_json_file(path)?,
        (None, Some(Preset::Hashtags)) | (None, None) => JobConfig::hashtag_count(),
        (None, Some(Preset::Visitors)) => JobConfig::top_visitors(10),
    };
    config.apply(&cli.overrides())?;
    Ok(config)
}

impl Cli {
    fn overrides(&self) -> JobOverrides {
        JobOverrides {
            mode: self.mode.map(|m| match m {
                CliMode::FullAggregate => Mode::FullAggregate,
                CliMode::TopK => Mode::TopK,
            }),
            k: self.k,
            merge_op: self.merge_op.map(|op| match op {
                CliMergeOp::Sum => MergeOp::Sum,
                CliMergeOp::Count => MergeOp::Count,
                CliMergeOp::Max => MergeOp::Max,
                CliMergeOp::Min => MergeOp::Min,
            }),
            extractor: self.extractor.map(|e| match e {
                Extractor::Tokens => ExtractorKind::Tokens,
                Extractor::FieldJoin => ExtractorKind::FieldJoin,
            }),
            record_key: self.record_key.clone(),
            token_key: self.token_key.clone(),
            prefix: self.prefix.clone(),
            pattern: self.pattern.clone(),
            fields: self.fields.clone(),
            separator: self.separator.clone(),
            format: self.csv.then_some(InputFormat::Csv),
            has_headers: match (self.has_headers, self.no_headers) {
                (true, _) => Some(true),
                (false, true) => Some(false),
                (false, false) => None,
            },
            encoding: self.encoding.map(|e| match e {
                CliEncoding::Utf8 => Encoding::Utf8,
                CliEncoding::Latin1 => Encoding::Latin1,
            }),
            sequential: self.sequential,
            partitions: self.partitions,
            threads: self.threads,
        }
    }
}
