//! Run metrics collection and reporting.
//!
//! A [`MetricsCollector`] holds named [`Metric`]s plus the wall-clock span of
//! a job. The job driver fills it from a run's [`RunStats`] and the number of
//! results written; callers may register their own metrics alongside.
//!
//! # Example
//!
//! ```no_run
//! use irontally::metrics::{CounterMetric, MetricsCollector};
//!
//! # fn main() -> anyhow::Result<()> {
//! let metrics = MetricsCollector::new();
//! metrics.record_start();
//! metrics.register(Box::new(CounterMetric::with_value("files", 3)));
//! metrics.increment_counter("results_emitted", 10);
//! metrics.record_end();
//!
//! metrics.print();
//! metrics.save_to_file("metrics.json")?;
//! # Ok(())
//! # }
//! ```

use crate::runner::RunStats;
use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::any::Any;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub const RECORDS_READ: &str = "records_read";
pub const RECORDS_SKIPPED: &str = "records_skipped";
pub const PAIRS_EMITTED: &str = "pairs_emitted";
pub const PARTITIONS: &str = "partitions";
pub const DISTINCT_KEYS: &str = "distinct_keys";
pub const RESULTS_EMITTED: &str = "results_emitted";

/// A named value reported at the end of a job.
pub trait Metric: Send + Sync + Any {
    fn name(&self) -> &str;

    /// Current value as JSON.
    fn value(&self) -> Value;

    fn description(&self) -> Option<&str> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Thread-safe, cheaply cloneable metric registry.
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsCollectorInner>>,
}

struct MetricsCollectorInner {
    metrics: HashMap<String, Box<dyn Metric>>,
    start_time: Option<Instant>,
    end_time: Option<Instant>,
}

impl MetricsCollector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsCollectorInner {
                metrics: HashMap::new(),
                start_time: None,
                end_time: None,
            })),
        }
    }

    // A panic while holding the lock leaves plain data behind; keep using it.
    fn lock(&self) -> MutexGuard<'_, MetricsCollectorInner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Register a metric, replacing any metric with the same name.
    pub fn register(&self, metric: Box<dyn Metric>) {
        self.lock().metrics.insert(metric.name().to_string(), metric);
    }

    pub fn register_all(&self, metrics: Vec<Box<dyn Metric>>) {
        for metric in metrics {
            self.register(metric);
        }
    }

    pub fn record_start(&self) {
        self.lock().start_time = Some(Instant::now());
    }

    pub fn record_end(&self) {
        self.lock().end_time = Some(Instant::now());
    }

    /// Time between [`record_start`](Self::record_start) and
    /// [`record_end`](Self::record_end), if both were called.
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        let inner = self.lock();
        match (inner.start_time, inner.end_time) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }

    /// Add `value` to a counter, creating it at `value` if absent.
    ///
    /// A non-counter metric under the same name is left untouched.
    pub fn increment_counter(&self, name: &str, value: u64) {
        let mut inner = self.lock();
        let current = inner
            .metrics
            .get(name)
            .map(|m| m.as_any().downcast_ref::<CounterMetric>().map(|c| c.count));
        let count = match current {
            Some(Some(count)) => count + value,
            Some(None) => return,
            None => value,
        };
        inner
            .metrics
            .insert(name.to_string(), Box::new(CounterMetric::with_value(name, count)));
    }

    pub fn set_counter(&self, name: &str, value: u64) {
        self.lock()
            .metrics
            .insert(name.to_string(), Box::new(CounterMetric::with_value(name, value)));
    }

    /// Current value of a counter, if one exists under `name`.
    #[must_use]
    pub fn counter(&self, name: &str) -> Option<u64> {
        self.lock()
            .metrics
            .get(name)
            .and_then(|m| m.as_any().downcast_ref::<CounterMetric>())
            .map(|c| c.count)
    }

    /// Add every counter of one run.
    pub fn record_run(&self, stats: &RunStats) {
        self.increment_counter(RECORDS_READ, stats.records_read);
        self.increment_counter(RECORDS_SKIPPED, stats.records_skipped);
        self.increment_counter(PAIRS_EMITTED, stats.pairs_emitted);
        self.increment_counter(PARTITIONS, stats.partitions);
        self.set_counter(DISTINCT_KEYS, stats.distinct_keys);
    }

    /// All metrics as a JSON object of `{ name: { value, description? } }`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let inner = self.lock();
        let mut metrics_json = serde_json::Map::new();

        for (name, metric) in &inner.metrics {
            let mut metric_obj = serde_json::Map::new();
            metric_obj.insert("value".to_string(), metric.value());
            if let Some(desc) = metric.description() {
                metric_obj.insert("description".to_string(), json!(desc));
            }
            metrics_json.insert(name.clone(), Value::Object(metric_obj));
        }

        if let (Some(start), Some(end)) = (inner.start_time, inner.end_time) {
            let elapsed_ms = end.duration_since(start).as_millis();
            metrics_json.insert(
                "execution_time_ms".to_string(),
                json!({
                    "value": elapsed_ms,
                    "description": "Total job execution time in milliseconds",
                }),
            );
        }
        drop(inner);
        Value::Object(metrics_json)
    }

    /// Write a human-readable report, metrics sorted by name.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_report<W: Write>(&self, out: &mut W) -> Result<()> {
        let inner = self.lock();
        writeln!(out, "\n========== Job Metrics ==========")?;

        if let (Some(start), Some(end)) = (inner.start_time, inner.end_time) {
            let elapsed = end.duration_since(start);
            writeln!(
                out,
                "Execution Time: {:.3}s ({} ms)",
                elapsed.as_secs_f64(),
                elapsed.as_millis()
            )?;
            writeln!(out, "---------------------------------")?;
        }

        let mut sorted: Vec<_> = inner.metrics.iter().collect();
        sorted.sort_by_key(|(name, _)| *name);
        for (name, metric) in sorted {
            match metric.description() {
                Some(desc) => writeln!(out, "{name}: {} ({desc})", metric.value())?,
                None => writeln!(out, "{name}: {}", metric.value())?,
            }
        }
        writeln!(out, "=================================\n")?;
        Ok(())
    }

    /// Print the report to stderr; stdout is reserved for results.
    pub fn print(&self) {
        let mut err = std::io::stderr().lock();
        if let Err(e) = self.write_report(&mut err) {
            tracing::warn!(error = %e, "failed to print metrics");
        }
    }

    /// Save all metrics as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let formatted = serde_json::to_string_pretty(&self.to_json())?;
        let mut file =
            File::create(path).with_context(|| format!("create metrics file {}", path.display()))?;
        file.write_all(formatted.as_bytes())
            .with_context(|| format!("write metrics file {}", path.display()))?;
        Ok(())
    }

    /// Name to value, without descriptions or timing.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.lock()
            .metrics
            .iter()
            .map(|(name, metric)| (name.clone(), metric.value()))
            .collect()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// A monotonically reported count.
pub struct CounterMetric {
    name: String,
    count: u64,
}

impl CounterMetric {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_value(name, 0)
    }

    pub fn with_value(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

impl Metric for CounterMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> Value {
        json!(self.count)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A single floating-point reading, such as a throughput.
pub struct GaugeMetric {
    name: String,
    value: f64,
    description: Option<String>,
}

impl GaugeMetric {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Metric for GaugeMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> Value {
        json!(self.value)
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
