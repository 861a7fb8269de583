//! Job configuration.
//!
//! A [`JobConfig`] is plain serde data, loaded from JSON or built in code, and
//! checked once by [`JobConfig::validate`] before any record is read. The
//! validated form, [`ValidatedJob`], holds the concrete mapper, output mode
//! and execution mode the [`job`](crate::job) module runs.
//!
//! ```
//! use irontally::config::JobConfig;
//!
//! let cfg = JobConfig::from_json_str(r#"{ "mode": "top-k", "k": 10,
//!     "key_extractor": { "kind": "field-join", "fields": [19, 20] } }"#)?;
//! let job = cfg.validate()?;
//! # Ok::<(), irontally::EngineError>(())
//! ```

use crate::error::{EngineError, EngineResult};
use crate::mappers::{BuiltinMapper, FieldJoin, TokenCounter, TokenMatcher, VISITOR_NAME_FIELDS};
use crate::reducer::OutputMode;
use crate::runner::ExecMode;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    FullAggregate,
    TopK,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeOp {
    #[default]
    Sum,
    Count,
    Max,
    Min,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum KeyExtractor {
    /// Counting variant: a record key plus a count of matching tokens.
    Tokens {
        #[serde(default = "default_record_key")]
        record_key: String,
        #[serde(default = "default_token_key")]
        token_key: String,
        /// Token prefix; `"#"` when neither `prefix` nor `pattern` is set.
        #[serde(default)]
        prefix: Option<String>,
        /// Regular expression a token must match.
        #[serde(default)]
        pattern: Option<String>,
    },
    /// Extraction variant: join row fields into one key.
    FieldJoin {
        #[serde(default = "default_fields")]
        fields: Vec<usize>,
        #[serde(default = "default_separator")]
        separator: String,
    },
}

impl Default for KeyExtractor {
    fn default() -> Self {
        Self::Tokens {
            record_key: default_record_key(),
            token_key: default_token_key(),
            prefix: None,
            pattern: None,
        }
    }
}

impl KeyExtractor {
    fn apply(&mut self, o: &JobOverrides) -> EngineResult<()> {
        match self {
            Self::Tokens {
                record_key,
                token_key,
                prefix,
                pattern,
            } => {
                if o.fields.is_some() || o.separator.is_some() {
                    return Err(EngineError::invalid_config(
                        "fields and separator need the field-join extractor",
                    ));
                }
                if o.prefix.is_some() && o.pattern.is_some() {
                    return Err(EngineError::invalid_config("set either prefix or pattern, not both"));
                }
                if let Some(k) = &o.record_key {
                    record_key.clone_from(k);
                }
                if let Some(k) = &o.token_key {
                    token_key.clone_from(k);
                }
                if let Some(p) = &o.prefix {
                    *prefix = Some(p.clone());
                    *pattern = None;
                }
                if let Some(p) = &o.pattern {
                    *pattern = Some(p.clone());
                    *prefix = None;
                }
            }
            Self::FieldJoin { fields, separator } => {
                if o.record_key.is_some()
                    || o.token_key.is_some()
                    || o.prefix.is_some()
                    || o.pattern.is_some()
                {
                    return Err(EngineError::invalid_config(
                        "record_key, token_key, prefix and pattern need the tokens extractor",
                    ));
                }
                if let Some(f) = &o.fields {
                    fields.clone_from(f);
                }
                if let Some(s) = &o.separator {
                    separator.clone_from(s);
                }
            }
        }
        Ok(())
    }
}

fn default_record_key() -> String {
    "tweets".into()
}
fn default_token_key() -> String {
    "hashtags".into()
}
fn default_fields() -> Vec<usize> {
    VISITOR_NAME_FIELDS.to_vec()
}
fn default_separator() -> String {
    " ".into()
}

/// Text encoding of file inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    #[default]
    Utf8,
    /// ISO-8859-1: every byte is the code point of the same value.
    Latin1,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputFormat {
    /// One record per line.
    #[default]
    Lines,
    /// One record per CSV row.
    Csv,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    #[serde(default)]
    pub format: InputFormat,
    /// Skip the first CSV row.
    #[serde(default)]
    pub has_headers: bool,
    #[serde(default)]
    pub encoding: Encoding,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecConfig {
    /// Run everything on the calling thread as one partition.
    #[serde(default)]
    pub sequential: bool,
    #[serde(default)]
    pub partitions: Option<usize>,
    #[serde(default)]
    pub threads: Option<usize>,
}

/// Everything needed to run one job.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    #[serde(default)]
    pub mode: Mode,
    /// Required iff `mode` is `top-k`; must be positive.
    #[serde(default)]
    pub k: Option<usize>,
    #[serde(default)]
    pub merge_op: MergeOp,
    #[serde(default)]
    pub key_extractor: KeyExtractor,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub exec: ExecConfig,
}

/// Which key extractor an override switches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractorKind {
    Tokens,
    FieldJoin,
}

/// Field-by-field changes laid over a loaded [`JobConfig`].
///
/// `None` (or `false` for `sequential`) leaves the loaded value alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JobOverrides {
    /// Setting `full-aggregate` without `k` also clears any loaded `k`.
    pub mode: Option<Mode>,
    /// Implies `top-k` when `mode` is not given.
    pub k: Option<usize>,
    pub merge_op: Option<MergeOp>,
    /// Switches extractor kind and resets its options to their defaults.
    pub extractor: Option<ExtractorKind>,
    pub record_key: Option<String>,
    pub token_key: Option<String>,
    pub prefix: Option<String>,
    pub pattern: Option<String>,
    pub fields: Option<Vec<usize>>,
    pub separator: Option<String>,
    pub format: Option<InputFormat>,
    pub has_headers: Option<bool>,
    pub encoding: Option<Encoding>,
    pub sequential: bool,
    pub partitions: Option<usize>,
    pub threads: Option<usize>,
}

/// A configuration that passed validation.
#[derive(Clone, Debug)]
pub struct ValidatedJob {
    pub output: OutputMode,
    pub merge_op: MergeOp,
    pub mapper: BuiltinMapper,
    pub input: InputConfig,
    pub exec: ExecMode,
}

impl JobConfig {
    /// Tweet and hashtag totals over text lines.
    #[must_use]
    pub fn hashtag_count() -> Self {
        Self::default()
    }

    /// The `k` most frequent visitor names in a Latin-1 CSV with a header row.
    #[must_use]
    pub fn top_visitors(k: usize) -> Self {
        Self {
            mode: Mode::TopK,
            k: Some(k),
            key_extractor: KeyExtractor::FieldJoin {
                fields: default_fields(),
                separator: default_separator(),
            },
            input: InputConfig {
                format: InputFormat::Csv,
                has_headers: true,
                encoding: Encoding::Latin1,
            },
            ..Self::default()
        }
    }

    /// Parse a JSON configuration.
    ///
    /// # Errors
    /// [`EngineError::InvalidConfiguration`] if the JSON does not describe a `JobConfig`.
    pub fn from_json_str(s: &str) -> EngineResult<Self> {
        serde_json::from_str(s).map_err(|e| EngineError::invalid_config(format!("parse job config: {e}")))
    }

    /// Read and parse a JSON configuration file.
    ///
    /// # Errors
    /// [`EngineError::InvalidConfiguration`] if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            EngineError::invalid_config(format!("read job config {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Lay `overrides` over this configuration.
    ///
    /// # Errors
    /// [`EngineError::InvalidConfiguration`] if an option belongs to the other
    /// extractor kind, or `prefix` and `pattern` are both given.
    pub fn apply(&mut self, overrides: &JobOverrides) -> EngineResult<()> {
        match (overrides.mode, overrides.k) {
            (Some(mode), k) => {
                self.mode = mode;
                if k.is_some() || mode == Mode::FullAggregate {
                    self.k = k;
                }
            }
            (None, Some(k)) => {
                self.mode = Mode::TopK;
                self.k = Some(k);
            }
            (None, None) => {}
        }
        if let Some(op) = overrides.merge_op {
            self.merge_op = op;
        }

        match overrides.extractor {
            Some(ExtractorKind::Tokens) => self.key_extractor = KeyExtractor::default(),
            Some(ExtractorKind::FieldJoin) => {
                self.key_extractor = KeyExtractor::FieldJoin {
                    fields: default_fields(),
                    separator: default_separator(),
                };
            }
            None => {}
        }
        self.key_extractor.apply(overrides)?;

        if let Some(format) = overrides.format {
            self.input.format = format;
        }
        if let Some(has_headers) = overrides.has_headers {
            self.input.has_headers = has_headers;
        }
        if let Some(encoding) = overrides.encoding {
            self.input.encoding = encoding;
        }

        if overrides.sequential {
            self.exec.sequential = true;
        }
        if overrides.partitions.is_some() {
            self.exec.partitions = overrides.partitions;
            self.exec.sequential = false;
        }
        if overrides.threads.is_some() {
            self.exec.threads = overrides.threads;
            self.exec.sequential = false;
        }
        Ok(())
    }

    /// Check the configuration and build the concrete job pieces.
    ///
    /// # Errors
    /// [`EngineError::InvalidConfiguration`] when:
    /// - `mode` is `top-k` and `k` is missing or zero,
    /// - `k` is set while `mode` is `full-aggregate`,
    /// - a token extractor sets both `prefix` and `pattern`, has an invalid
    ///   pattern, or uses the same key twice,
    /// - a field-join extractor has no fields,
    /// - `exec.partitions` or `exec.threads` is zero.
    pub fn validate(&self) -> EngineResult<ValidatedJob> {
        let output = match (self.mode, self.k) {
            (Mode::TopK, None) => {
                return Err(EngineError::invalid_config("mode top-k requires k"));
            }
            (Mode::TopK, Some(0)) => {
                return Err(EngineError::invalid_config("k must be a positive integer"));
            }
            (Mode::TopK, Some(k)) => OutputMode::TopK(k),
            (Mode::FullAggregate, Some(_)) => {
                return Err(EngineError::invalid_config("k is only valid with mode top-k"));
            }
            (Mode::FullAggregate, None) => OutputMode::FullAggregate,
        };

        let mapper = match &self.key_extractor {
            KeyExtractor::Tokens {
                record_key,
                token_key,
                prefix,
                pattern,
            } => {
                if record_key == token_key {
                    return Err(EngineError::invalid_config(format!(
                        "record_key and token_key are both `{record_key}`"
                    )));
                }
                let matcher = match (prefix, pattern) {
                    (Some(_), Some(_)) => {
                        return Err(EngineError::invalid_config(
                            "set either prefix or pattern, not both",
                        ));
                    }
                    (_, Some(p)) => TokenMatcher::Pattern(Regex::new(p).map_err(|e| {
                        EngineError::invalid_config(format!("invalid token pattern: {e}"))
                    })?),
                    (Some(p), None) => TokenMatcher::Prefix(p.clone()),
                    (None, None) => TokenMatcher::Prefix("#".into()),
                };
                BuiltinMapper::Tokens(TokenCounter::new(record_key, token_key, matcher))
            }
            KeyExtractor::FieldJoin { fields, separator } => {
                if fields.is_empty() {
                    return Err(EngineError::invalid_config("field-join needs at least one field"));
                }
                BuiltinMapper::FieldJoin(FieldJoin::new(fields.clone(), separator))
            }
        };

        if self.exec.partitions == Some(0) {
            return Err(EngineError::invalid_config("exec.partitions must be positive"));
        }
        if self.exec.threads == Some(0) {
            return Err(EngineError::invalid_config("exec.threads must be positive"));
        }
        let exec = if self.exec.sequential {
            ExecMode::Sequential
        } else {
            ExecMode::Parallel {
                threads: self.exec.threads,
                partitions: self.exec.partitions,
            }
        };

        Ok(ValidatedJob {
            output,
            merge_op: self.merge_op,
            mapper,
            input: self.input.clone(),
            exec,
        })
    }
}
