//! Counting mapper: one record key plus a count of matching tokens.

use crate::mapper::{MalformedRecord, Mapper};
use crate::record::Record;
use regex::Regex;

/// Decides whether a whitespace-separated token counts.
#[derive(Clone, Debug)]
pub enum TokenMatcher {
    /// Token starts with the given prefix (`"#"` for hashtags).
    Prefix(String),
    /// Token matches the regular expression anywhere.
    Pattern(Regex),
}

impl TokenMatcher {
    #[must_use]
    pub fn matches(&self, token: &str) -> bool {
        match self {
            Self::Prefix(p) => token.starts_with(p.as_str()),
            Self::Pattern(re) => re.is_match(token),
        }
    }
}

/// Emits `(record_key, 1)` and `(token_key, n)` for every record, where `n` is
/// the number of matching tokens.
///
/// The token key is emitted even when `n == 0`, so both keys exist as soon as
/// one record has been seen.
///
/// ```
/// use irontally::mapper::Mapper;
/// use irontally::mappers::TokenCounter;
/// use irontally::record::Record;
///
/// let m = TokenCounter::hashtags();
/// let pairs = m.map(&Record::from("a #x #y")).unwrap();
/// assert_eq!(pairs, vec![("tweets".to_string(), 1), ("hashtags".to_string(), 2)]);
/// ```
#[derive(Clone, Debug)]
pub struct TokenCounter {
    pub record_key: String,
    pub token_key: String,
    pub matcher: TokenMatcher,
}

impl TokenCounter {
    pub fn new(
        record_key: impl Into<String>,
        token_key: impl Into<String>,
        matcher: TokenMatcher,
    ) -> Self {
        Self {
            record_key: record_key.into(),
            token_key: token_key.into(),
            matcher,
        }
    }

    /// Tweets and hashtags.
    #[must_use]
    pub fn hashtags() -> Self {
        Self::new("tweets", "hashtags", TokenMatcher::Prefix("#".into()))
    }

    #[must_use]
    pub fn count_tokens(&self, text: &str) -> u64 {
        text.split_whitespace()
            .filter(|t| self.matcher.matches(t))
            .count() as u64
    }
}

impl Mapper<u64> for TokenCounter {
    fn map(&self, record: &Record) -> Result<Vec<(String, u64)>, MalformedRecord> {
        let n = self.count_tokens(&record.text());
        Ok(vec![
            (self.record_key.clone(), 1),
            (self.token_key.clone(), n),
        ])
    }
}
