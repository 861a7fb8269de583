//! The unit of input handed to a mapper.

use serde::{Deserialize, Serialize};

/// One raw input record.
///
/// Sources own records until they hand them to the runner; mappers only ever
/// borrow them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Record {
    /// A line of free text (a post, a log line).
    Line(String),
    /// A row of already-split fields (a CSV row).
    Row(Vec<String>),
}

impl Record {
    /// Borrow the record as text.
    ///
    /// Rows are joined with a single space so text mappers work on tabular
    /// input too.
    #[must_use]
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Self::Line(s) => std::borrow::Cow::Borrowed(s.as_str()),
            Self::Row(fields) => std::borrow::Cow::Owned(fields.join(" ")),
        }
    }

    /// Fields of a row, or `None` for a line.
    #[must_use]
    pub fn fields(&self) -> Option<&[String]> {
        match self {
            Self::Row(fields) => Some(fields),
            Self::Line(_) => None,
        }
    }
}

impl From<String> for Record {
    fn from(value: String) -> Self {
        Self::Line(value)
    }
}

impl From<&str> for Record {
    fn from(value: &str) -> Self {
        Self::Line(value.to_string())
    }
}

impl From<Vec<String>> for Record {
    fn from(value: Vec<String>) -> Self {
        Self::Row(value)
    }
}
