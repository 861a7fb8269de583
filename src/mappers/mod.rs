//! Built-in mappers for the two job shapes.
//!
//! - [`TokenCounter`] -- counting variant: classify each record and count
//!   matching tokens (tweets and hashtags).
//! - [`FieldJoin`] -- extraction variant: build one composite key from row
//!   fields (visitor names).

mod field_join;
mod tokens;

pub use field_join::{FieldJoin, VISITOR_NAME_FIELDS};
pub use tokens::{TokenCounter, TokenMatcher};

use crate::mapper::{MalformedRecord, Mapper};
use crate::record::Record;

/// One of the built-in mappers, picked by configuration.
#[derive(Clone, Debug)]
pub enum BuiltinMapper {
    Tokens(TokenCounter),
    FieldJoin(FieldJoin),
}

impl Mapper<u64> for BuiltinMapper {
    fn map(&self, record: &Record) -> Result<Vec<(String, u64)>, MalformedRecord> {
        match self {
            Self::Tokens(m) => m.map(record),
            Self::FieldJoin(m) => m.map(record),
        }
    }
}
