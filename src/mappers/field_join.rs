//! Extraction mapper: one composite key built from selected row fields.

use crate::mapper::{MalformedRecord, Mapper};
use crate::record::Record;

/// Field indices of the visitor last and first name columns.
pub const VISITOR_NAME_FIELDS: [usize; 2] = [19, 20];

/// Joins the trimmed values at `fields` with `separator` and emits
/// `(joined, 1)`.
///
/// - A row with no fields contributes nothing.
/// - A row too short for the largest index, or a text line, is malformed.
#[derive(Clone, Debug)]
pub struct FieldJoin {
    pub fields: Vec<usize>,
    pub separator: String,
}

impl FieldJoin {
    pub fn new(fields: Vec<usize>, separator: impl Into<String>) -> Self {
        Self {
            fields,
            separator: separator.into(),
        }
    }

    /// Visitor full name (`"LAST FIRST"`).
    #[must_use]
    pub fn visitor_name() -> Self {
        Self::new(VISITOR_NAME_FIELDS.to_vec(), " ")
    }

    fn key_for(&self, row: &[String]) -> Result<String, MalformedRecord> {
        let mut parts = Vec::with_capacity(self.fields.len());
        for &idx in &self.fields {
            let value = row.get(idx).ok_or_else(|| {
                MalformedRecord::new(format!(
                    "row has {} fields, field {idx} requested",
                    row.len()
                ))
            })?;
            parts.push(value.trim());
        }
        Ok(parts.join(&self.separator))
    }
}

impl Mapper<u64> for FieldJoin {
    fn map(&self, record: &Record) -> Result<Vec<(String, u64)>, MalformedRecord> {
        let Some(row) = record.fields() else {
            return Err(MalformedRecord::new("expected a row, got a text line"));
        };
        if row.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![(self.key_for(row)?, 1)])
    }
}
