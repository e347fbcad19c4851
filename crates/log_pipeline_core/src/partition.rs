use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::parser::{LineOutcome, ParsedLine, RawFailure};
use crate::validation::{classify, Classified, RecordValidator};

/// Entry in the failed set. Serializes as the bare value, so an invalid record
/// appears as decoded and a raw failure as `{"raw_log", "error"}`.
#[derive(Debug, Clone, PartialEq)]
pub enum FailedEntry {
    Invalid(Value),
    Raw(RawFailure),
}

impl Serialize for FailedEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Invalid(value) => value.serialize(serializer),
            Self::Raw(failure) => failure.serialize(serializer),
        }
    }
}

/// Classified entries from one source object, each side in line order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub processed: Vec<Value>,
    pub failed: Vec<FailedEntry>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.processed.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty() && self.failed.is_empty()
    }

    /// Pretty-printed JSON array of the processed set, or `None` when empty.
    pub fn processed_json(&self) -> Result<Option<Vec<u8>>, serde_json::Error> {
        pretty_array(&self.processed)
    }

    /// Pretty-printed JSON array of the failed set, or `None` when empty.
    pub fn failed_json(&self) -> Result<Option<Vec<u8>>, serde_json::Error> {
        pretty_array(&self.failed)
    }
}

fn pretty_array<T: Serialize>(entries: &[T]) -> Result<Option<Vec<u8>>, serde_json::Error> {
    if entries.is_empty() {
        return Ok(None);
    }
    serde_json::to_vec_pretty(entries).map(Some)
}

/// Drives parsed lines through the validator into a [`Batch`].
///
/// `processed_timestamp` is stamped on every valid record.
pub fn partition(
    lines: impl IntoIterator<Item = ParsedLine>,
    validator: &dyn RecordValidator,
    processed_timestamp: &str,
) -> Batch {
    let mut batch = Batch::default();
    for line in lines {
        match line.outcome {
            LineOutcome::Malformed(failure) => batch.failed.push(FailedEntry::Raw(failure)),
            LineOutcome::Record(record) => {
                match classify(record, validator, processed_timestamp, line.line_number) {
                    Classified::Processed(value) => batch.processed.push(value),
                    Classified::Invalid(value) => batch.failed.push(FailedEntry::Invalid(value)),
                }
            }
        }
    }
    batch
}
