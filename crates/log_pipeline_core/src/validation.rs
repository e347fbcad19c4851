use serde_json::Value;

pub const PROCESSED_TIMESTAMP_FIELD: &str = "processed_timestamp";
pub const DEFAULT_REQUIRED_FIELDS: [&str; 2] = ["level", "message"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("entry is not a JSON object")]
    NotAnObject,

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
}

/// Schema predicate applied to every decoded line.
pub trait RecordValidator {
    fn validate(&self, record: &Value) -> Result<(), Rejection>;

    fn is_valid(&self, record: &Value) -> bool {
        self.validate(record).is_ok()
    }
}

/// Presence check over a fixed set of keys. Field values are not inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredFields {
    fields: Vec<String>,
}

impl RequiredFields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl Default for RequiredFields {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIRED_FIELDS)
    }
}

impl RecordValidator for RequiredFields {
    fn validate(&self, record: &Value) -> Result<(), Rejection> {
        let Some(object) = record.as_object() else {
            return Err(Rejection::NotAnObject);
        };

        let missing: Vec<String> = self
            .fields
            .iter()
            .filter(|field| !object.contains_key(field.as_str()))
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Rejection::MissingFields(missing))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// Valid record, stamped with `processed_timestamp`.
    Processed(Value),
    /// Rejected record, exactly as decoded.
    Invalid(Value),
}

pub fn classify(
    record: Value,
    validator: &dyn RecordValidator,
    processed_timestamp: &str,
    line_number: usize,
) -> Classified {
    if let Err(rejection) = validator.validate(&record) {
        tracing::warn!(
            line_number,
            entry = %record,
            reason = %rejection,
            "validation failed for log entry"
        );
        return Classified::Invalid(record);
    }

    match record {
        Value::Object(mut object) => {
            // An existing stamp keeps its position; a new one goes last.
            object.insert(
                PROCESSED_TIMESTAMP_FIELD.to_string(),
                Value::from(processed_timestamp),
            );
            Classified::Processed(Value::Object(object))
        }
        // A validator may accept non-objects; there is nowhere to stamp them.
        other => Classified::Processed(other),
    }
}
