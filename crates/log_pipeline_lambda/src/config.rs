//! Handler configuration.
//!
//! Values are read from environment variables:
//! - `PROCESSED_BUCKET`: destination bucket for every output artifact (required)
//! - `OUTPUT_KEY_STRATEGY`: `timestamped` (default) or `deterministic`
//! - `REQUIRED_FIELDS`: comma-separated keys a valid entry must carry
//!   (default `level,message`)

use log_pipeline_core::storage_keys::KeyStrategy;
use log_pipeline_core::validation::RequiredFields;

pub const PROCESSED_BUCKET_VAR: &str = "PROCESSED_BUCKET";
pub const OUTPUT_KEY_STRATEGY_VAR: &str = "OUTPUT_KEY_STRATEGY";
pub const REQUIRED_FIELDS_VAR: &str = "REQUIRED_FIELDS";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub destination_bucket: String,
    pub key_strategy: KeyStrategy,
    pub required_fields: RequiredFields,
}

impl HandlerConfig {
    pub fn new(destination_bucket: impl Into<String>) -> Self {
        Self {
            destination_bucket: destination_bucket.into(),
            key_strategy: KeyStrategy::default(),
            required_fields: RequiredFields::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `PROCESSED_BUCKET` is unset or blank
    /// - `OUTPUT_KEY_STRATEGY` names an unknown strategy
    /// - `REQUIRED_FIELDS` is set but lists no field names
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let destination_bucket = lookup(PROCESSED_BUCKET_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing(PROCESSED_BUCKET_VAR))?;

        let key_strategy = match lookup(OUTPUT_KEY_STRATEGY_VAR) {
            Some(value) if !value.trim().is_empty() => {
                KeyStrategy::parse(&value).ok_or_else(|| ConfigError::Invalid {
                    name: OUTPUT_KEY_STRATEGY_VAR,
                    reason: format!("unknown strategy '{}'", value.trim()),
                })?
            }
            _ => KeyStrategy::default(),
        };

        let required_fields = match lookup(REQUIRED_FIELDS_VAR) {
            Some(value) => parse_required_fields(&value)?,
            None => RequiredFields::default(),
        };

        Ok(Self {
            destination_bucket,
            key_strategy,
            required_fields,
        })
    }
}

fn parse_required_fields(value: &str) -> Result<RequiredFields, ConfigError> {
    let fields: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect();
    if fields.is_empty() {
        return Err(ConfigError::Invalid {
            name: REQUIRED_FIELDS_VAR,
            reason: "at least one field name is required".to_string(),
        });
    }
    Ok(RequiredFields::new(fields))
}
