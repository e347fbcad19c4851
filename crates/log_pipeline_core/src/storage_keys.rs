use chrono::NaiveDateTime;
use sha2::{Digest, Sha256};

use crate::clock::format_key_stamp;
use crate::contract::InputNotification;

pub const PROCESSED_PREFIX: &str = "processed";
pub const ERRORS_PREFIX: &str = "errors";
const LOG_SUFFIX: &str = ".log";
const FINGERPRINT_HEX_LEN: usize = 16;

/// How the variable part of an output key is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyStrategy {
    /// Generation time at second precision. Redrives add new artifacts.
    #[default]
    Timestamped,
    /// Fingerprint of the source object version. Redrives overwrite.
    Deterministic,
}

impl KeyStrategy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "timestamped" => Some(Self::Timestamped),
            "deterministic" => Some(Self::Deterministic),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timestamped => "timestamped",
            Self::Deterministic => "deterministic",
        }
    }
}

/// Output keys for the two artifacts of one source object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactKeys {
    pub processed: String,
    pub errors: String,
}

impl ArtifactKeys {
    pub fn derive(
        strategy: KeyStrategy,
        notification: &InputNotification,
        generated_at: NaiveDateTime,
    ) -> Self {
        let stamp = match strategy {
            KeyStrategy::Timestamped => format_key_stamp(generated_at),
            KeyStrategy::Deterministic => source_fingerprint(notification),
        };
        Self {
            processed: processed_object_key(&notification.key, &stamp),
            errors: error_object_key(&notification.key, &stamp),
        }
    }
}

pub fn strip_log_suffix(key: &str) -> &str {
    key.strip_suffix(LOG_SUFFIX).unwrap_or(key)
}

pub fn processed_object_key(source_key: &str, stamp: &str) -> String {
    format!(
        "{PROCESSED_PREFIX}/{}_{stamp}.json",
        strip_log_suffix(source_key)
    )
}

pub fn error_object_key(source_key: &str, stamp: &str) -> String {
    format!(
        "{ERRORS_PREFIX}/{}_{stamp}_errors.json",
        strip_log_suffix(source_key)
    )
}

pub fn source_fingerprint(notification: &InputNotification) -> String {
    let mut hasher = Sha256::new();
    for part in [
        notification.bucket.as_str(),
        notification.key.as_str(),
        notification.version_marker.as_deref().unwrap_or_default(),
    ] {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let digest = format!("{:x}", hasher.finalize());
    digest[..FINGERPRINT_HEX_LEN].to_string()
}
