use std::time::Instant;

use log_pipeline_core::clock::{format_processed_timestamp, Clock};
use log_pipeline_core::contract::InputNotification;
use log_pipeline_core::parser::{decode_utf8, parse_lines};
use log_pipeline_core::partition::partition;
use log_pipeline_core::storage_keys::ArtifactKeys;

use crate::adapters::object_store::{ObjectStore, StoreError};
use crate::config::HandlerConfig;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to read {uri}: {source}")]
    Read { uri: String, source: StoreError },

    #[error("{uri} is not valid UTF-8: {source}")]
    Decode {
        uri: String,
        source: std::str::Utf8Error,
    },

    #[error("failed to serialize {artifact} artifact for {uri}: {source}")]
    Serialize {
        uri: String,
        artifact: &'static str,
        source: serde_json::Error,
    },

    #[error("failed to write s3://{bucket}/{key}: {source}")]
    Write {
        bucket: String,
        key: String,
        source: StoreError,
    },
}

/// What one source object produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectReport {
    pub bucket: String,
    pub key: String,
    pub processed_count: usize,
    pub failed_count: usize,
    pub processed_key: Option<String>,
    pub error_key: Option<String>,
}

/// Reads one source object, partitions its lines, and writes the non-empty
/// partitions to the destination bucket.
///
/// Line and record problems end up in the error artifact. Read, decode,
/// serialization, and write failures are returned; nothing is retried.
///
/// The clock is read once per object: every valid record of the object
/// carries the same `processed_timestamp`, which also dates both output keys.
pub fn process_object(
    notification: &InputNotification,
    config: &HandlerConfig,
    store: &impl ObjectStore,
    clock: &impl Clock,
) -> Result<ObjectReport, ProcessError> {
    let started_at = Instant::now();
    let uri = notification.uri();
    tracing::info!(uri = %uri, "processing file");

    let body = store
        .read_object(&notification.bucket, &notification.key)
        .map_err(|source| ProcessError::Read {
            uri: uri.clone(),
            source,
        })?;
    let content = decode_utf8(&body).map_err(|source| ProcessError::Decode {
        uri: uri.clone(),
        source,
    })?;

    let generated_at = clock.now();
    let processed_timestamp = format_processed_timestamp(generated_at);
    let batch = partition(
        parse_lines(content),
        &config.required_fields,
        &processed_timestamp,
    );
    let keys = ArtifactKeys::derive(config.key_strategy, notification, generated_at);

    let processed_body = batch
        .processed_json()
        .map_err(|source| ProcessError::Serialize {
            uri: uri.clone(),
            artifact: "processed",
            source,
        })?;
    let processed_key = match processed_body {
        Some(body) => {
            store_artifact(store, &config.destination_bucket, &keys.processed, &body)?;
            tracing::info!(
                count = batch.processed.len(),
                destination = %format!("s3://{}/{}", config.destination_bucket, keys.processed),
                "stored processed logs"
            );
            Some(keys.processed)
        }
        None => None,
    };

    let failed_body = batch.failed_json().map_err(|source| ProcessError::Serialize {
        uri: uri.clone(),
        artifact: "error",
        source,
    })?;
    let error_key = match failed_body {
        Some(body) => {
            store_artifact(store, &config.destination_bucket, &keys.errors, &body)?;
            tracing::info!(
                count = batch.failed.len(),
                destination = %format!("s3://{}/{}", config.destination_bucket, keys.errors),
                "stored failed logs"
            );
            Some(keys.errors)
        }
        None => None,
    };

    tracing::info!(
        uri = %uri,
        processed = batch.processed.len(),
        failed = batch.failed.len(),
        duration_ms = started_at.elapsed().as_millis() as u64,
        "file processed"
    );

    Ok(ObjectReport {
        bucket: notification.bucket.clone(),
        key: notification.key.clone(),
        processed_count: batch.processed.len(),
        failed_count: batch.failed.len(),
        processed_key,
        error_key,
    })
}

fn store_artifact(
    store: &impl ObjectStore,
    bucket: &str,
    key: &str,
    body: &[u8],
) -> Result<(), ProcessError> {
    store
        .write_object(bucket, key, body)
        .map_err(|source| ProcessError::Write {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        })
}
