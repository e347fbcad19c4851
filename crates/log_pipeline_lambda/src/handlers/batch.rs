use log_pipeline_core::clock::{Clock, SystemClock};
use log_pipeline_core::contract::{
    decode_notifications, EventError, InputNotification, SuccessEnvelope,
};
use serde_json::Value;

use crate::adapters::object_store::ObjectStore;
use crate::config::HandlerConfig;
use crate::handlers::log_object::{process_object, ObjectReport, ProcessError};

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("invalid trigger event: {0}")]
    InvalidEvent(#[from] EventError),

    #[error("error processing s3://{bucket}/{key}: {source}")]
    Object {
        bucket: String,
        key: String,
        source: ProcessError,
    },
}

/// Runs every notification of one invocation, in order.
///
/// The first object-level failure stops the batch and is returned, so the
/// trigger can retry or dead-letter the whole invocation. Artifacts written
/// for earlier notifications stay in place.
pub struct LogProcessor<S, C = SystemClock> {
    config: HandlerConfig,
    store: S,
    clock: C,
}

impl<S: ObjectStore, C: Clock> LogProcessor<S, C> {
    pub fn new(config: HandlerConfig, store: S, clock: C) -> Self {
        Self {
            config,
            store,
            clock,
        }
    }

    pub fn handle_event(&self, event: &Value) -> Result<SuccessEnvelope, BatchError> {
        tracing::debug!(event = %event, "received event");
        let notifications = decode_notifications(event).map_err(|error| {
            tracing::error!(%error, "rejecting malformed trigger event");
            BatchError::from(error)
        })?;
        self.process_notifications(&notifications)?;
        Ok(SuccessEnvelope::completed())
    }

    pub fn process_notifications(
        &self,
        notifications: &[InputNotification],
    ) -> Result<Vec<ObjectReport>, BatchError> {
        tracing::info!(
            notifications = notifications.len(),
            destination_bucket = %self.config.destination_bucket,
            "received log batch"
        );

        let mut reports = Vec::with_capacity(notifications.len());
        for notification in notifications {
            let report = process_object(notification, &self.config, &self.store, &self.clock)
                .map_err(|source| {
                    tracing::error!(
                        bucket = %notification.bucket,
                        key = %notification.key,
                        error = %source,
                        "error processing object"
                    );
                    BatchError::Object {
                        bucket: notification.bucket.clone(),
                        key: notification.key.clone(),
                        source,
                    }
                })?;
            reports.push(report);
        }

        Ok(reports)
    }
}
