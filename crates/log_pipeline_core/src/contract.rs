use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SUCCESS_MESSAGE: &str = "Log processing completed!";
pub const SQS_EVENT_SOURCE: &str = "aws:sqs";
pub const S3_TEST_EVENT: &str = "s3:TestEvent";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct S3Event {
    #[serde(rename = "Records")]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct S3EventRecord {
    #[serde(rename = "eventSource", default)]
    pub event_source: Option<String>,
    #[serde(rename = "eventName", default)]
    pub event_name: Option<String>,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct S3Object {
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(rename = "eTag", default)]
    pub e_tag: Option<String>,
    #[serde(rename = "versionId", default)]
    pub version_id: Option<String>,
    #[serde(default)]
    pub sequencer: Option<String>,
}

/// One source object to process, with its key already URL-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputNotification {
    pub bucket: String,
    pub key: String,
    /// Best available identity of the object version: `versionId`, then
    /// `eTag`, then `sequencer`.
    pub version_marker: Option<String>,
}

impl InputNotification {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            version_marker: None,
        }
    }

    pub fn uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }

    fn from_record(record: S3EventRecord) -> Result<Self, EventError> {
        let S3Entity { bucket, object } = record.s3;
        let key = decode_object_key(&object.key)?;
        Ok(Self {
            bucket: bucket.name,
            key,
            version_marker: object.version_id.or(object.e_tag).or(object.sequencer),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuccessEnvelope {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl SuccessEnvelope {
    /// The body carries the JSON encoding of the message, quotes included.
    pub fn completed() -> Self {
        Self {
            status_code: 200,
            body: Value::from(SUCCESS_MESSAGE).to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("trigger event must include a Records array")]
    MissingRecords,

    #[error("malformed S3 notification record: {0}")]
    MalformedRecord(#[source] serde_json::Error),

    #[error("SQS record {index} body must be a string")]
    SqsBodyNotString { index: usize },

    #[error("SQS record {index} body is not an S3 event: {source}")]
    MalformedSqsBody {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("object key {key:?} is not valid URL-encoded UTF-8")]
    KeyEncoding {
        key: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// S3 notification keys arrive form-encoded: `+` for space, `%XX` escapes.
pub fn decode_object_key(raw: &str) -> Result<String, EventError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|source| EventError::KeyEncoding {
            key: raw.to_string(),
            source,
        })
}

pub fn is_sqs_event(event: &Value) -> bool {
    event
        .get("Records")
        .and_then(Value::as_array)
        .map(|records| {
            !records.is_empty()
                && records.iter().all(|record| {
                    record
                        .get("eventSource")
                        .and_then(Value::as_str)
                        .map(|source| source == SQS_EVENT_SOURCE)
                        .unwrap_or(false)
                })
        })
        .unwrap_or(false)
}

/// Flattens a trigger event into notifications, in delivery order.
///
/// Accepts a direct S3 notification or an SQS batch whose bodies are S3
/// notifications.
pub fn decode_notifications(event: &Value) -> Result<Vec<InputNotification>, EventError> {
    let records = event
        .get("Records")
        .and_then(Value::as_array)
        .ok_or(EventError::MissingRecords)?;

    if !is_sqs_event(event) {
        let parsed: S3Event =
            serde_json::from_value(event.clone()).map_err(EventError::MalformedRecord)?;
        return parsed
            .records
            .into_iter()
            .map(InputNotification::from_record)
            .collect();
    }

    let mut notifications = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let body = record
            .get("body")
            .and_then(Value::as_str)
            .ok_or(EventError::SqsBodyNotString { index })?;
        let body: Value = serde_json::from_str(body)
            .map_err(|source| EventError::MalformedSqsBody { index, source })?;

        if is_test_event(&body) {
            tracing::info!(sqs_record = index, "skipping S3 test event");
            continue;
        }

        let parsed: S3Event = serde_json::from_value(body)
            .map_err(|source| EventError::MalformedSqsBody { index, source })?;
        for s3_record in parsed.records {
            notifications.push(InputNotification::from_record(s3_record)?);
        }
    }

    Ok(notifications)
}

fn is_test_event(body: &Value) -> bool {
    body.get("Records").is_none()
        && body.get("Event").and_then(Value::as_str) == Some(S3_TEST_EVENT)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn s3_record(bucket: &str, key: &str) -> Value {
        json!({
            "eventSource": "aws:s3",
            "eventName": "ObjectCreated:Put",
            "s3": {
                "bucket": {"name": bucket},
                "object": {"key": key, "size": 42, "eTag": "abc123", "sequencer": "0A1B"}
            }
        })
    }

    #[test]
    fn decodes_direct_s3_notifications_in_order() {
        let event = json!({
            "Records": [s3_record("raw-logs", "app/a.log"), s3_record("raw-logs", "app/b.log")]
        });

        let notifications = decode_notifications(&event).expect("event should decode");
        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications[0].bucket, "raw-logs");
        assert_eq!(notifications[0].key, "app/a.log");
        assert_eq!(notifications[1].key, "app/b.log");
        assert_eq!(notifications[0].version_marker.as_deref(), Some("abc123"));
    }

    #[test]
    fn prefers_version_id_over_etag() {
        let event = json!({
            "Records": [{
                "s3": {
                    "bucket": {"name": "raw-logs"},
                    "object": {"key": "a.log", "eTag": "etag", "versionId": "v2"}
                }
            }]
        });

        let notifications = decode_notifications(&event).expect("event should decode");
        assert_eq!(notifications[0].version_marker.as_deref(), Some("v2"));
    }

    #[test]
    fn url_decodes_object_keys() {
        let event = json!({"Records": [s3_record("raw-logs", "daily+logs/app%3D1.log")]});

        let notifications = decode_notifications(&event).expect("event should decode");
        assert_eq!(notifications[0].key, "daily logs/app=1.log");
    }

    #[test]
    fn accepts_empty_records() {
        let notifications =
            decode_notifications(&json!({"Records": []})).expect("event should decode");
        assert!(notifications.is_empty());
    }

    #[test]
    fn rejects_event_without_records() {
        let error = decode_notifications(&json!({"detail": {}})).expect_err("should fail");
        assert!(matches!(error, EventError::MissingRecords));
    }

    #[test]
    fn rejects_record_without_bucket() {
        let event = json!({"Records": [{"s3": {"object": {"key": "a.log"}}}]});
        let error = decode_notifications(&event).expect_err("should fail");
        assert!(matches!(error, EventError::MalformedRecord(_)));
    }

    #[test]
    fn unwraps_s3_notifications_delivered_through_sqs() {
        let body = json!({"Records": [s3_record("raw-logs", "queued.log")]}).to_string();
        let test_event = json!({
            "Service": "Amazon S3",
            "Event": "s3:TestEvent",
            "Bucket": "raw-logs"
        })
        .to_string();
        let event = json!({
            "Records": [
                {"eventSource": "aws:sqs", "body": test_event},
                {"eventSource": "aws:sqs", "body": body}
            ]
        });

        assert!(is_sqs_event(&event));
        let notifications = decode_notifications(&event).expect("event should decode");
        assert_eq!(notifications, vec![InputNotification {
            bucket: "raw-logs".to_string(),
            key: "queued.log".to_string(),
            version_marker: Some("abc123".to_string()),
        }]);
    }

    #[test]
    fn rejects_sqs_record_without_body_string() {
        let event = json!({"Records": [{"eventSource": "aws:sqs", "body": 42}]});
        let error = decode_notifications(&event).expect_err("should fail");
        assert!(error.to_string().contains("SQS record 0 body must be a string"));
    }

    #[test]
    fn rejects_sqs_body_that_is_not_json() {
        let event = json!({"Records": [{"eventSource": "aws:sqs", "body": "not json"}]});
        let error = decode_notifications(&event).expect_err("should fail");
        assert!(matches!(error, EventError::MalformedSqsBody { index: 0, .. }));
    }

    #[test]
    fn rejects_sqs_body_that_is_not_an_s3_event() {
        let event = json!({
            "Records": [
                {"eventSource": "aws:sqs", "body": json!({"Records": [s3_record("raw-logs", "a.log")]}).to_string()},
                {"eventSource": "aws:sqs", "body": "{\"foo\":1}"}
            ]
        });
        let error = decode_notifications(&event).expect_err("should fail");
        assert!(matches!(error, EventError::MalformedSqsBody { index: 1, .. }));
    }

    #[test]
    fn rejects_keys_that_do_not_decode_to_utf8() {
        let error = decode_object_key("a%FF.log").expect_err("should fail");
        assert!(matches!(error, EventError::KeyEncoding { ref key, .. } if key == "a%FF.log"));

        let event = json!({"Records": [s3_record("raw-logs", "a%FF.log")]});
        let error = decode_notifications(&event).expect_err("should fail");
        assert_eq!(
            error.to_string(),
            "object key \"a%FF.log\" is not valid URL-encoded UTF-8"
        );
    }

    #[test]
    fn leaves_incomplete_escapes_untouched() {
        assert_eq!(decode_object_key("100%.log").expect("should decode"), "100%.log");
    }

    #[test]
    fn mixed_sources_are_not_treated_as_sqs() {
        let event = json!({
            "Records": [
                {"eventSource": "aws:sqs", "body": "{}"},
                s3_record("raw-logs", "a.log")
            ]
        });
        assert!(!is_sqs_event(&event));
    }

    #[test]
    fn success_envelope_body_is_json_encoded_message() {
        let envelope = SuccessEnvelope::completed();
        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.body, "\"Log processing completed!\"");

        let wire = serde_json::to_value(&envelope).expect("envelope should serialize");
        assert_eq!(wire["statusCode"], 200);
    }
}
