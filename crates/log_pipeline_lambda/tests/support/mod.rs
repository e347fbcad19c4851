#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};
use log_pipeline_core::clock::FixedClock;
use log_pipeline_lambda::adapters::object_store::{ObjectStore, StoreError};
use serde_json::{json, Value};

pub const RAW_BUCKET: &str = "raw-logs";
pub const PROCESSED_BUCKET: &str = "processed-logs";

type ObjectId = (String, String);

/// In-memory bucket namespace with switchable read and write failures.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<ObjectId, Vec<u8>>>,
    failing_reads: Mutex<BTreeSet<ObjectId>>,
    failing_write_prefixes: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, bucket: &str, key: &str, body: impl AsRef<[u8]>) {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .insert(id(bucket, key), body.as_ref().to_vec());
    }

    pub fn fail_reads_of(&self, bucket: &str, key: &str) {
        self.failing_reads
            .lock()
            .expect("poisoned mutex")
            .insert(id(bucket, key));
    }

    pub fn fail_writes_under(&self, prefix: &str) {
        self.failing_write_prefixes
            .lock()
            .expect("poisoned mutex")
            .push(prefix.to_string());
    }

    /// Keys present in `bucket`, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .keys()
            .filter(|(object_bucket, _)| object_bucket == bucket)
            .map(|(_, key)| key.clone())
            .collect()
    }

    pub fn body(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .get(&id(bucket, key))
            .cloned()
    }

    pub fn json(&self, bucket: &str, key: &str) -> Value {
        let body = self
            .body(bucket, key)
            .unwrap_or_else(|| panic!("expected object s3://{bucket}/{key}"));
        serde_json::from_slice(&body).expect("stored body should be json")
    }
}

impl ObjectStore for MemoryStore {
    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        if self
            .failing_reads
            .lock()
            .expect("poisoned mutex")
            .contains(&id(bucket, key))
        {
            return Err(StoreError::Backend(format!(
                "simulated read failure for key: {key}"
            )));
        }

        self.body(bucket, key).ok_or_else(|| StoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    fn write_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError> {
        if self
            .failing_write_prefixes
            .lock()
            .expect("poisoned mutex")
            .iter()
            .any(|prefix| key.starts_with(prefix.as_str()))
        {
            return Err(StoreError::Backend(format!(
                "simulated write failure for key: {key}"
            )));
        }

        self.seed(bucket, key, body);
        Ok(())
    }
}

fn id(bucket: &str, key: &str) -> ObjectId {
    (bucket.to_string(), key.to_string())
}

pub fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 2, 14)
        .and_then(|date| date.and_hms_micro_opt(9, 5, 7, 123_456))
        .expect("valid timestamp")
}

pub fn fixed_clock() -> FixedClock {
    FixedClock(fixed_time())
}

pub fn s3_record(bucket: &str, key: &str) -> Value {
    json!({
        "eventVersion": "2.1",
        "eventSource": "aws:s3",
        "awsRegion": "us-east-1",
        "eventName": "ObjectCreated:Put",
        "s3": {
            "s3SchemaVersion": "1.0",
            "bucket": {"name": bucket, "arn": format!("arn:aws:s3:::{bucket}")},
            "object": {"key": key, "size": 128, "eTag": "0123456789abcdef", "sequencer": "0A1B2C3D4E5F678901"}
        }
    })
}

pub fn s3_event(keys: &[&str]) -> Value {
    let records: Vec<Value> = keys.iter().map(|key| s3_record(RAW_BUCKET, key)).collect();
    json!({ "Records": records })
}
