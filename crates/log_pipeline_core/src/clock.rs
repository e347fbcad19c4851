use chrono::{Local, NaiveDateTime};

/// Format used for the `processed_timestamp` field stamped onto valid records.
pub const PROCESSED_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Second-precision stamp embedded in output object keys.
pub const KEY_STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Wall-clock source. Timestamps are naive: whatever local time the
/// environment provides (UTC on Lambda).
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub fn format_processed_timestamp(at: NaiveDateTime) -> String {
    at.format(PROCESSED_TIMESTAMP_FORMAT).to_string()
}

pub fn format_key_stamp(at: NaiveDateTime) -> String {
    at.format(KEY_STAMP_FORMAT).to_string()
}
