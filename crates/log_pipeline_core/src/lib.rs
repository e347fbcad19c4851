//! Shared log pipeline domain primitives.
//!
//! This crate owns the line parser, record validation, partitioning, and
//! output key derivation, plus the trigger-event contract. It intentionally
//! excludes AWS SDK and Lambda runtime concerns.

pub mod clock;
pub mod contract;
pub mod parser;
pub mod partition;
pub mod storage_keys;
pub mod validation;
