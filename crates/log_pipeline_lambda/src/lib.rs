//! AWS-oriented adapters and handlers for the log pipeline.
//!
//! This crate owns runtime integration details (the Lambda entry point,
//! S3 storage adapter, environment configuration, and log output) and drives
//! the domain primitives from `log_pipeline_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod logging;
