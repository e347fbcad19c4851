pub mod batch;
pub mod log_object;
