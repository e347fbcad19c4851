#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("object s3://{bucket}/{key} does not exist")]
    NotFound { bucket: String, key: String },

    #[error("{0}")]
    Backend(String),
}

/// Whole-object reads and writes against a bucket/key namespace.
///
/// Writes overwrite any existing object at the key.
pub trait ObjectStore {
    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;

    fn write_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        (**self).read_object(bucket, key)
    }

    fn write_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError> {
        (**self).write_object(bucket, key, body)
    }
}
