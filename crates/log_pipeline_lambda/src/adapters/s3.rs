use aws_sdk_s3::primitives::ByteStream;

use crate::adapters::object_store::{ObjectStore, StoreError};

const JSON_CONTENT_TYPE: &str = "application/json";

/// [`ObjectStore`] over the S3 API.
///
/// Calls block the current worker thread, so it must run on a multi-threaded
/// tokio runtime.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

impl ObjectStore for S3ObjectStore {
    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let client = self.client.clone();
        let bucket = bucket.to_string();
        let object_key = key.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .get_object()
                    .bucket(&bucket)
                    .key(&object_key)
                    .send()
                    .await
                    .map_err(|error| {
                        let not_found = error
                            .as_service_error()
                            .map(|service_error| service_error.is_no_such_key())
                            .unwrap_or(false);
                        if not_found {
                            StoreError::NotFound {
                                bucket: bucket.clone(),
                                key: object_key.clone(),
                            }
                        } else {
                            StoreError::Backend(format!("failed to read object from s3: {error}"))
                        }
                    })?;

                output
                    .body
                    .collect()
                    .await
                    .map(|data| data.into_bytes().to_vec())
                    .map_err(|error| {
                        StoreError::Backend(format!("failed to stream object body from s3: {error}"))
                    })
            })
        })
    }

    fn write_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError> {
        let client = self.client.clone();
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(object_key)
                    .content_type(JSON_CONTENT_TYPE)
                    .body(ByteStream::from(body_bytes))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        StoreError::Backend(format!("failed to write object to s3: {error}"))
                    })
            })
        })
    }
}
