//! S3 Object Store Implementation
//!
//! This module implements the `ObjectStore` trait using AWS S3 as the backend.
//! It handles all S3 operations and converts AWS errors to domain errors.

use audiolink_domain::{
    ingestion::{StorageKey, StoreError},
    ports::{ByteStream, ObjectStore},
};
use aws_sdk_s3::{primitives::ByteStream as S3Body, Client};
use bytes::Bytes;
use futures::stream;
use tracing::{debug, error, info, instrument, warn};

/// S3-based implementation of the ObjectStore port
///
/// This adapter translates domain storage operations into AWS S3 API calls.
/// All objects are stored at the root of the bucket under the keys chosen by
/// the domain (`<uuid>-<file name>`).
///
/// ## Configuration
///
/// The store requires:
/// - An S3 bucket name
/// - An AWS SDK S3 Client (configured with region, credentials, endpoint)
///
/// ## Error Handling
///
/// A missing key on read becomes `StoreError::NotFound`; every other AWS SDK
/// error becomes `StoreError::Backend` with a descriptive message.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Create a new S3 object store
    ///
    /// # Arguments
    ///
    /// * `client` - Configured AWS S3 client
    /// * `bucket` - Name of the S3 bucket to use
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use aws_sdk_s3::Client;
    /// use audiolink_s3::S3ObjectStore;
    ///
    /// # async fn example() {
    /// let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    /// let s3_client = Client::new(&config);
    /// let store = S3ObjectStore::new(s3_client, "audio".to_string());
    /// # }
    /// ```
    pub fn new(client: Client, bucket: String) -> Self {
        info!(bucket = %bucket, "Initializing S3ObjectStore");
        Self { client, bucket }
    }

    /// Create a store from the ambient AWS configuration
    ///
    /// Endpoint, region and credentials come from the standard `AWS_*`
    /// environment variables. Path-style addressing is forced so MinIO
    /// endpoints work.
    pub async fn from_env(bucket: String) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
            .force_path_style(true) // Required for MinIO
            .build();

        Self::new(Client::from_conf(s3_config), bucket)
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Create the bucket if it does not exist yet
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn ensure_bucket(&self) -> Result<(), StoreError> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                debug!("Bucket already exists");
                Ok(())
            }
            Err(err)
                if err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false) =>
            {
                info!("Bucket not found, creating it");
                self.client
                    .create_bucket()
                    .bucket(&self.bucket)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|err| {
                        error!(error = ?err, "Failed to create bucket");
                        StoreError::backend(format!(
                            "S3 create_bucket failed for '{}': {}",
                            self.bucket, err
                        ))
                    })
            }
            Err(err) => {
                error!(error = ?err, "Failed to check bucket");
                Err(StoreError::backend(format!(
                    "S3 head_bucket failed for '{}': {}",
                    self.bucket, err
                )))
            }
        }
    }
}

/// Turn an S3 response body into a domain byte stream
///
/// Chunks are read from the connection only when polled; after a read error
/// the stream ends.
fn into_byte_stream(body: S3Body, key: String) -> ByteStream {
    Box::pin(stream::unfold(Some(body), move |state| {
        let key = key.clone();
        async move {
            let mut body = state?;
            match body.next().await {
                Some(Ok(chunk)) => Some((Ok::<Bytes, StoreError>(chunk), Some(body))),
                Some(Err(err)) => {
                    warn!(key = %key, error = ?err, "Failed to read S3 object body");
                    let err = StoreError::backend(format!(
                        "Failed to read S3 object body for key '{}': {}",
                        key, err
                    ));
                    Some((Err(err), None))
                }
                None => None,
            }
        }
    }))
}

impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self, key, body, content_type), fields(key = %key, bucket = %self.bucket))]
    async fn put(
        &self,
        key: &StorageKey,
        body: Bytes,
        size_hint: u64,
        content_type: &str,
    ) -> Result<(), StoreError> {
        debug!("Saving object to S3");

        let content_length = i64::try_from(size_hint).map_err(|_| {
            StoreError::backend(format!("object size {} is out of range", size_hint))
        })?;

        // PutObject is atomic: the object is either fully visible or absent
        match self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .content_type(content_type)
            .content_length(content_length)
            .body(S3Body::from(body))
            .send()
            .await
        {
            Ok(_) => {
                info!("Successfully saved object to S3");
                Ok(())
            }
            Err(err) => {
                error!(error = ?err, "Failed to save object to S3");
                Err(StoreError::backend(format!(
                    "S3 put_object failed for key '{}': {}",
                    key, err
                )))
            }
        }
    }

    #[instrument(skip(self, key), fields(key = %key, bucket = %self.bucket))]
    async fn get(&self, key: &StorageKey) -> Result<ByteStream, StoreError> {
        debug!("Opening S3 object");

        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .send()
            .await
        {
            Ok(output) => {
                debug!(size = ?output.content_length(), "Opened S3 object stream");
                Ok(into_byte_stream(output.body, key.as_str().to_string()))
            }
            Err(err)
                if err
                    .as_service_error()
                    .map(|e| e.is_no_such_key())
                    .unwrap_or(false) =>
            {
                warn!("S3 object not found");
                Err(StoreError::not_found(key.as_str()))
            }
            Err(err) => {
                error!(error = ?err, "Failed to open S3 object");
                Err(StoreError::backend(format!(
                    "S3 get_object failed for key '{}': {}",
                    key, err
                )))
            }
        }
    }
}
