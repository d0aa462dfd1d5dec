//! Object store selected at start-up

use audiolink_domain::{
    ingestion::{StorageKey, StoreError},
    ports::{ByteStream, ObjectStore},
    InMemoryObjectStore,
};
use audiolink_s3::S3ObjectStore;
use bytes::Bytes;

/// The object store backend the service runs against
#[derive(Clone)]
pub enum AudioObjectStore {
    S3(S3ObjectStore),
    /// Process-local store for development and tests
    Memory(InMemoryObjectStore),
}

impl ObjectStore for AudioObjectStore {
    async fn put(
        &self,
        key: &StorageKey,
        body: Bytes,
        size_hint: u64,
        content_type: &str,
    ) -> Result<(), StoreError> {
        match self {
            Self::S3(store) => store.put(key, body, size_hint, content_type).await,
            Self::Memory(store) => store.put(key, body, size_hint, content_type).await,
        }
    }

    async fn get(&self, key: &StorageKey) -> Result<ByteStream, StoreError> {
        match self {
            Self::S3(store) => store.get(key).await,
            Self::Memory(store) => store.get(key).await,
        }
    }
}
