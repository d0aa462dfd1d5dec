//! In-memory object store
//!
//! Keeps objects in a process-local map. Used by tests and for running the
//! service without an S3 endpoint.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use futures::stream;
use tracing::debug;

use crate::ingestion::{StorageKey, StoreError};
use crate::ports::{ByteStream, ObjectStore};

const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

/// Object store backed by a shared `HashMap`
///
/// Clones share the same objects. Writes can be switched to fail to exercise
/// the upload pipeline's store-failure path.
#[derive(Debug, Clone)]
pub struct InMemoryObjectStore {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
    fail_writes: Arc<AtomicBool>,
    chunk_size: usize,
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Store whose reads yield chunks of at most `chunk_size` bytes
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            fail_writes: Arc::new(AtomicBool::new(false)),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Make every subsequent `put` fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.read().map(|objects| objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored bytes under `key`, if any
    pub fn object(&self, key: &StorageKey) -> Option<Bytes> {
        self.objects
            .read()
            .ok()?
            .get(key.as_str())
            .map(|object| object.data.clone())
    }

    /// Content type recorded for `key`, if any
    pub fn content_type(&self, key: &StorageKey) -> Option<String> {
        self.objects
            .read()
            .ok()?
            .get(key.as_str())
            .map(|object| object.content_type.clone())
    }

    /// All stored keys
    pub fn keys(&self) -> Vec<StorageKey> {
        self.objects
            .read()
            .map(|objects| objects.keys().cloned().map(StorageKey::from_stored).collect())
            .unwrap_or_default()
    }
}

impl ObjectStore for InMemoryObjectStore {
    async fn put(
        &self,
        key: &StorageKey,
        body: Bytes,
        size_hint: u64,
        content_type: &str,
    ) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::backend(format!(
                "write to '{}' rejected by in-memory store",
                key
            )));
        }

        if body.len() as u64 != size_hint {
            return Err(StoreError::backend(format!(
                "size hint {} does not match body length {} for '{}'",
                size_hint,
                body.len(),
                key
            )));
        }

        let mut objects = self
            .objects
            .write()
            .map_err(|_| StoreError::backend("in-memory store lock poisoned"))?;
        objects.insert(
            key.as_str().to_string(),
            StoredObject {
                data: body,
                content_type: content_type.to_string(),
            },
        );

        debug!(key = %key, size = size_hint, "Stored object in memory");
        Ok(())
    }

    async fn get(&self, key: &StorageKey) -> Result<ByteStream, StoreError> {
        let data = self
            .objects
            .read()
            .map_err(|_| StoreError::backend("in-memory store lock poisoned"))?
            .get(key.as_str())
            .map(|object| object.data.clone())
            .ok_or_else(|| StoreError::not_found(key.as_str()))?;

        let chunk_size = self.chunk_size;
        let chunks: Vec<Result<Bytes, StoreError>> = (0..data.len())
            .step_by(chunk_size)
            .map(|start| Ok(data.slice(start..(start + chunk_size).min(data.len()))))
            .collect();

        Ok(Box::pin(stream::iter(chunks)))
    }
}
