//! Ports (trait definitions) for external dependencies
//!
//! This module defines the contracts (ports) that external adapters must implement.
//! Following hexagonal architecture, the domain defines what it needs, and the
//! infrastructure provides implementations.
//!
//! ## Static Dispatch
//!
//! We use native Rust async traits with `impl Future` return types instead of
//! `async_trait` to ensure zero-cost abstractions and static dispatch.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;

use crate::ingestion::{
    AudioId, AudioListing, AudioRecord, IngestionError, NewAudioRecord, Page, PageRequest,
    StorageKey, StoreError,
};

pub use crate::ingestion::ports::AudioServicePort;

/// Lazily-read object body
///
/// Chunks are pulled from the backend as the consumer polls. Dropping the
/// stream releases the underlying backend read.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StoreError>> + Send>>;

/// Port for object storage operations
///
/// This trait abstracts away the blob backend (S3, MinIO, in-memory, etc.).
/// Implementations must handle:
/// - Writing bytes under a caller-chosen key, all or nothing
/// - Streaming bytes back without buffering whole objects
/// - Converting infrastructure errors to [`StoreError`]
pub trait ObjectStore: Send + Sync {
    /// Durably write `body` under `key`
    ///
    /// # Arguments
    ///
    /// * `key` - Storage key, already unique
    /// * `body` - The raw bytes to store
    /// * `size_hint` - Declared byte length of `body`
    /// * `content_type` - MIME type recorded on the object
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` on any failure. An uncertain outcome is a
    /// failure: callers never see a partial object reported as written.
    fn put(
        &self,
        key: &StorageKey,
        body: Bytes,
        size_hint: u64,
        content_type: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Open a lazily-read stream over the object under `key`
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if no object exists under `key`
    /// - `StoreError::Backend` if the read cannot be started
    fn get(&self, key: &StorageKey) -> impl Future<Output = Result<ByteStream, StoreError>> + Send;
}

/// Port for audio metadata persistence
///
/// The repository is the only writer of [`AudioRecord`]s.
pub trait AudioRepository: Send + Sync {
    /// Persist a new record in a single transaction and return its id
    ///
    /// Must only be called once the record's bytes are in the object store.
    fn create(
        &self,
        record: NewAudioRecord,
    ) -> impl Future<Output = Result<AudioId, IngestionError>> + Send;

    /// Listing projections ordered by ascending id, with the total count
    fn page(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Page<AudioListing>, IngestionError>> + Send;

    /// Full record for `id`, `None` when no record matches
    fn lookup(
        &self,
        id: AudioId,
    ) -> impl Future<Output = Result<Option<AudioRecord>, IngestionError>> + Send;
}

/// Port for computing playback length from audio container framing
pub trait DurationExtractor: Send + Sync {
    /// Playback length of `data` in whole seconds
    ///
    /// # Errors
    ///
    /// Returns `IngestionError::Extraction` if the bytes are not a valid
    /// sequence of audio frames.
    fn extract_seconds(&self, data: Bytes)
        -> impl Future<Output = Result<u64, IngestionError>> + Send;
}
