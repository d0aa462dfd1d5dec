//! Port trait for the Ingestion Service
//!
//! This module defines the trait that abstracts the ingestion service operations.
//! The concrete `IngestionService` in `service.rs` provides the implementation.

use std::future::Future;

use crate::ingestion::{
    AudioId, AudioListing, AudioUpload, IngestionError, Page, PageRequest, UploadAborted,
};
use crate::storage::AudioStream;

/// Port trait for audio ingestion and playback operations
pub trait AudioServicePort: Send + Sync {
    /// Run the upload pipeline and return the id of the new record
    ///
    /// # Errors
    ///
    /// Returns `UploadAborted` carrying the stage reached and the reason:
    /// validation, store, extraction or repository failure.
    fn upload(
        &self,
        upload: AudioUpload,
    ) -> impl Future<Output = Result<AudioId, UploadAborted>> + Send;

    /// One page of listing projections
    fn list(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Page<AudioListing>, IngestionError>> + Send;

    /// Open the stored bytes of a record for streaming
    ///
    /// # Errors
    ///
    /// - `IngestionError::AudioNotFound` if no record matches `id`
    /// - `IngestionError::Store` if the object cannot be opened
    fn stream(&self, id: AudioId)
        -> impl Future<Output = Result<AudioStream, IngestionError>> + Send;
}
