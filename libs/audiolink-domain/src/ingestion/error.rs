//! Domain errors for ingestion operations
//!
//! This module defines all possible errors that can occur while ingesting or
//! reading back audio. These are domain-level errors that abstract away
//! infrastructure details: adapters convert their native errors at the port
//! boundary.

use thiserror::Error;

use crate::ingestion::ids::{AudioId, StorageKey};
use crate::ingestion::upload::UploadStage;

/// Errors raised by the object store port
#[derive(Error, Debug)]
pub enum StoreError {
    /// No object exists under the requested key
    #[error("Object '{key}' not found in store")]
    NotFound { key: String },

    /// Transport or backend failure; the write or read did not complete
    #[error("Object store failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Errors that can occur during audio ingestion and retrieval
///
/// These errors represent business-level failures and are independent of
/// infrastructure implementation details (e.g., no AWS SDK or sqlx types here).
#[derive(Error, Debug)]
pub enum IngestionError {
    /// The declared upload was refused before any side effect
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The upload is larger than the configured ceiling
    #[error("Upload size ({size} bytes) exceeds maximum allowed ({max} bytes)")]
    UploadTooLarge { size: u64, max: u64 },

    /// Object store read or write failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The payload could not be parsed as a sequence of audio frames
    #[error("Duration extraction failed: {0}")]
    Extraction(String),

    /// The metadata datastore failed
    #[error("Metadata repository failure: {0}")]
    Repository(String),

    /// No record matches the requested id
    #[error("Audio {0} not found")]
    AudioNotFound(AudioId),
}

impl IngestionError {
    /// Create a validation error with a human readable reason
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an upload too large error
    pub fn upload_too_large(size: u64, max: u64) -> Self {
        Self::UploadTooLarge { size, max }
    }

    /// Create an extraction error with a message
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    /// Create a repository error with a message
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Short stable tag naming the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::UploadTooLarge { .. } => "validation",
            Self::Store(_) => "store",
            Self::Extraction(_) => "extraction",
            Self::Repository(_) => "repository",
            Self::AudioNotFound(_) => "not_found",
        }
    }

    /// Whether the failure was caused by the client rather than a backend
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::UploadTooLarge { .. } | Self::AudioNotFound(_)
        )
    }

    /// Description safe to show to API consumers
    ///
    /// Backend failures collapse to a fixed sentence so connection strings,
    /// bucket names or driver messages never cross the service boundary.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::UploadTooLarge { .. } => self.to_string(),
            Self::Store(_) => "Audio storage is unavailable".to_string(),
            Self::Extraction(_) => "Could not read the duration of the audio file".to_string(),
            Self::Repository(_) => "Could not access audio metadata".to_string(),
            Self::AudioNotFound(id) => format!("Audio {} not found", id),
        }
    }
}

/// Terminal failure state of the upload pipeline
///
/// Carries the last stage the upload reached and the error that stopped it.
/// When the abort happened after the object-store write, `orphaned_key` names
/// the object left behind without a metadata record.
#[derive(Error, Debug)]
#[error("Upload aborted after stage {stage}: {reason}")]
pub struct UploadAborted {
    pub stage: UploadStage,
    #[source]
    pub reason: IngestionError,
    pub orphaned_key: Option<StorageKey>,
}

impl UploadAborted {
    pub fn new(stage: UploadStage, reason: IngestionError) -> Self {
        Self {
            stage,
            reason,
            orphaned_key: None,
        }
    }

    /// Abort after the bytes were written under `key`
    pub fn with_orphan(stage: UploadStage, reason: IngestionError, key: StorageKey) -> Self {
        Self {
            stage,
            reason,
            orphaned_key: Some(key),
        }
    }
}

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestionError>;
