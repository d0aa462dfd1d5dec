//! Ingestion domain module
//!
//! This module contains the core business logic and entities for audio ingestion.
//! It defines what an audio record is and how an upload flows through the pipeline.

pub mod entity;
pub mod error;
pub mod ids;
pub mod ports;
pub mod service;
pub mod upload;
pub mod validator;

pub use entity::{
    AudioListing, AudioRecord, NewAudioRecord, Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use error::{IngestionError, Result, StoreError, UploadAborted};
pub use ids::{AudioId, StorageKey};
pub use service::{IngestionConfig, IngestionService};
pub use upload::{AudioUpload, UploadStage};
pub use validator::ACCEPTED_CONTENT_TYPE;
