//! # AudioLink Domain Layer
//!
//! This crate contains the pure business logic and domain models for the AudioLink
//! audio ingestion service. It follows hexagonal architecture principles:
//!
//! - **Entities**: Core domain models (AudioRecord, AudioListing)
//! - **Ports**: Trait definitions for external dependencies (ObjectStore, AudioRepository,
//!   DurationExtractor)
//! - **Services**: Upload pipeline and read paths orchestration
//!
//! ## Architecture
//!
//! This layer has NO dependencies on infrastructure concerns (AWS, S3, SQL, HTTP, etc.).
//! All external dependencies are expressed as traits (ports) that are implemented
//! by adapter crates.
//!
//! ## Example
//!
//! ```rust
//! use audiolink_domain::ingestion::{AudioUpload, IngestionService};
//! use audiolink_domain::ports::{AudioRepository, DurationExtractor, ObjectStore};
//!
//! async fn example<S, R, E>(service: IngestionService<S, R, E>)
//! where
//!     S: ObjectStore,
//!     R: AudioRepository,
//!     E: DurationExtractor,
//! {
//!     let upload = AudioUpload::new("song.mp3", Some("audio/mpeg".into()), vec![0u8; 4].into());
//!     match service.upload(upload).await {
//!         Ok(id) => println!("Stored audio {}", id),
//!         Err(aborted) => println!("Upload aborted: {}", aborted),
//!     }
//! }
//! ```

pub mod ingestion;
pub mod ports;
pub mod storage;

// Re-export commonly used types
pub use ingestion::{
    AudioId, AudioListing, AudioRecord, AudioUpload, IngestionError, IngestionService, Page,
    PageRequest, StorageKey, StoreError, UploadAborted,
};
pub use ports::{AudioRepository, AudioServicePort, ByteStream, DurationExtractor, ObjectStore};
pub use storage::{AudioStream, InMemoryObjectStore};
