//! AudioLink API
//!
//! HTTP surface for uploading MP3 files, listing them and streaming them back.
//! The binary in `main.rs` wires the adapters; this library holds the router
//! so it can be driven in tests.

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod store;

use std::sync::Arc;

use audiolink_domain::IngestionService;
use audiolink_media::Mp3DurationExtractor;
use audiolink_sqlite::SqliteAudioRepository;

use crate::store::AudioObjectStore;

/// Ingestion service as wired by this application
pub type AudioService =
    IngestionService<AudioObjectStore, SqliteAudioRepository, Mp3DurationExtractor>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub audio_service: Arc<AudioService>,
}

impl AppState {
    pub fn new(audio_service: AudioService) -> Self {
        Self {
            audio_service: Arc::new(audio_service),
        }
    }
}
