//! DTOs for audio endpoints

use audiolink_domain::{AudioListing, Page};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Multipart form accepted by the upload endpoint
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// MP3 file (`audio/mpeg`)
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Response body for a successful upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Identifier of the new audio record
    #[schema(example = 1)]
    pub id: i64,
    /// Success message
    #[schema(example = "Audio uploaded successfully")]
    pub message: String,
}

/// Pagination query of the list endpoint
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Zero-based page number (default 0)
    pub page: Option<u32>,
    /// Page size (default 20, at most 100)
    pub size: Option<u32>,
}

/// One entry of the audio listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AudioListingDto {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "song.mp3")]
    pub file_name: String,
    #[schema(example = 5)]
    pub duration_seconds: u64,
}

impl From<AudioListing> for AudioListingDto {
    fn from(listing: AudioListing) -> Self {
        Self {
            id: listing.id.value(),
            file_name: listing.file_name,
            duration_seconds: listing.duration_seconds,
        }
    }
}

/// A page of audio listings with pagination metadata
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AudioPageResponse {
    pub items: Vec<AudioListingDto>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl From<Page<AudioListing>> for AudioPageResponse {
    fn from(page: Page<AudioListing>) -> Self {
        let total_pages = page.total_pages();
        Self {
            items: page.items.into_iter().map(AudioListingDto::from).collect(),
            page: page.page,
            size: page.size,
            total: page.total,
            total_pages,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error description
    #[schema(example = "Only MP3 files are allowed (got 'text/plain')")]
    pub error: String,
}
