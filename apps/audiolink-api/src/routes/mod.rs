//! API routes

pub mod audio;

use axum::{extract::DefaultBodyLimit, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    dto::audio::{
        AudioListingDto, AudioPageResponse, ErrorResponse, UploadForm, UploadResponse,
    },
    handlers, AppState,
};

/// Room for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::audio::upload_handler,
        handlers::audio::list_handler,
        handlers::audio::stream_handler,
        health_handler
    ),
    components(
        schemas(UploadForm, UploadResponse, AudioListingDto, AudioPageResponse, ErrorResponse)
    ),
    tags(
        (name = "audio", description = "Audio upload, listing and streaming endpoints"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "AudioLink API",
        version = "0.1.0",
        description = "Upload MP3 files to object storage and stream them back",
        contact(
            name = "AudioLink Team"
        )
    )
)]
pub struct ApiDoc;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let body_limit = state
        .audio_service
        .config()
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(audio::routes())
        .route("/health", axum::routing::get(health_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    ),
    tag = "health"
)]
async fn health_handler() -> &'static str {
    "OK"
}
