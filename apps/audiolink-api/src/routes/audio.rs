//! Audio routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    handlers::audio::{list_handler, stream_handler, upload_handler},
    AppState,
};

/// Create audio routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/audio/upload", post(upload_handler))
        .route("/audio/list", get(list_handler))
        .route("/audio/stream/:id", get(stream_handler))
}
