//! Mapping of domain errors to HTTP responses

use audiolink_domain::IngestionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::dto::audio::ErrorResponse;

/// Domain error on its way out of a handler
#[derive(Debug)]
pub struct ApiError(pub IngestionError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            IngestionError::Validation(_) => StatusCode::BAD_REQUEST,
            IngestionError::UploadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            IngestionError::AudioNotFound(_) => StatusCode::NOT_FOUND,
            IngestionError::Store(_)
            | IngestionError::Extraction(_)
            | IngestionError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<IngestionError> for ApiError {
    fn from(err: IngestionError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.0.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
