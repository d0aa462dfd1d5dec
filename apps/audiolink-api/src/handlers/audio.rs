//! Audio handlers

use audiolink_domain::{ingestion::DEFAULT_PAGE_SIZE, AudioId, AudioUpload, PageRequest};
use axum::{
    body::Body,
    extract::{multipart::Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use crate::{
    dto::audio::{AudioPageResponse, ErrorResponse, ListParams, UploadForm, UploadResponse},
    error::ApiError,
    AppState,
};

/// Name of the multipart field carrying the file
const FILE_FIELD: &str = "file";

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Pull the single file field out of a multipart body
async fn read_upload(multipart: &mut Multipart) -> Result<AudioUpload, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Missing '{}' field", FILE_FIELD),
                ))
            }
            Err(err) => {
                warn!(error = %err, "Malformed multipart body");
                return Err(error_response(err.status(), err.body_text()));
            }
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|err| {
            warn!(error = %err, "Failed to read uploaded file");
            error_response(err.status(), err.body_text())
        })?;

        return Ok(AudioUpload::new(file_name, content_type, data));
    }
}

/// Upload an MP3 file
#[utoipa::path(
    post,
    path = "/audio/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Audio uploaded successfully", body = UploadResponse,
            headers(("Location" = String, description = "Path of the new audio record"))),
        (status = 400, description = "Bad request - not an MP3 file or malformed form", body = ErrorResponse),
        (status = 413, description = "Payload too large", body = ErrorResponse),
        (status = 500, description = "Storage, extraction or metadata failure", body = ErrorResponse)
    ),
    tag = "audio"
)]
pub async fn upload_handler(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let upload = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };
    info!(file_name = %upload.file_name(), size = upload.size(), "Received upload request");

    match state.audio_service.upload(upload).await {
        Ok(id) => (
            StatusCode::CREATED,
            [(header::LOCATION, format!("/audio/{}", id))],
            Json(UploadResponse {
                id: id.value(),
                message: "Audio uploaded successfully".to_string(),
            }),
        )
            .into_response(),
        Err(aborted) => ApiError(aborted.reason).into_response(),
    }
}

/// List uploaded audio, ordered by id
#[utoipa::path(
    get,
    path = "/audio/list",
    params(ListParams),
    responses(
        (status = 200, description = "One page of audio listings", body = AudioPageResponse),
        (status = 500, description = "Metadata failure", body = ErrorResponse)
    ),
    tag = "audio"
)]
pub async fn list_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<AudioPageResponse>, ApiError> {
    let request = PageRequest::new(
        params.page.unwrap_or(0),
        params.size.unwrap_or(DEFAULT_PAGE_SIZE),
    );

    let page = state.audio_service.list(request).await?;
    Ok(Json(AudioPageResponse::from(page)))
}

/// Stream the bytes of an uploaded audio file
#[utoipa::path(
    get,
    path = "/audio/stream/{id}",
    params(("id" = i64, Path, description = "Audio record id")),
    responses(
        (status = 200, description = "Raw audio bytes", content_type = "audio/mpeg", body = Vec<u8>),
        (status = 404, description = "No audio with this id", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "audio"
)]
pub async fn stream_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let stream = state.audio_service.stream(AudioId::new(id)).await?;
    info!(id, content_length = stream.content_length, "Streaming audio");

    Ok((
        [
            (header::CONTENT_TYPE, stream.content_type),
            (header::CONTENT_LENGTH, stream.content_length.to_string()),
        ],
        Body::from_stream(stream.body),
    )
        .into_response())
}
