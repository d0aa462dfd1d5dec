//! End-to-end tests of the HTTP surface against in-memory backends

use audiolink_api::{
    dto::audio::{AudioPageResponse, ErrorResponse, UploadResponse},
    routes::create_router,
    store::AudioObjectStore,
    AppState,
};
use audiolink_domain::{InMemoryObjectStore, IngestionService};
use audiolink_media::Mp3DurationExtractor;
use audiolink_sqlite::{connect_in_memory, init_schema, SqliteAudioRepository};
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "audiolink-test-boundary";

// MPEG-1 Layer III, 128 kbit/s, 48 kHz, mono: 24 ms per 384-byte frame.
const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x94, 0xC0];
const FRAME_LEN: usize = 384;

fn mp3_frames(count: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(count * FRAME_LEN);
    for _ in 0..count {
        data.extend_from_slice(&FRAME_HEADER);
        data.resize(data.len() + FRAME_LEN - FRAME_HEADER.len(), 0);
    }
    data
}

struct TestApp {
    router: Router,
    store: InMemoryObjectStore,
    temp_dir: TempDir,
}

async fn test_app() -> TestApp {
    let pool = connect_in_memory().await.unwrap();
    init_schema(&pool).await.unwrap();

    let store = InMemoryObjectStore::with_chunk_size(1024);
    let temp_dir = tempfile::tempdir().unwrap();
    let service = IngestionService::with_defaults(
        AudioObjectStore::Memory(store.clone()),
        SqliteAudioRepository::new(pool),
        Mp3DurationExtractor::with_temp_dir(temp_dir.path()),
    );

    TestApp {
        router: create_router(AppState::new(service)),
        store,
        temp_dir,
    }
}

fn multipart_request(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/audio/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn json<T: DeserializeOwned>(response: Response<Body>) -> T {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

async fn list(app: &TestApp, query: &str) -> AudioPageResponse {
    let response = send(app, get(&format!("/audio/list{query}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    json(response).await
}

#[tokio::test]
async fn test_upload_list_and_stream() {
    let app = test_app().await;
    let data = mp3_frames(208);

    let response = send(&app, multipart_request("file", "song.mp3", "audio/mpeg", &data)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()[header::LOCATION], "/audio/1");
    let created: UploadResponse = json(response).await;
    assert_eq!(created.id, 1);
    assert_eq!(created.message, "Audio uploaded successfully");

    let page = list(&app, "?page=0&size=10").await;
    assert_eq!(page.total, 1);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, 1);
    assert_eq!(page.items[0].file_name, "song.mp3");
    assert_eq!(page.items[0].duration_seconds, 5);

    let response = send(&app, get("/audio/stream/1")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(
        response.headers()[header::CONTENT_LENGTH],
        data.len().to_string().as_str()
    );
    assert_eq!(body_bytes(response).await, data);

    assert_eq!(std::fs::read_dir(app.temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_list_uses_camel_case_fields() {
    let app = test_app().await;
    send(&app, multipart_request("file", "song.mp3", "audio/mpeg", &mp3_frames(42))).await;

    let response = send(&app, get("/audio/list")).await;
    let value: serde_json::Value = json(response).await;

    assert_eq!(value["items"][0]["fileName"], "song.mp3");
    assert_eq!(value["items"][0]["durationSeconds"], 1);
    assert_eq!(value["totalPages"], 1);
    assert_eq!(value["size"], 20);
}

#[tokio::test]
async fn test_rejects_non_mp3_without_side_effects() {
    let app = test_app().await;

    let response = send(&app, multipart_request("file", "notes.txt", "text/plain", b"hello")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = json(response).await;
    assert!(error.error.contains("text/plain"));

    assert!(app.store.is_empty());
    let page = list(&app, "").await;
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_missing_file_field() {
    let app = test_app().await;

    let response = send(&app, multipart_request("audio", "song.mp3", "audio/mpeg", &mp3_frames(42))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_store_failure_leaves_no_record() {
    let app = test_app().await;
    app.store.set_fail_writes(true);

    let response = send(&app, multipart_request("file", "song.mp3", "audio/mpeg", &mp3_frames(42))).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = json(response).await;
    assert_eq!(error.error, "Audio storage is unavailable");

    assert_eq!(list(&app, "").await.total, 0);
}

#[tokio::test]
async fn test_undecodable_mp3_is_not_recorded() {
    let app = test_app().await;

    let response = send(
        &app,
        multipart_request("file", "broken.mp3", "audio/mpeg", b"definitely not an mp3 stream"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(list(&app, "").await.total, 0);
    // The object was written before extraction failed
    assert_eq!(app.store.len(), 1);
    assert_eq!(std::fs::read_dir(app.temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_pagination() {
    let app = test_app().await;
    for name in ["a.mp3", "b.mp3", "c.mp3"] {
        let response = send(&app, multipart_request("file", name, "audio/mpeg", &mp3_frames(42))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let first = list(&app, "?page=0&size=2").await;
    let second = list(&app, "?page=1&size=2").await;
    let beyond = list(&app, "?page=5&size=2").await;

    assert_eq!(first.total, 3);
    assert_eq!(first.total_pages, 2);
    let names: Vec<_> = first
        .items
        .iter()
        .chain(second.items.iter())
        .map(|item| item.file_name.as_str())
        .collect();
    assert_eq!(names, ["a.mp3", "b.mp3", "c.mp3"]);
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 3);
}

#[tokio::test]
async fn test_stream_unknown_id() {
    let app = test_app().await;

    let response = send(&app, get("/audio/stream/42")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = json(response).await;
    assert_eq!(error.error, "Audio 42 not found");
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = test_app().await;

    let response = send(&app, get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");

    let response = send(&app, get("/api-docs/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc: serde_json::Value = json(response).await;
    assert!(doc["paths"]["/audio/upload"].is_object());
    assert!(doc["paths"]["/audio/stream/{id}"].is_object());
}
