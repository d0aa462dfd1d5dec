//! AudioLink API - Audio upload and streaming service
//!
//! Accepts MP3 uploads, stores them in S3-compatible object storage,
//! records their metadata in SQLite and streams them back on request.

use anyhow::Context;
use audiolink_api::{
    config::{AppConfig, StoreBackend},
    routes,
    store::AudioObjectStore,
    AppState,
};
use audiolink_domain::{ingestion::IngestionConfig, InMemoryObjectStore, IngestionService};
use audiolink_media::Mp3DurationExtractor;
use audiolink_s3::S3ObjectStore;
use audiolink_sqlite::{connect, init_schema, SqliteAudioRepository};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables (RUST_LOG included)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting AudioLink API");

    let config = AppConfig::from_env()?;

    let store = match config.store {
        StoreBackend::S3 => {
            let s3 = S3ObjectStore::from_env(config.bucket.clone()).await;
            s3.ensure_bucket()
                .await
                .with_context(|| format!("Bucket '{}' is not reachable", config.bucket))?;
            info!(bucket = %s3.bucket(), "S3 object store ready");
            AudioObjectStore::S3(s3)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory object store, uploads are lost on restart");
            AudioObjectStore::Memory(InMemoryObjectStore::new())
        }
    };

    let pool = connect(&config.database_url).await?;
    init_schema(&pool).await?;
    info!(database_url = %config.database_url, "Metadata store ready");

    let extractor = match &config.temp_dir {
        Some(dir) => Mp3DurationExtractor::with_temp_dir(dir.clone()),
        None => Mp3DurationExtractor::new(),
    };
    info!(temp_dir = %extractor.temp_dir().display(), "Duration extractor ready");

    let service = IngestionService::new(
        store,
        SqliteAudioRepository::new(pool),
        extractor,
        IngestionConfig {
            max_upload_bytes: config.max_upload_bytes,
        },
    );

    let app = routes::create_router(AppState::new(service));

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
