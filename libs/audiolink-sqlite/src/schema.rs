use audiolink_domain::IngestionError;
use sqlx::SqlitePool;

/// `AUTOINCREMENT` keeps ids from ever being reused.
const CREATE_AUDIO_FILES: &str = r#"
CREATE TABLE IF NOT EXISTS audio_files (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    file_name        TEXT    NOT NULL,
    file_type        TEXT    NOT NULL,
    file_size        INTEGER NOT NULL CHECK (file_size >= 0),
    storage_key      TEXT    NOT NULL UNIQUE,
    duration_seconds INTEGER NOT NULL CHECK (duration_seconds >= 0)
)
"#;

/// Create the `audio_files` table if it does not exist
pub async fn init_schema(pool: &SqlitePool) -> Result<(), IngestionError> {
    sqlx::query(CREATE_AUDIO_FILES)
        .execute(pool)
        .await
        .map_err(|e| IngestionError::repository(format!("Failed to create schema: {}", e)))?;
    Ok(())
}
