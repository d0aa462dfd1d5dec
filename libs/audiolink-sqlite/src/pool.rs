use std::str::FromStr;

use audiolink_domain::IngestionError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

/// Open a connection pool for `database_url`, creating the file if needed
pub async fn connect(database_url: &str) -> Result<SqlitePool, IngestionError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| IngestionError::repository(format!("Invalid database URL: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| IngestionError::repository(format!("Failed to open database: {}", e)))?;

    info!("SQLite metadata store opened");
    Ok(pool)
}

/// Open a private in-memory database
///
/// Uses a single connection that is never recycled: every SQLite in-memory
/// connection is its own database.
pub async fn connect_in_memory() -> Result<SqlitePool, IngestionError> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .map_err(|e| IngestionError::repository(format!("Failed to open database: {}", e)))
}
