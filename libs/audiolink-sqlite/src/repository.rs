//! SQLite Audio Repository Implementation
//!
//! This module implements the `AudioRepository` trait on an sqlx `SqlitePool`.
//! Creation runs inside an explicit transaction; listing reads count and rows
//! from the same transaction so both come from one snapshot.

use audiolink_domain::{
    ingestion::{AudioId, AudioListing, AudioRecord, NewAudioRecord, Page, PageRequest, StorageKey},
    ports::AudioRepository,
    IngestionError,
};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, FromRow)]
struct AudioRow {
    id: i64,
    file_name: String,
    file_type: String,
    file_size: i64,
    storage_key: String,
    duration_seconds: i64,
}

impl AudioRow {
    fn into_record(self) -> Result<AudioRecord, IngestionError> {
        Ok(AudioRecord {
            id: AudioId::new(self.id),
            file_name: self.file_name,
            file_type: self.file_type,
            file_size: from_column(self.file_size, "file_size")?,
            storage_key: StorageKey::from_stored(self.storage_key),
            duration_seconds: from_column(self.duration_seconds, "duration_seconds")?,
        })
    }
}

#[derive(Debug, FromRow)]
struct ListingRow {
    id: i64,
    file_name: String,
    duration_seconds: i64,
}

impl ListingRow {
    fn into_listing(self) -> Result<AudioListing, IngestionError> {
        Ok(AudioListing {
            id: AudioId::new(self.id),
            file_name: self.file_name,
            duration_seconds: from_column(self.duration_seconds, "duration_seconds")?,
        })
    }
}

fn from_column(value: i64, column: &str) -> Result<u64, IngestionError> {
    u64::try_from(value)
        .map_err(|_| IngestionError::repository(format!("Negative {} in audio_files", column)))
}

fn to_column(value: u64, column: &str) -> Result<i64, IngestionError> {
    i64::try_from(value)
        .map_err(|_| IngestionError::repository(format!("{} {} is out of range", column, value)))
}

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> IngestionError {
    move |err| {
        error!(error = ?err, "{}", context);
        IngestionError::repository(format!("{}: {}", context, err))
    }
}

/// Insert one record inside `tx` and return the assigned id
///
/// Nothing is visible to other connections until the caller commits.
pub async fn insert_audio(
    tx: &mut Transaction<'_, Sqlite>,
    record: &NewAudioRecord,
) -> Result<AudioId, IngestionError> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO audio_files (file_name, file_type, file_size, storage_key, duration_seconds)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&record.file_name)
    .bind(&record.file_type)
    .bind(to_column(record.file_size, "file_size")?)
    .bind(record.storage_key.as_str())
    .bind(to_column(record.duration_seconds, "duration_seconds")?)
    .fetch_one(&mut **tx)
    .await
    .map_err(db_error("Failed to insert audio record"))?;

    Ok(AudioId::new(id))
}

/// sqlx-based implementation of the AudioRepository port
#[derive(Clone)]
pub struct SqliteAudioRepository {
    pool: SqlitePool,
}

impl SqliteAudioRepository {
    /// Create a repository on an open pool (schema must exist, see `init_schema`)
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Transaction boundary around the insert: commit on success, roll back
    /// on any failure.
    async fn create_committed(&self, record: NewAudioRecord) -> Result<AudioId, IngestionError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        match insert_audio(&mut tx, &record).await {
            Ok(id) => {
                tx.commit()
                    .await
                    .map_err(db_error("Failed to commit audio record"))?;
                info!(id = %id, key = %record.storage_key, "Audio record committed");
                Ok(id)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = ?rollback_err, "Rollback after failed insert also failed");
                }
                debug!(key = %record.storage_key, "Audio record insert rolled back");
                Err(err)
            }
        }
    }

    async fn read_page(&self, request: PageRequest) -> Result<Page<AudioListing>, IngestionError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin read transaction"))?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audio_files")
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to count audio records"))?;

        let rows: Vec<ListingRow> = sqlx::query_as(
            r#"
            SELECT id, file_name, duration_seconds
            FROM audio_files
            ORDER BY id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(i64::from(request.size()))
        .bind(to_column(request.offset(), "offset")?)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to list audio records"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to end read transaction"))?;

        let items = rows
            .into_iter()
            .map(ListingRow::into_listing)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, request, from_column(total, "count")?))
    }

    async fn find(&self, id: AudioId) -> Result<Option<AudioRecord>, IngestionError> {
        let row: Option<AudioRow> = sqlx::query_as(
            r#"
            SELECT id, file_name, file_type, file_size, storage_key, duration_seconds
            FROM audio_files
            WHERE id = ?
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to look up audio record"))?;

        row.map(AudioRow::into_record).transpose()
    }
}

impl AudioRepository for SqliteAudioRepository {
    #[instrument(skip(self, record), fields(key = %record.storage_key))]
    async fn create(&self, record: NewAudioRecord) -> Result<AudioId, IngestionError> {
        self.create_committed(record).await
    }

    #[instrument(skip(self))]
    async fn page(&self, request: PageRequest) -> Result<Page<AudioListing>, IngestionError> {
        self.read_page(request).await
    }

    #[instrument(skip(self))]
    async fn lookup(&self, id: AudioId) -> Result<Option<AudioRecord>, IngestionError> {
        self.find(id).await
    }
}
