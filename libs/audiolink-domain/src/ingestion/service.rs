//! Ingestion service - Business logic orchestration
//!
//! This module contains the upload pipeline and the two read paths.
//! The service coordinates the validator, key generator, object store,
//! duration extractor and metadata repository.

use std::future::Future;

use tracing::{debug, error, info, instrument, warn};

use super::validator::{validate_upload, ACCEPTED_CONTENT_TYPE};
use super::{
    AudioId, AudioListing, AudioRecord, AudioUpload, IngestionError, NewAudioRecord, Page,
    PageRequest, StorageKey, UploadAborted, UploadStage,
};
use crate::ports::{AudioRepository, AudioServicePort, DurationExtractor, ObjectStore};
use crate::storage::{AudioStream, StreamingReader};

/// Configuration for the ingestion service
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// Maximum allowed upload size in bytes (default: 50MB)
    pub max_upload_bytes: u64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// Service for ingesting and serving audio files
///
/// This service encapsulates the business rules for audio ingestion:
/// - Refuses anything but `audio/mpeg` before touching any backend
/// - Writes bytes under a freshly generated key
/// - Derives the playback duration from the stored payload
/// - Records metadata only after the object-store write succeeded
///
/// ## Static Dispatch
///
/// The service is generic over its ports. The collaborators are constructed
/// once at start-up and handed in; nothing is looked up at call time.
///
/// ## Orphaned objects
///
/// A failure after the object-store write (extraction or metadata commit)
/// leaves the written object without a record. No compensating delete is
/// attempted; the abort carries the orphaned key and is logged at WARN.
pub struct IngestionService<S, R, E> {
    store: S,
    repository: R,
    extractor: E,
    config: IngestionConfig,
}

impl<S, R, E> IngestionService<S, R, E>
where
    S: ObjectStore,
    R: AudioRepository,
    E: DurationExtractor,
{
    /// Create a new IngestionService from already constructed collaborators
    pub fn new(store: S, repository: R, extractor: E, config: IngestionConfig) -> Self {
        Self {
            store,
            repository,
            extractor,
            config,
        }
    }

    /// Create a new IngestionService with default configuration
    pub fn with_defaults(store: S, repository: R, extractor: E) -> Self {
        Self::new(store, repository, extractor, IngestionConfig::default())
    }

    /// Run the upload pipeline
    ///
    /// `Received -> Validated -> Stored -> MetadataExtracted -> Persisted`
    ///
    /// 1. Validates the declared content type and size (no side effects on refusal)
    /// 2. Writes the bytes under a new unique storage key
    /// 3. Extracts the playback duration
    /// 4. Commits the metadata record
    ///
    /// # Errors
    ///
    /// Returns `UploadAborted` with the last stage reached and the reason.
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name(), size = upload.size()))]
    pub async fn upload(&self, upload: AudioUpload) -> Result<AudioId, UploadAborted> {
        debug!(stage = %UploadStage::Received, "Upload received");

        validate_upload(&upload, self.config.max_upload_bytes)
            .map_err(|reason| abort(UploadStage::Received, reason, None))?;
        debug!(stage = %UploadStage::Validated, "Upload validated");

        let storage_key = StorageKey::generate(upload.file_name());
        self.store
            .put(
                &storage_key,
                upload.data(),
                upload.size(),
                ACCEPTED_CONTENT_TYPE,
            )
            .await
            .map_err(|err| abort(UploadStage::Validated, err.into(), None))?;
        debug!(stage = %UploadStage::Stored, key = %storage_key, "Audio bytes stored");

        let duration_seconds = self
            .extractor
            .extract_seconds(upload.data())
            .await
            .map_err(|reason| abort(UploadStage::Stored, reason, Some(storage_key.clone())))?;
        debug!(
            stage = %UploadStage::MetadataExtracted,
            duration_seconds,
            "Audio duration extracted"
        );

        let record = NewAudioRecord {
            file_name: upload.file_name().to_string(),
            file_type: ACCEPTED_CONTENT_TYPE.to_string(),
            file_size: upload.size(),
            storage_key: storage_key.clone(),
            duration_seconds,
        };
        let id = self.repository.create(record).await.map_err(|reason| {
            abort(
                UploadStage::MetadataExtracted,
                reason,
                Some(storage_key.clone()),
            )
        })?;

        info!(
            stage = %UploadStage::Persisted,
            id = %id,
            key = %storage_key,
            duration_seconds,
            "Audio uploaded"
        );
        Ok(id)
    }

    /// One page of listings ordered by ascending id
    pub async fn list(&self, request: PageRequest) -> Result<Page<AudioListing>, IngestionError> {
        self.repository.page(request).await
    }

    /// Full record for `id`
    ///
    /// # Errors
    ///
    /// Returns `IngestionError::AudioNotFound` if no record matches
    pub async fn record(&self, id: AudioId) -> Result<AudioRecord, IngestionError> {
        self.repository
            .lookup(id)
            .await?
            .ok_or(IngestionError::AudioNotFound(id))
    }

    /// Open the stored bytes of record `id`
    ///
    /// # Errors
    ///
    /// - `IngestionError::AudioNotFound` if no record matches
    /// - `IngestionError::Store` if the object cannot be opened
    #[instrument(skip(self))]
    pub async fn stream(&self, id: AudioId) -> Result<AudioStream, IngestionError> {
        let record = self.record(id).await?;
        let stream = StreamingReader::new(&self.store).open(&record).await?;
        Ok(stream)
    }

    /// Get the service configuration
    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }
}

impl<S, R, E> AudioServicePort for IngestionService<S, R, E>
where
    S: ObjectStore,
    R: AudioRepository,
    E: DurationExtractor,
{
    fn upload(
        &self,
        upload: AudioUpload,
    ) -> impl Future<Output = Result<AudioId, UploadAborted>> + Send {
        IngestionService::upload(self, upload)
    }

    fn list(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Page<AudioListing>, IngestionError>> + Send {
        IngestionService::list(self, request)
    }

    fn stream(
        &self,
        id: AudioId,
    ) -> impl Future<Output = Result<AudioStream, IngestionError>> + Send {
        IngestionService::stream(self, id)
    }
}

/// Move an upload to its terminal failure state and log it
fn abort(stage: UploadStage, reason: IngestionError, orphan: Option<StorageKey>) -> UploadAborted {
    match orphan {
        Some(key) => {
            warn!(
                stage = %stage,
                kind = reason.kind(),
                key = %key,
                error = %reason,
                "Upload aborted after object write, stored object is orphaned"
            );
            UploadAborted::with_orphan(stage, reason, key)
        }
        None => {
            if reason.is_client_error() {
                info!(stage = %stage, kind = reason.kind(), error = %reason, "Upload rejected");
            } else {
                error!(stage = %stage, kind = reason.kind(), error = %reason, "Upload aborted");
            }
            UploadAborted::new(stage, reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryObjectStore;
    use bytes::Bytes;
    use futures::TryStreamExt;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    // In-memory metadata repository for testing
    #[derive(Clone, Default)]
    struct InMemoryRepository {
        records: Arc<Mutex<Vec<AudioRecord>>>,
        fail_commits: Arc<AtomicBool>,
    }

    impl InMemoryRepository {
        fn count(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    impl AudioRepository for InMemoryRepository {
        fn create(
            &self,
            record: NewAudioRecord,
        ) -> impl std::future::Future<Output = Result<AudioId, IngestionError>> + Send {
            let records = self.records.clone();
            let fail = self.fail_commits.load(Ordering::SeqCst);

            async move {
                if fail {
                    return Err(IngestionError::repository("commit failed"));
                }
                let mut records = records.lock().unwrap();
                let id = AudioId::new(records.len() as i64 + 1);
                records.push(record.into_record(id));
                Ok(id)
            }
        }

        fn page(
            &self,
            request: PageRequest,
        ) -> impl std::future::Future<Output = Result<Page<AudioListing>, IngestionError>> + Send
        {
            let records = self.records.clone();

            async move {
                let records = records.lock().unwrap();
                let items = records
                    .iter()
                    .skip(request.offset() as usize)
                    .take(request.size() as usize)
                    .map(AudioRecord::to_listing)
                    .collect();
                Ok(Page::new(items, request, records.len() as u64))
            }
        }

        fn lookup(
            &self,
            id: AudioId,
        ) -> impl std::future::Future<Output = Result<Option<AudioRecord>, IngestionError>> + Send
        {
            let records = self.records.clone();

            async move { Ok(records.lock().unwrap().iter().find(|r| r.id == id).cloned()) }
        }
    }

    // Extractor returning a fixed duration, or failing
    #[derive(Clone, Default)]
    struct FixedDuration {
        seconds: Option<u64>,
        calls: Arc<AtomicUsize>,
    }

    impl FixedDuration {
        fn seconds(seconds: u64) -> Self {
            Self {
                seconds: Some(seconds),
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self::default()
        }
    }

    impl DurationExtractor for FixedDuration {
        fn extract_seconds(
            &self,
            _data: Bytes,
        ) -> impl std::future::Future<Output = Result<u64, IngestionError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let seconds = self.seconds;

            async move { seconds.ok_or_else(|| IngestionError::extraction("no audio frames")) }
        }
    }

    type TestService = IngestionService<InMemoryObjectStore, InMemoryRepository, FixedDuration>;

    fn service_with(extractor: FixedDuration) -> (TestService, InMemoryObjectStore, InMemoryRepository) {
        let store = InMemoryObjectStore::new();
        let repository = InMemoryRepository::default();
        let service =
            IngestionService::with_defaults(store.clone(), repository.clone(), extractor);
        (service, store, repository)
    }

    fn mp3_upload(name: &str, data: &[u8]) -> AudioUpload {
        AudioUpload::new(name, Some("audio/mpeg".to_string()), Bytes::copy_from_slice(data))
    }

    #[tokio::test]
    async fn test_upload_success() {
        let (service, store, _) = service_with(FixedDuration::seconds(5));
        let data = vec![7u8; 80_000];

        let id = service.upload(mp3_upload("song.mp3", &data)).await.unwrap();

        let record = service.record(id).await.unwrap();
        assert_eq!(record.file_name, "song.mp3");
        assert_eq!(record.file_type, "audio/mpeg");
        assert_eq!(record.file_size, 80_000);
        assert_eq!(record.duration_seconds, 5);
        assert_eq!(store.object(&record.storage_key).unwrap(), data);
        assert_eq!(
            store.content_type(&record.storage_key).as_deref(),
            Some("audio/mpeg")
        );
    }

    #[tokio::test]
    async fn test_rejected_type_has_no_side_effects() {
        let extractor = FixedDuration::seconds(5);
        let calls = extractor.calls.clone();
        let (service, store, repository) = service_with(extractor);

        let upload = AudioUpload::new("notes.txt", Some("text/plain".into()), Bytes::from_static(b"hi"));
        let aborted = service.upload(upload).await.unwrap_err();

        assert_eq!(aborted.stage, UploadStage::Received);
        assert!(matches!(aborted.reason, IngestionError::Validation(_)));
        assert!(aborted.orphaned_key.is_none());
        assert!(store.is_empty());
        assert_eq!(repository.count(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected() {
        let store = InMemoryObjectStore::new();
        let service = IngestionService::new(
            store.clone(),
            InMemoryRepository::default(),
            FixedDuration::seconds(1),
            IngestionConfig { max_upload_bytes: 10 },
        );

        let aborted = service.upload(mp3_upload("big.mp3", &[0u8; 100])).await.unwrap_err();

        assert!(matches!(aborted.reason, IngestionError::UploadTooLarge { .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_writes_no_metadata() {
        let (service, store, repository) = service_with(FixedDuration::seconds(5));
        store.set_fail_writes(true);

        let aborted = service.upload(mp3_upload("song.mp3", b"abc")).await.unwrap_err();

        assert_eq!(aborted.stage, UploadStage::Validated);
        assert!(matches!(aborted.reason, IngestionError::Store(_)));
        assert!(aborted.orphaned_key.is_none());
        assert_eq!(repository.count(), 0);
    }

    #[tokio::test]
    async fn test_extraction_failure_orphans_object() {
        let (service, store, repository) = service_with(FixedDuration::failing());

        let aborted = service.upload(mp3_upload("song.mp3", b"garbage")).await.unwrap_err();

        assert_eq!(aborted.stage, UploadStage::Stored);
        assert!(matches!(aborted.reason, IngestionError::Extraction(_)));
        let orphan = aborted.orphaned_key.expect("orphaned key reported");
        assert!(store.object(&orphan).is_some());
        assert_eq!(repository.count(), 0);
    }

    #[tokio::test]
    async fn test_repository_failure_orphans_object() {
        let (service, store, repository) = service_with(FixedDuration::seconds(3));
        repository.fail_commits.store(true, Ordering::SeqCst);

        let aborted = service.upload(mp3_upload("song.mp3", b"abc")).await.unwrap_err();

        assert_eq!(aborted.stage, UploadStage::MetadataExtracted);
        assert!(matches!(aborted.reason, IngestionError::Repository(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(repository.count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_uploads_get_distinct_keys() {
        let (service, store, _) = service_with(FixedDuration::seconds(1));
        let service = Arc::new(service);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.upload(mp3_upload("same.mp3", b"abc")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let keys: HashSet<StorageKey> = store.keys().into_iter().collect();
        assert_eq!(keys.len(), 16);
    }

    #[tokio::test]
    async fn test_list_pages_cover_all_records() {
        let (service, _, _) = service_with(FixedDuration::seconds(2));
        for i in 0..7 {
            service
                .upload(mp3_upload(&format!("track-{i}.mp3"), b"abc"))
                .await
                .unwrap();
        }

        let mut seen = Vec::new();
        let first = service.list(PageRequest::new(0, 3)).await.unwrap();
        assert_eq!(first.total, 7);
        assert_eq!(first.total_pages(), 3);
        for page in 0..first.total_pages() as u32 {
            let listing = service.list(PageRequest::new(page, 3)).await.unwrap();
            seen.extend(listing.items.into_iter().map(|item| item.id));
        }

        let expected: Vec<AudioId> = (1..=7).map(AudioId::new).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_stream_returns_uploaded_bytes() {
        let (service, _, _) = service_with(FixedDuration::seconds(5));
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let id = service.upload(mp3_upload("song.mp3", &data)).await.unwrap();

        let stream = service.stream(id).await.unwrap();
        assert_eq!(stream.content_type, "audio/mpeg");
        assert_eq!(stream.content_length, data.len() as u64);

        let chunks: Vec<Bytes> = stream.body.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), data);
    }

    #[tokio::test]
    async fn test_stream_unknown_id() {
        let (service, _, _) = service_with(FixedDuration::seconds(5));

        let result = service.stream(AudioId::new(42)).await;

        assert!(matches!(result, Err(IngestionError::AudioNotFound(id)) if id == AudioId::new(42)));
    }

    #[tokio::test]
    async fn test_service_port_delegates() {
        let (service, _, _) = service_with(FixedDuration::seconds(4));

        async fn upload_via_port<P: AudioServicePort>(port: &P) -> AudioId {
            port.upload(mp3_upload("song.mp3", b"abc")).await.unwrap()
        }

        let id = upload_via_port(&service).await;
        let listed = AudioServicePort::list(&service, PageRequest::default()).await.unwrap();
        assert_eq!(listed.items[0].id, id);
        assert_eq!(listed.items[0].duration_seconds, 4);
    }
}
