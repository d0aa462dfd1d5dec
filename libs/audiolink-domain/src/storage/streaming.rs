//! Streaming Reader
//!
//! Resolves a record to an open object-store stream tagged with the record's
//! content type. Bytes are pulled from the backend only as the consumer polls.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use tracing::{debug, warn};

use crate::ingestion::{AudioRecord, StorageKey, StoreError};
use crate::ports::{ByteStream, ObjectStore};

/// An open audio stream ready to hand to a consumer
pub struct AudioStream {
    /// Stored MIME type of the record
    pub content_type: String,
    /// Stored byte length of the record
    pub content_length: u64,
    /// Object bytes, pulled lazily from the store
    pub body: ByteStream,
}

impl fmt::Debug for AudioStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioStream")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Opens object-store streams for persisted records
pub struct StreamingReader<'a, S> {
    store: &'a S,
}

impl<'a, S> StreamingReader<'a, S>
where
    S: ObjectStore,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Open the bytes of `record`
    ///
    /// The returned body ends with a `StoreError` if the backend fails
    /// mid-read or delivers a different number of bytes than recorded.
    pub async fn open(&self, record: &AudioRecord) -> Result<AudioStream, StoreError> {
        debug!(id = %record.id, key = %record.storage_key, "Opening audio stream");

        let body = self.store.get(&record.storage_key).await?;

        Ok(AudioStream {
            content_type: record.file_type.clone(),
            content_length: record.file_size,
            body: Box::pin(LengthChecked::new(
                body,
                record.file_size,
                record.storage_key.clone(),
            )),
        })
    }
}

/// Terminates the stream with an error when the delivered length differs
/// from the recorded one. Yields nothing after the first error.
struct LengthChecked {
    inner: ByteStream,
    key: StorageKey,
    expected: u64,
    delivered: u64,
    finished: bool,
}

impl LengthChecked {
    fn new(inner: ByteStream, expected: u64, key: StorageKey) -> Self {
        Self {
            inner,
            key,
            expected,
            delivered: 0,
            finished: false,
        }
    }

    fn fail(&mut self, err: StoreError) -> Poll<Option<Result<Bytes, StoreError>>> {
        warn!(key = %self.key, delivered = self.delivered, error = %err, "Audio stream failed mid-read");
        self.finished = true;
        Poll::Ready(Some(Err(err)))
    }
}

impl Stream for LengthChecked {
    type Item = Result<Bytes, StoreError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        match this.inner.as_mut().poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(chunk))) => {
                this.delivered += chunk.len() as u64;
                if this.delivered > this.expected {
                    let msg = format!(
                        "object '{}' is longer than the recorded {} bytes",
                        this.key, this.expected
                    );
                    return this.fail(StoreError::backend(msg));
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(err))) => this.fail(err),
            Poll::Ready(None) if this.delivered < this.expected => {
                let msg = format!(
                    "object '{}' ended after {} of {} bytes",
                    this.key, this.delivered, this.expected
                );
                this.fail(StoreError::backend(msg))
            }
            Poll::Ready(None) => {
                this.finished = true;
                Poll::Ready(None)
            }
        }
    }
}
