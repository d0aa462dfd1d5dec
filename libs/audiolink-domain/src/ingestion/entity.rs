//! Domain entities for audio ingestion
//!
//! An `AudioRecord` is the persisted metadata of one stored audio file.
//! It is created exactly once, as the last step of a successful upload, and
//! never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::ingestion::ids::{AudioId, StorageKey};

/// Default number of listings per page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on listings per page
pub const MAX_PAGE_SIZE: u32 = 100;

/// Persisted metadata of a stored audio file
///
/// - **Immutable**: once created, a record never changes
/// - **Write-then-record**: a record only exists if its bytes were stored first
/// - **Unique key**: `storage_key` is never shared between records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRecord {
    /// Repository-assigned identifier
    pub id: AudioId,

    /// Original client-supplied name, informational only
    pub file_name: String,

    /// MIME type accepted at validation time
    pub file_type: String,

    /// Byte length of the uploaded payload
    pub file_size: u64,

    /// Location of the bytes in the object store
    pub storage_key: StorageKey,

    /// Playback length in whole seconds
    pub duration_seconds: u64,
}

impl AudioRecord {
    /// Reduce the record to its listing projection
    pub fn to_listing(&self) -> AudioListing {
        AudioListing {
            id: self.id,
            file_name: self.file_name.clone(),
            duration_seconds: self.duration_seconds,
        }
    }
}

/// Record values known before the repository assigns an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAudioRecord {
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    pub storage_key: StorageKey,
    pub duration_seconds: u64,
}

impl NewAudioRecord {
    /// Attach the id assigned at creation
    pub fn into_record(self, id: AudioId) -> AudioRecord {
        AudioRecord {
            id,
            file_name: self.file_name,
            file_type: self.file_type,
            file_size: self.file_size,
            storage_key: self.storage_key,
            duration_seconds: self.duration_seconds,
        }
    }
}

/// Read-only listing projection of an [`AudioRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioListing {
    pub id: AudioId,
    pub file_name: String,
    pub duration_seconds: u64,
}

/// Zero-based page request with a bounded page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Build a request; a size of 0 falls back to the default and sizes
    /// above [`MAX_PAGE_SIZE`] are clamped.
    pub fn new(page: u32, size: u32) -> Self {
        let size = match size {
            0 => DEFAULT_PAGE_SIZE,
            s => s.min(MAX_PAGE_SIZE),
        };
        Self { page, size }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of rows to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// One page of results plus the total number of rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page(),
            size: request.size(),
            total,
        }
    }

    /// `ceil(total / size)`
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.size.max(1)))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total: self.total,
        }
    }
}
