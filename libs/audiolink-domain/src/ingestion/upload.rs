//! Upload input and pipeline states

use bytes::Bytes;
use std::fmt;

/// An inbound upload, independent of the transport that carried it
///
/// Holds the client-supplied file name, the content type declared by the
/// uploader and the payload bytes. The declared size is the payload length.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

impl AudioUpload {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            data,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Byte length of the payload
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Cheap handle on the payload (reference counted)
    pub fn data(&self) -> Bytes {
        self.data.clone()
    }
}

/// States an upload moves through
///
/// `Received -> Validated -> Stored -> MetadataExtracted -> Persisted`.
/// A failure in any non-terminal state ends the upload as
/// [`UploadAborted`](crate::ingestion::UploadAborted), which records the
/// stage reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Received,
    Validated,
    Stored,
    MetadataExtracted,
    Persisted,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "Received",
            Self::Validated => "Validated",
            Self::Stored => "Stored",
            Self::MetadataExtracted => "MetadataExtracted",
            Self::Persisted => "Persisted",
        };
        f.write_str(name)
    }
}
