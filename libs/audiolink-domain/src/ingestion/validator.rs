//! Upload validation
//!
//! Runs before any object-store or filesystem interaction, so a refused
//! upload has no side effects.

use super::{AudioUpload, IngestionError};

/// The only MIME type accepted for upload
pub const ACCEPTED_CONTENT_TYPE: &str = "audio/mpeg";

/// Check the declared content type of an upload
///
/// MIME types compare case-insensitively; parameters are not accepted.
pub fn validate_content_type(declared: Option<&str>) -> Result<(), IngestionError> {
    match declared.map(str::trim) {
        Some(content_type) if content_type.eq_ignore_ascii_case(ACCEPTED_CONTENT_TYPE) => Ok(()),
        Some(other) => Err(IngestionError::validation(format!(
            "Only MP3 files are allowed (got '{}')",
            other
        ))),
        None => Err(IngestionError::validation(
            "Only MP3 files are allowed (no content type declared)",
        )),
    }
}

/// Validate a whole upload against the accepted type and the size ceiling
pub fn validate_upload(upload: &AudioUpload, max_upload_bytes: u64) -> Result<(), IngestionError> {
    validate_content_type(upload.content_type())?;

    if upload.size() > max_upload_bytes {
        return Err(IngestionError::upload_too_large(
            upload.size(),
            max_upload_bytes,
        ));
    }

    Ok(())
}
