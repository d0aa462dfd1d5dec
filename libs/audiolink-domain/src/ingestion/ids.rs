use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a persisted audio record
///
/// Assigned by the metadata repository when the record is created and never
/// reassigned. Ids grow monotonically, which gives listings their stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioId(i64);

impl AudioId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for AudioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for AudioId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Longest original-name hint kept in a storage key
const MAX_NAME_HINT_LEN: usize = 128;

/// Fallback hint when the client supplied no usable file name
const DEFAULT_NAME_HINT: &str = "audio";

/// Key under which an upload's bytes live in the object store
///
/// Keys are `<uuid-v4>-<sanitized original name>`. The random prefix carries
/// 122 bits of entropy so collisions between concurrent or historical uploads
/// are negligible, while the suffix keeps the key traceable to the upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Generate a fresh key for an upload with the given original file name
    pub fn generate(file_name: &str) -> Self {
        Self(format!("{}-{}", Uuid::new_v4(), sanitize_name_hint(file_name)))
    }

    /// Rebuild a key read back from the metadata store
    pub fn from_stored(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reduce a client-supplied file name to a flat, key-safe hint.
///
/// Only the last path component survives, anything outside `[A-Za-z0-9._-]`
/// becomes `_`, and leading dots are dropped so the hint never reads as a
/// relative path segment.
fn sanitize_name_hint(file_name: &str) -> String {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let hint: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .skip_while(|c| *c == '.')
        .take(MAX_NAME_HINT_LEN)
        .collect();

    if hint.is_empty() {
        DEFAULT_NAME_HINT.to_string()
    } else {
        hint
    }
}
