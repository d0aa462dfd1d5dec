//! Request-scoped temporary copies

use std::io::Write;
use std::path::Path;

use audiolink_domain::IngestionError;
use tracing::{debug, warn};

const TEMP_PREFIX: &str = "audiolink-";

/// Write `data` to a fresh temporary file in `dir`, run `f` on its path and
/// remove the file before returning.
///
/// The file is private to this call (unique name, created exclusively) and
/// is deleted explicitly whether `f` succeeds or fails. If `f` panics, the
/// unwinding drop of the temporary file removes it.
///
/// A failure to delete after a successful `f` is logged, not returned: the
/// result is already computed and the file lives in a temp directory.
pub fn with_scoped_copy<T, F>(
    dir: &Path,
    suffix: &str,
    data: &[u8],
    f: F,
) -> Result<T, IngestionError>
where
    F: FnOnce(&Path) -> Result<T, IngestionError>,
{
    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(suffix)
        .tempfile_in(dir)
        .map_err(|e| IngestionError::extraction(format!("Failed to create temporary copy: {}", e)))?;

    let result = temp
        .write_all(data)
        .and_then(|_| temp.flush())
        .map_err(|e| IngestionError::extraction(format!("Failed to write temporary copy: {}", e)))
        .and_then(|_| f(temp.path()));

    let path = temp.path().to_path_buf();
    match temp.close() {
        Ok(()) => debug!(path = %path.display(), "Temporary copy removed"),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove temporary copy"),
    }

    result
}
