use std::path::{Path, PathBuf};

use crate::foundation::error::{StillcastError, StillcastResult};

/// Strip whitespace, then surrounding single quotes, then surrounding double quotes.
///
/// Handles paths pasted from a shell or a file manager (`'~/My Song.mp3'`).
pub fn clean_path(raw: &str) -> PathBuf {
    PathBuf::from(raw.trim().trim_matches('\'').trim_matches('"'))
}

/// Fail with [`StillcastError::FileNotFound`] unless `path` is a regular file we can open.
pub fn ensure_file(path: &Path) -> StillcastResult<()> {
    if !path.is_file() {
        return Err(StillcastError::file_not_found(path));
    }
    match std::fs::File::open(path) {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "input is not readable");
            Err(StillcastError::file_not_found(path))
        }
    }
}
