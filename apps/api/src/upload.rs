//! Uploaded-file lifecycle.
//!
//! Every upload lands in a fresh randomly-named file inside the
//! configured upload directory and is owned exclusively by the request
//! that created it. Deletion on every exit path (success, validation
//! failure, panic) is a hard invariant, carried by the `NamedTempFile`
//! drop; deletion errors are swallowed, the primary write is not.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::config::MAX_UPLOAD_SIZE;
use crate::errors::AppError;

/// A stored upload, removed from disk when the handle drops.
pub struct SavedUpload {
    file: NamedTempFile,
}

impl SavedUpload {
    /// Writes uploaded bytes under `upload_dir` as
    /// `<category>_<uuid>…<extension>`. The size cap is enforced before
    /// anything touches disk.
    pub fn write(
        upload_dir: &Path,
        category: &str,
        extension: &str,
        bytes: &[u8],
    ) -> Result<Self, AppError> {
        if bytes.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::Validation("File too large.".to_string()));
        }

        std::fs::create_dir_all(upload_dir)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("upload dir unavailable: {e}")))?;

        let mut file = tempfile::Builder::new()
            .prefix(&format!("{category}_{}", Uuid::new_v4()))
            .suffix(extension)
            .tempfile_in(upload_dir)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to create upload file: {e}")))?;

        file.write_all(bytes)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to write upload: {e}")))?;

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
