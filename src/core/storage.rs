//! Persistence of synthesized audio.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::error::{SpeechError, SpeechResult};

/// Uploads audio to an object store and returns its public URL.
///
/// Implementations must leave the object publicly readable.
#[async_trait]
pub trait AudioUploader: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, suggested_filename: &str) -> SpeechResult<String>;
}

/// Stores audio as files in a local directory, returning `file://` URLs.
#[derive(Debug, Clone)]
pub struct DirectoryUploader {
    root: PathBuf,
}

impl DirectoryUploader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AudioUploader for DirectoryUploader {
    async fn upload(&self, bytes: Vec<u8>, suggested_filename: &str) -> SpeechResult<String> {
        let name = std::path::Path::new(suggested_filename)
            .file_name()
            .ok_or_else(|| {
                SpeechError::Upload(format!("Invalid file name: {suggested_filename}"))
            })?;

        fs::create_dir_all(&self.root).await.map_err(|e| {
            SpeechError::Upload(format!("Failed to create {}: {e}", self.root.display()))
        })?;

        let path = self.root.join(name);
        fs::write(&path, &bytes)
            .await
            .map_err(|e| SpeechError::Upload(format!("Failed to write {}: {e}", path.display())))?;

        let absolute = fs::canonicalize(&path).await.unwrap_or(path);
        debug!("Stored {} bytes at {}", bytes.len(), absolute.display());
        Ok(format!("file://{}", absolute.display()))
    }
}
