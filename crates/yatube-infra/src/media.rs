//! Uploaded post images on the local filesystem.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use yatube_core::ports::{MediaError, MediaStorage, Upload};

/// Stores uploads under a media root as `<folder>/<uuid>.<ext>`.
#[derive(Debug, Clone)]
pub struct LocalMediaStorage {
    root: PathBuf,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a stored relative path to a file under the root, refusing
    /// anything that could escape it.
    fn resolve(&self, relative: &str) -> Result<PathBuf, MediaError> {
        let path = Path::new(relative);
        let is_plain = !relative.is_empty()
            && path.components().all(|c| matches!(c, Component::Normal(_)));

        if !is_plain {
            return Err(MediaError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(path))
    }
}

fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn save(&self, folder: &str, upload: &Upload) -> Result<String, MediaError> {
        let relative = format!("{}/{}{}", folder, Uuid::new_v4(), extension_of(&upload.filename));
        let target = self.resolve(&relative)?;

        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| MediaError::Io(e.to_string()))?;
        }
        fs::write(&target, &upload.data)
            .await
            .map_err(|e| MediaError::Io(e.to_string()))?;

        tracing::debug!(path = %relative, bytes = upload.data.len(), "Stored upload");
        Ok(relative)
    }

    async fn open(&self, path: &str) -> Result<Vec<u8>, MediaError> {
        let target = self.resolve(path)?;
        match fs::read(&target).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MediaError::NotFound(path.to_string()))
            }
            Err(e) => Err(MediaError::Io(e.to_string())),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), MediaError> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MediaError::Io(e.to_string())),
        }
    }
}
