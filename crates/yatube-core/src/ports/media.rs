//! Media storage port - where uploaded post images live.

use async_trait::async_trait;

/// An uploaded file as received from a form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data,
        }
    }
}

/// Stores uploads and hands back a path relative to the media root.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Persist an upload under `folder`, returning its relative path
    /// (e.g. `posts/2f1c....gif`).
    async fn save(&self, folder: &str, upload: &Upload) -> Result<String, MediaError>;

    /// Read a stored file back.
    async fn open(&self, path: &str) -> Result<Vec<u8>, MediaError>;

    /// Remove a stored file. Missing files are not an error.
    async fn delete(&self, path: &str) -> Result<(), MediaError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid media path: {0}")]
    InvalidPath(String),

    #[error("Storage I/O failed: {0}")]
    Io(String),
}
