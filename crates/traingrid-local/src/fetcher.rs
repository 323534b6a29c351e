//! Image resolution for the local backend.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use traingrid_core::ImageFetchError;

/// Resolves a logical image reference to a local filesystem path.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, image: &str) -> Result<PathBuf, ImageFetchError>;
}

/// Treats the image reference as a directory that already exists on the
/// local filesystem. Useful for development and tests, where the "image"
/// is a directory of scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDirectoryImageFetcher;

impl LocalDirectoryImageFetcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ImageFetcher for LocalDirectoryImageFetcher {
    async fn fetch(&self, image: &str) -> Result<PathBuf, ImageFetchError> {
        let metadata = tokio::fs::metadata(image)
            .await
            .map_err(|e| ImageFetchError::new(image, e.to_string()))?;
        if !metadata.is_dir() {
            return Err(ImageFetchError::new(image, "not a directory"));
        }
        debug!(%image, "resolved image to local directory");
        Ok(PathBuf::from(image))
    }
}
