//! Filesystem photo store.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gram_core::Photo;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::storage_traits::{PhotoRef, PhotoStore};

/// Content-addressed photo store with git-style 2-char sharding.
///
/// Layout: `<root>/<first 2 hex chars>/<remaining hex chars>.<ext>`
#[derive(Debug, Clone)]
pub struct FsPhotoStore {
    root: PathBuf,
}

impl FsPhotoStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root from `GRAM_UPLOADS_DIR`, defaulting to `.gramconnect/uploads`.
    pub fn from_env() -> StorageResult<Self> {
        let root = std::env::var("GRAM_UPLOADS_DIR")
            .unwrap_or_else(|_| ".gramconnect/uploads".to_string());
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// On-disk location of a photo.
    pub fn photo_path(&self, photo_ref: &PhotoRef) -> PathBuf {
        let hex = photo_ref.digest();
        self.root
            .join(&hex[..2])
            .join(format!("{}.{}", &hex[2..], photo_ref.extension()))
    }

    fn write_blob(path: &Path, bytes: &[u8]) -> StorageResult<()> {
        let shard_dir = path.parent().ok_or_else(|| {
            StorageError::Backend(format!("photo path has no parent: {}", path.display()))
        })?;
        fs::create_dir_all(shard_dir)?;

        // Write to a temp file in the same directory, then rename into place.
        let mut tmp = NamedTempFile::new_in(shard_dir)?;
        tmp.write_all(bytes)?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[async_trait]
impl PhotoStore for FsPhotoStore {
    async fn put(&self, photo: &Photo) -> StorageResult<PhotoRef> {
        let photo_ref = PhotoRef::for_photo(photo);
        let path = self.photo_path(&photo_ref);

        if tokio::fs::try_exists(&path).await? {
            debug!(photo = %photo_ref.short(), "photo already stored");
            return Ok(photo_ref);
        }

        let bytes = photo.bytes.clone();
        tokio::task::spawn_blocking(move || Self::write_blob(&path, &bytes))
            .await
            .map_err(|e| StorageError::Backend(format!("photo write task failed: {e}")))??;

        debug!(photo = %photo_ref.short(), size = photo.bytes.len(), "photo stored");
        Ok(photo_ref)
    }

    async fn get(&self, photo_ref: &PhotoRef) -> StorageResult<Photo> {
        let path = self.photo_path(photo_ref);
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::PhotoNotFound {
                    photo_ref: photo_ref.to_string(),
                }
            } else {
                StorageError::Io(e)
            }
        })?;
        Ok(Photo::new(photo_ref.mime_type(), bytes))
    }

    async fn contains(&self, photo_ref: &PhotoRef) -> StorageResult<bool> {
        Ok(tokio::fs::try_exists(self.photo_path(photo_ref)).await?)
    }
}
