use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::StorageBackend;
use crate::error::{CoreError, Result};

/// Local-filesystem blob store.
///
/// Objects are laid out under `root` mirroring their storage keys
/// (`users/{user_id}/{uuid}.{ext}`); public URLs are
/// `{public_base_url}/{key}` and are expected to be served by the web
/// tier or a fronting proxy.
#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into();
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a storage key, rejecting traversal outside the root.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(CoreError::Storage(format!(
                "invalid storage path: {path}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl StorageBackend for LocalDiskStorage {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(CoreError::storage)?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(CoreError::storage)?;
        debug!(path, size = bytes.len(), "stored blob");
        Ok(path.to_string())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let target = self.resolve(path)?;
        tokio::fs::try_exists(&target)
            .await
            .map_err(CoreError::storage)
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        let target = self.resolve(path)?;
        tokio::fs::read(&target).await.map_err(CoreError::storage)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        tokio::fs::remove_file(&target)
            .await
            .map_err(CoreError::storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(dir: &tempfile::TempDir) -> LocalDiskStorage {
        LocalDiskStorage::new(dir.path(), "http://localhost:8080/media/")
    }

    #[tokio::test]
    async fn put_then_get_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);

        let stored = storage.put("users/1/a.jpg", b"jpeg-bytes").await.unwrap();
        assert_eq!(stored, "users/1/a.jpg");
        assert!(storage.exists("users/1/a.jpg").await.unwrap());
        assert_eq!(storage.get("users/1/a.jpg").await.unwrap(), b"jpeg-bytes");
    }

    #[tokio::test]
    async fn delete_removes_the_blob() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);

        storage.put("users/1/a.jpg", b"x").await.unwrap();
        storage.delete("users/1/a.jpg").await.unwrap();
        assert!(!storage.exists("users/1/a.jpg").await.unwrap());
    }

    #[test]
    fn url_joins_base_and_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        assert_eq!(
            storage.url("users/1/a.jpg"),
            "http://localhost:8080/media/users/1/a.jpg"
        );
    }

    #[tokio::test]
    async fn rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        assert!(storage.put("../escape.jpg", b"x").await.is_err());
    }
}
