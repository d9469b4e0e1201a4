//! Blob storage port and backends.
//!
//! Media files live in a key-value blob store addressed by path; the
//! database only carries the storage key and the derived public URL.
//! Uploads write the blob first and insert the row second.

mod local;

pub use local::LocalDiskStorage;

use async_trait::async_trait;

use crate::error::Result;

/// Key-value blob storage addressed by path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store `bytes` under `path`, returning the stored path.
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<String>;

    /// Public URL of a stored object.
    fn url(&self, path: &str) -> String;

    async fn exists(&self, path: &str) -> Result<bool>;

    async fn get(&self, path: &str) -> Result<Vec<u8>>;

    async fn delete(&self, path: &str) -> Result<()>;
}

impl std::fmt::Debug for dyn StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StorageBackend")
    }
}
