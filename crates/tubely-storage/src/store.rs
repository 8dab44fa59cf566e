//! Object store abstraction.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::error::StorageResult;

/// Operations the upload and read paths need from an object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a local file to `bucket/key`, overwriting any existing object.
    async fn put_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Mint a URL granting anonymous GET access to `bucket/key` for `ttl`.
    ///
    /// Signing is local: the object is not checked for existence.
    async fn presign_get(&self, bucket: &str, key: &str, ttl: Duration) -> StorageResult<String>;

    /// Verify the store is reachable.
    async fn check_connectivity(&self, bucket: &str) -> StorageResult<()>;
}
