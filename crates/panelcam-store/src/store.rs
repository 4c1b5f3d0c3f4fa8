use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// Default presigned URL lifetime.
pub const DEFAULT_PRESIGN_TTL: Duration = Duration::from_secs(900);

/// Object-storage abstraction. Implementations must be `Send + Sync` so a
/// single handle can be shared across worker tasks via `Arc`.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Object size in bytes, without fetching the body.
    async fn stat(&self, key: &str) -> Result<u64, StoreError>;

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, StoreError>;

    async fn presign_put(&self, key: &str, ttl: Duration) -> Result<String, StoreError>;

    /// Idempotent: a second, racing call observing "bucket already exists"
    /// is not an error.
    async fn ensure_bucket(&self) -> Result<(), StoreError>;
}
