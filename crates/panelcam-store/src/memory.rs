use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::store::ArtifactStore;

/// In-memory stand-in for `ArtifactStore`, used by worker/pipeline tests
/// that need deterministic behavior without a live S3 endpoint. Presigned
/// URLs are synthetic (`mem://<key>?ttl=<secs>`) but round-trip `put`/`get`.
#[derive(Default)]
pub struct InMemoryStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    bucket_ensured: Mutex<bool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        self.objects.lock().unwrap().insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn stat(&self, key: &str) -> Result<u64, StoreError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(bytes, _)| bytes.len() as u64)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, StoreError> {
        if !self.objects.lock().unwrap().contains_key(key) {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(format!("mem://{key}?ttl={}", ttl.as_secs()))
    }

    async fn presign_put(&self, key: &str, ttl: Duration) -> Result<String, StoreError> {
        Ok(format!("mem://{key}?ttl={}", ttl.as_secs()))
    }

    async fn ensure_bucket(&self) -> Result<(), StoreError> {
        *self.bucket_ensured.lock().unwrap() = true;
        Ok(())
    }
}
