use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{validate_key, BlobStore};
use crate::error::Result;

/// In-process store for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, (Vec<u8>, DateTime<Utc>)>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write with an explicit modification time.
    pub async fn put_at(&self, key: &str, bytes: Vec<u8>, at: DateTime<Utc>) -> Result<()> {
        validate_key(key)?;
        self.blobs.write().await.insert(key.to_string(), (bytes, at));
        Ok(())
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.blobs.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self.blobs.read().await.get(key).map(|(bytes, _)| bytes.clone()))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.put_at(key, bytes, Utc::now()).await
    }

    async fn modified_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        validate_key(key)?;
        Ok(self.blobs.read().await.get(key).map(|(_, at)| *at))
    }
}
