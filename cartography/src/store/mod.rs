mod local;
mod memory;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CartographyError, Result};

/// Flat key-value store for JSON documents.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()>;
    /// Last write time, `None` when the key does not exist.
    async fn modified_at(&self, key: &str) -> Result<Option<DateTime<Utc>>>;
}

pub async fn get_json<T: DeserializeOwned>(store: &dyn BlobStore, key: &str) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

pub async fn put_json<T: Serialize + Sync>(store: &dyn BlobStore, key: &str, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value)?;
    store.put(key, bytes).await
}

pub fn user_record_key(id: &str) -> String {
    format!("user_{id}_data.json")
}

/// Identifier of a graph built around `core_ids`, in the order given.
pub fn graph_key(core_ids: &[String]) -> String {
    core_ids.join("_")
}

pub fn graph_document_key(graph_key: &str) -> String {
    format!("graph_{graph_key}.json")
}

/// Keys are flat file names: no separators, no parent references.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key != "."
        && !key.contains("..")
        && !key.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(CartographyError::Validation(format!("Invalid blob key: {key:?}")))
    }
}
