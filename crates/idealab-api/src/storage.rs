//! Object storage collaborator
//!
//! Project photos and achievement images go through the narrow
//! [`ObjectStore`] interface. Keys are namespaced by a fixed prefix plus
//! `{reg_id}-{timestamp}.{ext}` so uploads never collide across users.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Object storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// No object under the given key
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Key contains path traversal or other rejected segments
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    /// Underlying I/O failure
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Narrow storage interface: put and get, nothing else
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under a key, overwriting any previous object
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError>;

    /// Fetch the bytes stored under a key
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;
}

/// Build a namespaced object key: `{prefix}/{reg_id}-{millis}.{ext}`
pub fn object_key(prefix: &str, reg_id: &str, content_type: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    format!(
        "{}/{}-{}.{}",
        prefix,
        reg_id,
        millis,
        extension_for(content_type)
    )
}

/// File extension for the content types uploads arrive with
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "application/pdf" => "pdf",
        _ => "bin",
    }
}

/// Content type guessed back from a stored key
pub fn content_type_for(key: &str) -> String {
    mime_guess::from_path(key).first_or_octet_stream().to_string()
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    let path = Path::new(key);
    let sane = !key.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if sane {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Filesystem-backed store rooted at a local directory
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        validate_key(key)?;

        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        debug!("Stored object {} ({})", key, content_type);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        validate_key(key)?;

        let path = self.root.join(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and zero-config development
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.objects.write().await.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        validate_key(key)?;
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryObjectStore::new();

        store
            .put("projects/alice-1.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .expect("put failed");

        let bytes = store.get("projects/alice-1.jpg").await.expect("get failed");
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_missing_key_is_not_found() {
        let store = MemoryObjectStore::new();
        let err = store.get("projects/nope.jpg").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_traversal_keys_rejected() {
        let store = MemoryObjectStore::new();
        let err = store.get("../etc/passwd").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));

        let err = store
            .put("/absolute/key", vec![], "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[test]
    fn test_object_key_shape() {
        let key = object_key("achievements", "alice", "image/png");
        assert!(key.starts_with("achievements/alice-"));
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn test_content_type_round_trip() {
        assert_eq!(content_type_for("projects/x.png"), "image/png");
        assert_eq!(content_type_for("projects/x.jpg"), "image/jpeg");
    }
}
