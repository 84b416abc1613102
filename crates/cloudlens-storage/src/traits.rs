//! Storage abstraction trait
//!
//! This module defines the ObjectStore trait that all storage backends must
//! implement.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// An object read from storage: its bytes plus the headers the pipeline
/// consumes.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
    /// User-defined metadata attached at write time by the upload gateway
    /// (e.g. `custom-text`, `custom-size`).
    pub metadata: HashMap<String, String>,
}

/// Storage abstraction trait
///
/// Each instance addresses one bucket. Put/delete are atomic per key; that
/// is the only consistency primitive callers may rely on.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read an object's bytes, content type, and user metadata.
    async fn get(&self, key: &str) -> StorageResult<StoredObject>;

    /// Write an object under `key` with the given content type.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()>;

    /// Delete the object under `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;
}
