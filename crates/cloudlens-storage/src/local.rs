use crate::traits::{ObjectStore, StorageError, StorageResult, StoredObject};
use async_trait::async_trait;
use cloudlens_core::constants::DEFAULT_CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Sidecar file holding the headers S3 would keep alongside the object.
#[derive(Debug, Serialize, Deserialize, Default)]
struct SidecarMeta {
    content_type: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

const SIDECAR_SUFFIX: &str = ".meta.json";

/// Local filesystem object store implementation
///
/// One instance roots one bucket directory. Content type and user metadata
/// are persisted in a `.meta.json` sidecar next to each object so `get`
/// honors the same contract as the S3 backend.
#[derive(Clone)]
pub struct LocalObjectStore {
    base_path: PathBuf,
}

impl LocalObjectStore {
    /// Create a new LocalObjectStore rooted at `base_path`.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalObjectStore { base_path })
    }

    /// Convert a storage key to a filesystem path with traversal validation.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.contains("..") || key.starts_with('/') || key.is_empty() {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(key))
    }

    fn sidecar_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(SIDECAR_SUFFIX);
        PathBuf::from(name)
    }

    async fn ensure_parent_dir(path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn get(&self, key: &str) -> StorageResult<StoredObject> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        let sidecar = match fs::read(Self::sidecar_path(&path)).await {
            Ok(raw) => serde_json::from_slice::<SidecarMeta>(&raw)
                .map_err(|e| StorageError::BackendError(format!("Corrupt sidecar: {}", e)))?,
            Err(_) => SidecarMeta {
                content_type: DEFAULT_CONTENT_TYPE.to_string(),
                metadata: HashMap::new(),
            },
        };

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage get successful"
        );

        Ok(StoredObject {
            data,
            content_type: sidecar.content_type,
            metadata: sidecar.metadata,
        })
    }

    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let size = data.len();

        Self::ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let sidecar = SidecarMeta {
            content_type: content_type.to_string(),
            metadata: HashMap::new(),
        };
        let raw = serde_json::to_vec(&sidecar)
            .map_err(|e| StorageError::BackendError(e.to_string()))?;
        fs::write(Self::sidecar_path(&path), raw).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write sidecar for {}: {}", key, e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage put successful"
        );

        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;
        // Sidecar is best-effort; the object itself is gone
        let _ = fs::remove_file(Self::sidecar_path(&path)).await;

        tracing::info!(
            path = %path.display(),
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }
}

/// Attach user metadata to an existing local object, the way the upload
/// gateway does on S3. Intended for development seeding and tests.
impl LocalObjectStore {
    pub async fn put_with_metadata(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> StorageResult<()> {
        self.put(key, data, content_type).await?;
        let path = self.key_to_path(key)?;
        let sidecar = SidecarMeta {
            content_type: content_type.to_string(),
            metadata,
        };
        let raw = serde_json::to_vec(&sidecar)
            .map_err(|e| StorageError::BackendError(e.to_string()))?;
        fs::write(Self::sidecar_path(&path), raw).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write sidecar for {}: {}", key, e))
        })?;
        Ok(())
    }
}
