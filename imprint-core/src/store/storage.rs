//! Byte storage beneath the document store
//!
//! Collection snapshots and uploaded files are written through a
//! [`StorageProvider`], so the same database runs on disk or in memory.

use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tokio::sync::RwLock;

/// Result type for storage and store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Abstract storage provider trait
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Read data from the given path
    async fn read(&self, path: &str) -> StoreResult<Vec<u8>>;

    /// Write data to the given path, replacing any previous content
    async fn write(&self, path: &str, data: Vec<u8>) -> StoreResult<()>;

    /// Delete data at the given path
    async fn delete(&self, path: &str) -> StoreResult<()>;

    /// Names of the entries directly inside the `prefix` directory
    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Check if a path exists
    async fn exists(&self, path: &str) -> StoreResult<bool>;

    /// Read a path, treating a missing entry as `None`
    async fn read_optional(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        if self.exists(path).await? {
            self.read(path).await.map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Local filesystem storage provider
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage provider with the given root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Safely resolve a path, preventing path traversal attacks
    fn full_path(&self, path: &str) -> StoreResult<PathBuf> {
        let mut normalized = PathBuf::new();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(c) => normalized.push(c),
                Component::CurDir => {}
                Component::ParentDir | Component::Prefix(_) | Component::RootDir => {
                    return Err(StoreError::PermissionDenied(format!(
                        "path escapes storage root: {path}"
                    )));
                }
            }
        }

        Ok(self.root.join(normalized))
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    async fn read(&self, path: &str) -> StoreResult<Vec<u8>> {
        let full_path = self.full_path(path)?;
        tokio::fs::read(full_path)
            .await
            .map_err(|e| StoreError::NotFound(format!("{path}: {e}")))
    }

    /// Writes to a temp file then renames to avoid partial writes
    async fn write(&self, path: &str, data: Vec<u8>) -> StoreResult<()> {
        let full_path = self.full_path(path)?;
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::BackendError(e.to_string()))?;
        }

        let mut temp_name = full_path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        tokio::fs::write(&temp_path, data)
            .await
            .map_err(|e| StoreError::BackendError(e.to_string()))?;
        tokio::fs::rename(&temp_path, &full_path)
            .await
            .map_err(|e| StoreError::BackendError(e.to_string()))
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        let full_path = self.full_path(path)?;
        tokio::fs::remove_file(full_path)
            .await
            .map_err(|e| StoreError::NotFound(format!("{path}: {e}")))
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let full_path = self.full_path(prefix)?;
        let mut entries = Vec::new();
        let mut read_dir = match tokio::fs::read_dir(&full_path).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
            Err(e) => return Err(StoreError::BackendError(e.to_string())),
        };

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| StoreError::BackendError(e.to_string()))?
        {
            if let Some(name) = entry.file_name().to_str() {
                entries.push(name.to_string());
            }
        }
        entries.sort();
        Ok(entries)
    }

    async fn exists(&self, path: &str) -> StoreResult<bool> {
        let full_path = self.full_path(path)?;
        tokio::fs::try_exists(full_path)
            .await
            .map_err(|e| StoreError::BackendError(e.to_string()))
    }
}

/// In-memory storage provider (for testing)
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageProvider for MemoryStorage {
    async fn read(&self, path: &str) -> StoreResult<Vec<u8>> {
        self.data
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn write(&self, path: &str, data: Vec<u8>) -> StoreResult<()> {
        self.data.write().await.insert(path.to_string(), data);
        Ok(())
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        self.data
            .write()
            .await
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let dir = format!("{}/", prefix.trim_end_matches('/'));
        let mut names: Vec<String> = self
            .data
            .read()
            .await
            .keys()
            .filter_map(|key| key.strip_prefix(&dir))
            .filter_map(|rest| rest.split('/').next())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn exists(&self, path: &str) -> StoreResult<bool> {
        Ok(self.data.read().await.contains_key(path))
    }
}
