//! Durable key/value storage for the result history.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use crate::error::StoreError;

/// A single-namespace string store. Every write replaces the whole value.
#[async_trait]
pub trait Storage: Send + Sync + Debug {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self { base_path: base_path.into() }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.json"))
    }
}

#[async_trait]
impl Storage for FileStorage {
    #[instrument(target = "strengths_quiz::storage", skip(self))]
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(target = "strengths_quiz::storage", skip(self, value), fields(bytes = value.len()))]
    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.base_path).await?;

        // Write beside the target and rename so a crash never leaves half a document.
        let file_path = self.path_for(key);
        let tmp_path = self.base_path.join(format!(".{key}.json.tmp"));
        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(value.as_bytes()).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp_path, &file_path).await?;

        debug!(path = %file_path.display(), "Persisted document");
        Ok(())
    }

    #[instrument(target = "strengths_quiz::storage", skip(self))]
    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage for tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a key, e.g. with deliberately corrupt content.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage.lock().insert(key.to_string(), value.to_string());
        storage
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(key))
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.as_ref().read(key).await
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.as_ref().write(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.as_ref().remove(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_storage_round_trip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));
        assert_eq!(storage.read("k").await.unwrap(), None);

        storage.write("k", "[1]").await.unwrap();
        storage.write("k", "[2]").await.unwrap();
        assert_eq!(storage.read("k").await.unwrap().as_deref(), Some("[2]"));

        storage.remove("k").await.unwrap();
        storage.remove("k").await.unwrap();
        assert_eq!(storage.read("k").await.unwrap(), None);
    }
}
