use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::KeyValueBackend;
use crate::utils::AppError;

/// Keeps every key in one JSON object file, rewritten in full on each write.
///
/// File access runs on tokio's blocking pool so request workers never wait on disk.
pub struct FileBackend {
    store: Arc<FileStore>,
}

struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write of the file within this process
    guard: Mutex<()>,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        log::info!("📁 File storage at {}", path.display());
        Ok(Self {
            store: Arc::new(FileStore {
                path,
                guard: Mutex::new(()),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.store.path
    }

    async fn run<T, F>(&self, op: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&FileStore) -> Result<T, AppError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let _guard = store.lock()?;
            op(&store)
        })
        .await
        .map_err(|e| AppError::StorageError(format!("file store task failed: {}", e)))?
    }
}

impl FileStore {
    fn read_all(&self) -> Result<BTreeMap<String, String>, AppError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), AppError> {
        let content = serde_json::to_string_pretty(items)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, AppError> {
        self.guard
            .lock()
            .map_err(|_| AppError::StorageError("file store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueBackend for FileBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        let key = key.to_string();
        self.run(move |store| Ok(store.read_all()?.remove(&key))).await
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), AppError> {
        let key = key.to_string();
        self.run(move |store| {
            let mut items = store.read_all()?;
            items.insert(key, value);
            store.write_all(&items)
        })
        .await
    }

    async fn remove_item(&self, key: &str) -> Result<(), AppError> {
        let key = key.to_string();
        self.run(move |store| {
            let mut items = store.read_all()?;
            if items.remove(&key).is_some() {
                store.write_all(&items)?;
            }
            Ok(())
        })
        .await
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("funding-review-{}", uuid::Uuid::new_v4().simple()))
            .join("store.json")
    }

    #[tokio::test]
    async fn test_values_survive_a_new_backend_instance() {
        let path = temp_store_path();
        {
            let backend = FileBackend::new(&path).unwrap();
            backend.set_item("fff_users", "[]".into()).await.unwrap();
            backend.set_item("fff_applications", "[1]".into()).await.unwrap();
        }

        let reopened = FileBackend::new(&path).unwrap();
        assert_eq!(reopened.get_item("fff_users").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(reopened.get_item("fff_applications").await.unwrap().as_deref(), Some("[1]"));

        reopened.remove_item("fff_users").await.unwrap();
        assert_eq!(reopened.get_item("fff_users").await.unwrap(), None);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let backend = FileBackend::new(temp_store_path()).unwrap();
        assert_eq!(backend.get_item("anything").await.unwrap(), None);
        assert!(!backend.path().exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_do_not_lose_keys() {
        let path = temp_store_path();
        let backend = Arc::new(FileBackend::new(&path).unwrap());

        let writers: Vec<_> = (0..8)
            .map(|i| {
                let backend = Arc::clone(&backend);
                tokio::spawn(async move { backend.set_item(&format!("key_{}", i), format!("[{}]", i)).await })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        for i in 0..8 {
            let value = backend.get_item(&format!("key_{}", i)).await.unwrap();
            assert_eq!(value, Some(format!("[{}]", i)));
        }

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
