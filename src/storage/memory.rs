use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::KeyValueBackend;
use crate::utils::AppError;

/// Process-local backend. Contents vanish with the process.
#[derive(Default)]
pub struct MemoryBackend {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> AppError {
    AppError::StorageError("memory store lock poisoned".to_string())
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), AppError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        items.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), AppError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        items.remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get_item("k").await.unwrap(), None);

        backend.set_item("k", "[]".into()).await.unwrap();
        assert_eq!(backend.get_item("k").await.unwrap().as_deref(), Some("[]"));

        backend.remove_item("k").await.unwrap();
        assert_eq!(backend.get_item("k").await.unwrap(), None);
    }
}
