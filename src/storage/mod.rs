//! Key-value store adapter.
//!
//! Every collection lives as one JSON array string under a fixed key. Reads load the
//! whole collection, writes overwrite it; there is no partial update, no locking and
//! no transaction across keys, so concurrent writers race with last-writer-wins.

pub mod file;
pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::config::StorePolicy;
use crate::utils::AppError;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use mongo::MongoBackend;

pub const USERS_KEY: &str = "fff_users";
pub const APPLICATIONS_KEY: &str = "fff_applications";
pub const MEETINGS_KEY: &str = "fff_meetings";
pub const NOTIFICATIONS_KEY: &str = "fff_notifications";

/// String-keyed persistent store, the server-side stand-in for browser local storage.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set_item(&self, key: &str, value: String) -> Result<(), AppError>;
    async fn remove_item(&self, key: &str) -> Result<(), AppError>;
    fn name(&self) -> &'static str;
}

/// Handle passed to every store operation, cheap to clone.
///
/// A detached handle has no backend: reads see empty collections and writes fail
/// with `AppError::StorageUnavailable`.
#[derive(Clone)]
pub struct Storage {
    backend: Option<Arc<dyn KeyValueBackend>>,
    policy: Arc<StorePolicy>,
}

impl Storage {
    pub fn new(backend: Arc<dyn KeyValueBackend>, policy: StorePolicy) -> Self {
        Self {
            backend: Some(backend),
            policy: Arc::new(policy),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()), StorePolicy::default())
    }

    pub fn in_memory_with_policy(policy: StorePolicy) -> Self {
        Self::new(Arc::new(MemoryBackend::new()), policy)
    }

    pub fn detached() -> Self {
        Self {
            backend: None,
            policy: Arc::new(StorePolicy::default()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.as_ref().map(|b| b.name()).unwrap_or("detached")
    }

    pub fn policy(&self) -> &StorePolicy {
        &self.policy
    }

    fn writable(&self) -> Result<&Arc<dyn KeyValueBackend>, AppError> {
        self.backend.as_ref().ok_or_else(|| {
            AppError::StorageUnavailable("no storage backend attached in this context".to_string())
        })
    }

    /// Loads a whole collection. Absent key or detached storage yields an empty vec.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, AppError> {
        let backend = match &self.backend {
            Some(backend) => backend,
            None => {
                log::debug!("Storage detached, '{}' reads as empty", key);
                return Ok(Vec::new());
            }
        };

        match backend.get_item(key).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                log::error!("❌ Stored value under '{}' is not a valid collection: {}", key, e);
                AppError::SerializationError(format!("{}: {}", key, e))
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Serializes and overwrites the whole collection under `key`.
    pub async fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), AppError> {
        let backend = self.writable()?;
        let raw = serde_json::to_string(items)?;
        backend.set_item(key, raw).await
    }

    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.writable()?.remove_item(key).await
    }

    pub async fn contains_key(&self, key: &str) -> Result<bool, AppError> {
        match &self.backend {
            Some(backend) => Ok(backend.get_item(key).await?.is_some()),
            None => Ok(false),
        }
    }
}
