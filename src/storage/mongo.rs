use async_trait::async_trait;
use mongodb::bson::{doc, DateTime};
use mongodb::Collection;
use serde::{Deserialize, Serialize};

use super::KeyValueBackend;
use crate::database::{MongoDB, KV_COLLECTION};
use crate::utils::AppError;

/// One key of the store: `{ _id: key, value: "<json>", updated_at }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvDocument {
    #[serde(rename = "_id")]
    pub key: String,
    pub value: String,
    pub updated_at: DateTime,
}

pub struct MongoBackend {
    collection: Collection<KvDocument>,
}

impl MongoBackend {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            collection: db.collection::<KvDocument>(KV_COLLECTION),
        }
    }
}

#[async_trait]
impl KeyValueBackend for MongoBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        let found = self.collection.find_one(doc! { "_id": key }).await?;
        Ok(found.map(|d| d.value))
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), AppError> {
        let document = KvDocument {
            key: key.to_string(),
            value,
            updated_at: DateTime::now(),
        };
        self.collection
            .replace_one(doc! { "_id": key }, document)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), AppError> {
        self.collection.delete_one(doc! { "_id": key }).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mongodb"
    }
}
