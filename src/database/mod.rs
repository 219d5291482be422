use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use std::error::Error;

pub const KV_COLLECTION: &str = "kv_store";
pub const DEFAULT_DATABASE: &str = "FundingReview";

/// Database named in the connection string path, or `DEFAULT_DATABASE`.
fn database_name(options: &ClientOptions) -> String {
    options
        .default_database
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_DATABASE.to_string())
}

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = ClientOptions::parse(uri).await?;

        // Whole-collection writes are small and infrequent; a modest pool is enough
        client_options.max_pool_size = Some(10);
        client_options.min_pool_size = Some(1);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let db_name = database_name(&client_options);
        let client = Client::with_options(client_options)?;

        let db = client.database(&db_name);

        // Test connection
        db.list_collection_names().await?;

        log::info!("✅ MongoDB connected: database '{}'", db_name);

        Ok(Self { db })
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// Check if the connection is healthy
    pub async fn health_check(&self) -> Result<bool, mongodb::error::Error> {
        self.db.list_collection_names().await?;
        Ok(true)
    }
}
