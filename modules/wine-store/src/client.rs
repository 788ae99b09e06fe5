use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use tracing::info;

use wine_common::config::DEFAULT_DATABASE;
use wine_common::error::{Result, SeedError};
use wine_common::{Taster, TASTERS, TASTINGS};

/// Thin wrapper around a MongoDB client bound to one database.
///
/// Each stage receives this handle explicitly. Clones share the driver's
/// connection pool, which is released when the last clone is dropped.
#[derive(Clone)]
pub struct WineStore {
    client: Client,
    db: Database,
}

impl WineStore {
    /// Connect and ping. `database` overrides the database named in the URI path.
    pub async fn connect(uri: &str, database: Option<&str>) -> Result<Self> {
        let options = ClientOptions::parse(uri)
            .await
            .map_err(|e| SeedError::Connection(format!("invalid connection string: {e}")))?;

        let db_name = database
            .map(str::to_owned)
            .or_else(|| options.default_database.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let client = Client::with_options(options).map_err(|e| SeedError::Connection(e.to_string()))?;
        let db = client.database(&db_name);

        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| SeedError::Connection(e.to_string()))?;

        info!(database = %db_name, "Connected to MongoDB");
        Ok(Self { client, db })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Driver client, for commands that are not scoped to the seed database.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn tastings(&self) -> Collection<Document> {
        self.db.collection(TASTINGS)
    }

    pub fn tasters(&self) -> Collection<Taster> {
        self.db.collection(TASTERS)
    }

    pub fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }

    /// Document count of a collection. Missing collections count as zero.
    pub async fn count(&self, name: &str) -> Result<u64> {
        Ok(self.collection(name).count_documents(doc! {}).await?)
    }
}
