use mongodb::{Client, Collection, Database};

use crate::utils::error::AppError;

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    /// Connect to MongoDB and verify the server is reachable.
    ///
    /// A connectivity failure here is fatal for the caller: there is no
    /// retry, the process is expected to abort.
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, AppError> {
        log::info!("Connecting to MongoDB at {}", uri);

        let client_options = mongodb::options::ClientOptions::parse(uri).await?;
        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        log::info!("✅ Connected to MongoDB database: {}", db_name);

        Ok(Self { client, db })
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}
