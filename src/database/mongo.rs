//! MongoDB-backed document store

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::{Client, Collection, Database};
use tracing::info;

use crate::database::manager::DatabaseError;
use crate::database::store::{DocumentStore, FindQuery, UpdateOutcome};

#[derive(Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Connect and verify the server answers a ping
    pub async fn connect(uri: &str, db_name: &str, timeout_ms: u64) -> Result<Self, DatabaseError> {
        info!("Connecting to MongoDB at {}", redact_uri(uri));

        // Bound server selection and connect time
        let separator = if uri.contains('?') { '&' } else { '?' };
        let timeout_uri = format!(
            "{}{}serverSelectionTimeoutMS={}&connectTimeoutMS={}",
            uri, separator, timeout_ms, timeout_ms
        );

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| DatabaseError::ConnectionError(format!("Failed to connect to MongoDB: {}", e)))?;
        let database = client.database(db_name);

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DatabaseError::ConnectionError(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self { database })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection::<Document>(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson, DatabaseError> {
        let result = self.collection(collection).insert_one(document).await?;
        Ok(result.inserted_id)
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>, DatabaseError> {
        Ok(self.collection(collection).find_one(filter).await?)
    }

    async fn find(&self, collection: &str, query: FindQuery) -> Result<Vec<Document>, DatabaseError> {
        let coll = self.collection(collection);
        let mut action = coll
            .find(query.filter)
            .skip(query.skip)
            .limit(query.limit);
        if !query.projection.is_empty() {
            action = action.projection(query.projection);
        }

        let cursor = action.await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, DatabaseError> {
        let result = self
            .collection(collection)
            .update_one(filter, doc! { "$set": set })
            .await?;
        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, DatabaseError> {
        let result = self.collection(collection).delete_one(filter).await?;
        Ok(result.deleted_count)
    }
}

/// Hide credentials before a connection string reaches the logs
fn redact_uri(uri: &str) -> String {
    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &uri[..scheme_end], &uri[at + 1..])
        }
        _ => uri.to_string(),
    }
}
