use std::time::Instant;

use bson::{doc, oid::ObjectId, Bson, Document};

use crate::database::manager::{DatabaseError, StoreHandle};
use crate::database::store::FindQuery;
use crate::filter::FilterData;

const NOT_FOUND: &str = "Entity not found.";

/// One collection's worth of CRUD over the shared store
pub struct Repository {
    collection: String,
    store: StoreHandle,
    query_logging: bool,
}

impl Repository {
    pub fn new(collection: impl Into<String>, store: StoreHandle) -> Self {
        Self {
            collection: collection.into(),
            store,
            query_logging: false,
        }
    }

    pub fn with_query_logging(mut self, enabled: bool) -> Self {
        self.query_logging = enabled;
        self
    }

    /// Insert a document, assigning an ObjectId when it has no `_id`.
    /// Returns the document as stored.
    pub async fn create_one(&self, mut document: Document) -> Result<Document, DatabaseError> {
        if !document.contains_key("_id") {
            let mut with_id = doc! { "_id": ObjectId::new() };
            for (key, value) in document {
                with_id.insert(key, value);
            }
            document = with_id;
        }

        let started = Instant::now();
        self.store.insert_one(&self.collection, document.clone()).await?;
        self.log("insert_one", started);
        Ok(document)
    }

    pub async fn select_any(&self, filter_data: FilterData) -> Result<Vec<Document>, DatabaseError> {
        let query = FindQuery::from(filter_data);
        if self.query_logging {
            tracing::debug!(
                collection = %self.collection,
                filter = %query.filter,
                projection = %query.projection,
                skip = query.skip,
                limit = query.limit,
                "find"
            );
        }

        let started = Instant::now();
        let records = self.store.find(&self.collection, query).await?;
        self.log("find", started);
        Ok(records)
    }

    pub async fn select_404(&self, id: ObjectId) -> Result<Document, DatabaseError> {
        let started = Instant::now();
        let record = self.store.find_one(&self.collection, by_id(id)).await?;
        self.log("find_one", started);
        record.ok_or_else(|| DatabaseError::NotFound(NOT_FOUND.to_string()))
    }

    /// `$set` the given fields on one record; 404 when nothing matched
    pub async fn update_404(&self, id: ObjectId, changes: Document) -> Result<(), DatabaseError> {
        let started = Instant::now();
        let outcome = self.store.update_one(&self.collection, by_id(id), changes).await?;
        self.log("update_one", started);
        if outcome.matched == 0 {
            return Err(DatabaseError::NotFound(NOT_FOUND.to_string()));
        }
        Ok(())
    }

    pub async fn delete_404(&self, id: ObjectId) -> Result<(), DatabaseError> {
        let started = Instant::now();
        let deleted = self.store.delete_one(&self.collection, by_id(id)).await?;
        self.log("delete_one", started);
        if deleted == 0 {
            return Err(DatabaseError::NotFound(NOT_FOUND.to_string()));
        }
        Ok(())
    }

    fn log(&self, operation: &str, started: Instant) {
        if self.query_logging {
            tracing::debug!(
                collection = %self.collection,
                backend = self.store.backend(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "{} completed",
                operation
            );
        }
    }
}

fn by_id(id: ObjectId) -> Document {
    doc! { "_id": Bson::ObjectId(id) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::filter::PageWindow;
    use std::sync::Arc;

    fn repository() -> Repository {
        Repository::new("widgets", Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn create_then_select_returns_same_document() {
        let repo = repository();
        let created = repo.create_one(doc! { "color": "red" }).await.unwrap();
        let id = created.get_object_id("_id").unwrap();

        let fetched = repo.select_404(id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.get_str("color").unwrap(), "red");
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let repo = repository();
        let id = ObjectId::new();
        assert!(matches!(repo.select_404(id).await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(repo.update_404(id, doc! { "a": 1 }).await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(repo.delete_404(id).await, Err(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn select_any_pages_results() {
        let repo = repository();
        for n in 0..7 {
            repo.create_one(doc! { "n": n }).await.unwrap();
        }
        let data = FilterData {
            filter: Document::new(),
            projection: doc! { "_id": 0 },
            window: PageWindow::new(2, 3),
        };
        let page = repo.select_any(data).await.unwrap();
        assert_eq!(page, vec![doc! { "n": 3 }, doc! { "n": 4 }, doc! { "n": 5 }]);
    }
}
