use async_trait::async_trait;
use bson::{Bson, Document};

use crate::database::manager::DatabaseError;
use crate::filter::FilterData;

/// Parameters of a multi-document read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    pub filter: Document,
    /// Empty means all fields
    pub projection: Document,
    pub skip: u64,
    /// 0 means unlimited
    pub limit: i64,
}

impl From<FilterData> for FindQuery {
    fn from(data: FilterData) -> Self {
        Self {
            filter: data.filter,
            projection: data.projection,
            skip: data.window.skip,
            limit: data.window.limit,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Minimal document-store client used by the gateway.
/// Every operation addresses a collection by name; collections spring into
/// existence on first write.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), DatabaseError>;

    /// Insert a document, returning its `_id`
    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson, DatabaseError>;

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>, DatabaseError>;

    async fn find(&self, collection: &str, query: FindQuery) -> Result<Vec<Document>, DatabaseError>;

    /// Apply `$set` semantics to the first matching document
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, DatabaseError>;

    /// Delete the first matching document, returning the number removed
    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, DatabaseError>;
}
