//! In-process document store. Used by tests and `memory://` deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::matcher;
use crate::database::store::{DocumentStore, FindQuery, UpdateOutcome};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson, DatabaseError> {
        // `_id` always leads the stored document
        let id = document
            .get("_id")
            .cloned()
            .unwrap_or_else(|| Bson::ObjectId(ObjectId::new()));
        let mut stored = Document::new();
        stored.insert("_id", id.clone());
        for (key, value) in document {
            if key != "_id" {
                stored.insert(key, value);
            }
        }

        let mut collections = self.collections.write().await;
        let records = collections.entry(collection.to_string()).or_default();
        if records.iter().any(|r| r.get("_id") == Some(&id)) {
            return Err(DatabaseError::QueryError(format!(
                "E11000 duplicate key error collection: {} dup key: {{ _id: {} }}",
                collection, id
            )));
        }
        records.push(stored);
        Ok(id)
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>, DatabaseError> {
        let collections = self.collections.read().await;
        let Some(records) = collections.get(collection) else {
            return Ok(None);
        };
        for record in records {
            if matcher::matches(record, &filter)? {
                return Ok(Some(record.clone()));
            }
        }
        Ok(None)
    }

    async fn find(&self, collection: &str, query: FindQuery) -> Result<Vec<Document>, DatabaseError> {
        let collections = self.collections.read().await;
        let Some(records) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let limit = if query.limit == 0 {
            usize::MAX
        } else {
            query.limit.unsigned_abs() as usize
        };

        let mut results = Vec::new();
        let mut skipped = 0u64;
        for record in records {
            if results.len() >= limit {
                break;
            }
            if !matcher::matches(record, &query.filter)? {
                continue;
            }
            if skipped < query.skip {
                skipped += 1;
                continue;
            }
            results.push(matcher::project(record, &query.projection)?);
        }
        Ok(results)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(records) = collections.get_mut(collection) else {
            return Ok(UpdateOutcome::default());
        };
        for record in records.iter_mut() {
            if matcher::matches(record, &filter)? {
                // Apply to a copy so a failed merge leaves the record untouched
                let mut updated = record.clone();
                let changed = matcher::apply_set(&mut updated, &set)?;
                *record = updated;
                return Ok(UpdateOutcome {
                    matched: 1,
                    modified: u64::from(changed),
                });
            }
        }
        Ok(UpdateOutcome::default())
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(records) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let mut position = None;
        for (index, record) in records.iter().enumerate() {
            if matcher::matches(record, &filter)? {
                position = Some(index);
                break;
            }
        }
        match position {
            Some(index) => {
                records.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
