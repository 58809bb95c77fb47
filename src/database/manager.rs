use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::memory::MemoryStore;
use crate::database::mongo::MongoStore;
use crate::database::store::DocumentStore;

/// Errors surfaced by the document store layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),
}

impl From<mongodb::error::Error> for DatabaseError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;
        match *err.kind {
            ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) | ErrorKind::DnsResolve { .. } => {
                DatabaseError::ConnectionError(err.to_string())
            }
            _ => DatabaseError::QueryError(err.to_string()),
        }
    }
}

pub type StoreHandle = Arc<dyn DocumentStore>;

/// Builds the process-wide store once at startup
pub struct DatabaseManager;

impl DatabaseManager {
    const MEMORY_SCHEME: &'static str = "memory://";

    /// Connect to the configured backend. `memory://` selects the in-process
    /// store, anything else is handed to the MongoDB driver.
    pub async fn connect(config: &DatabaseConfig) -> Result<StoreHandle, DatabaseError> {
        if config.url.starts_with(Self::MEMORY_SCHEME) {
            info!("Using in-memory document store");
            return Ok(Arc::new(MemoryStore::new()));
        }

        let store = MongoStore::connect(&config.url, &config.name, config.connection_timeout_ms).await?;
        Ok(Arc::new(store))
    }

    /// Collection names follow MongoDB's restrictions: non-empty, no `$` or NUL,
    /// not in the reserved `system.` namespace, and short enough to fit a namespace.
    pub fn is_valid_collection_name(name: &str) -> bool {
        const MAX_LEN: usize = 120;
        !name.is_empty()
            && name.len() <= MAX_LEN
            && !name.contains('$')
            && !name.contains('\0')
            && !name.starts_with("system.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_collection_names() {
        assert!(DatabaseManager::is_valid_collection_name("widgets"));
        assert!(DatabaseManager::is_valid_collection_name("order-items.v2"));
        assert!(!DatabaseManager::is_valid_collection_name(""));
        assert!(!DatabaseManager::is_valid_collection_name("bad$name"));
        assert!(!DatabaseManager::is_valid_collection_name("system.users"));
        assert!(!DatabaseManager::is_valid_collection_name(&"x".repeat(121)));
    }

    #[tokio::test]
    async fn memory_url_selects_memory_store() {
        let config = DatabaseConfig {
            url: "memory://".to_string(),
            name: "test".to_string(),
            connection_timeout_ms: 100,
            enable_query_logging: false,
        };
        let store = DatabaseManager::connect(&config).await.unwrap();
        assert_eq!(store.backend(), "memory");
        store.ping().await.unwrap();
    }
}
