use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{DatabaseError, Repository, StoreHandle};
use crate::error::ApiError;

/// Shared handler dependencies, installed once as a router extension
#[derive(Clone)]
pub struct GatewayContext {
    pub store: StoreHandle,
    pub config: Arc<AppConfig>,
}

impl GatewayContext {
    pub fn new(store: StoreHandle, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn repository(&self, entity: &str) -> Repository {
        Repository::new(entity, self.store.clone())
            .with_query_logging(self.config.database.enable_query_logging)
    }

    /// Map a store error according to the configured exposure policy
    pub fn store_error(&self, err: DatabaseError) -> ApiError {
        ApiError::from_database(err, self.config.api.expose_store_errors)
    }
}
