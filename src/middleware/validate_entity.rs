use std::collections::HashMap;

use axum::{
    extract::{Path, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::database::DatabaseManager;
use crate::error::ApiError;

/// Collection name taken from the `:entity` path segment, already validated
#[derive(Clone, Debug)]
pub struct ValidatedEntity(pub String);

/// Rejects collection names the store would refuse before any handler runs
pub async fn validate_entity_middleware(
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(entity) = params.get("entity") else {
        return ApiError::bad_request("Missing entity in path").into_response();
    };

    if !DatabaseManager::is_valid_collection_name(entity) {
        tracing::warn!("Rejected invalid entity name: {:?}", entity);
        return ApiError::bad_request(format!("Invalid entity name: '{}'", entity)).into_response();
    }

    request.extensions_mut().insert(ValidatedEntity(entity.clone()));
    next.run(request).await
}
