use axum::extract::{Extension, Path};
use serde_json::{json, Value};

use crate::api::extract::ApiJson;
use crate::api::format::{document_to_json, json_to_document};
use crate::error::ApiError;
use crate::filter::filter_where::parse_object_id;
use crate::middleware::{ApiResponse, ApiResult, GatewayContext, ValidatedEntity};

/// GET /:entity/:id - Fetch one record
pub async fn get(
    Extension(ctx): Extension<GatewayContext>,
    Extension(ValidatedEntity(entity)): Extension<ValidatedEntity>,
    Path((_, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let id = parse_object_id(&id)?;
    let record = ctx
        .repository(&entity)
        .select_404(id)
        .await
        .map_err(|e| ctx.store_error(e))?;

    Ok(ApiResponse::success(document_to_json(record)))
}

/// PUT /:entity/:id - Merge the body into the record (`$set`)
pub async fn put(
    Extension(ctx): Extension<GatewayContext>,
    Extension(ValidatedEntity(entity)): Extension<ValidatedEntity>,
    Path((_, id)): Path<(String, String)>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<Value> {
    let id = parse_object_id(&id)?;
    let mut changes = json_to_document(payload)?;

    // Identifiers are immutable
    changes.remove("_id");
    if changes.is_empty() {
        return Err(ApiError::bad_request("Update body must contain at least one field"));
    }

    ctx.repository(&entity)
        .update_404(id, changes)
        .await
        .map_err(|e| ctx.store_error(e))?;

    tracing::info!(entity = %entity, id = %id, "record updated");
    Ok(ApiResponse::success(json!({ "message": "Entity updated successfully." })))
}

/// DELETE /:entity/:id - Remove one record
pub async fn delete(
    Extension(ctx): Extension<GatewayContext>,
    Extension(ValidatedEntity(entity)): Extension<ValidatedEntity>,
    Path((_, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let id = parse_object_id(&id)?;
    ctx.repository(&entity)
        .delete_404(id)
        .await
        .map_err(|e| ctx.store_error(e))?;

    tracing::info!(entity = %entity, id = %id, "record deleted");
    Ok(ApiResponse::success(json!({ "message": "Entity deleted successfully." })))
}
