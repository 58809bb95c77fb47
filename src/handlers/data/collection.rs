use axum::extract::Extension;
use bson::Bson;
use serde_json::Value;

use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::format::{document_to_json, documents_to_json, json_to_document};
use crate::error::ApiError;
use crate::filter::{Filter, FilterData, ListParams};
use crate::filter::filter_where::parse_object_id;
use crate::middleware::{ApiResponse, ApiResult, GatewayContext, ValidatedEntity};

/// GET /:entity - List records matching `query`, projected by `fields`, one page at a time
pub async fn get(
    Extension(ctx): Extension<GatewayContext>,
    Extension(ValidatedEntity(entity)): Extension<ValidatedEntity>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Value> {
    let filter_data: FilterData = Filter::translate(&params, &ctx.config.filter)?;

    if ctx.config.filter.debug_logging {
        tracing::debug!(
            entity = %entity,
            page = filter_data.window.page,
            limit = filter_data.window.limit,
            "list request translated"
        );
    }

    let records = ctx
        .repository(&entity)
        .select_any(filter_data)
        .await
        .map_err(|e| ctx.store_error(e))?;

    Ok(ApiResponse::success(documents_to_json(records)))
}

/// POST /:entity - Insert one record, answering with the stored document
pub async fn post(
    Extension(ctx): Extension<GatewayContext>,
    Extension(ValidatedEntity(entity)): Extension<ValidatedEntity>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<Value> {
    let mut document = json_to_document(payload)?;

    // A client-chosen `_id` must still be a real ObjectId so GET /:entity/:id can find it
    match document.get("_id") {
        None | Some(Bson::ObjectId(_)) => {}
        Some(Bson::String(raw)) => {
            let oid = parse_object_id(raw)?;
            document.insert("_id", oid);
        }
        Some(_) => return Err(ApiError::invalid_identifier("_id must be an ObjectId string")),
    }

    let created = ctx
        .repository(&entity)
        .create_one(document)
        .await
        .map_err(|e| ctx.store_error(e))?;

    tracing::info!(entity = %entity, id = ?created.get("_id"), "record created");
    Ok(ApiResponse::created(document_to_json(created)))
}
