use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::middleware::GatewayContext;

/// GET / - Service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "doc-gateway",
        "version": version,
        "description": "Schema-less REST gateway over a document store",
        "endpoints": {
            "health": "GET /health",
            "list": "GET /:entity?query=<json>&fields=<csv>&page=<int>&limit=<int>",
            "create": "POST /:entity",
            "read": "GET /:entity/:id",
            "update": "PUT /:entity/:id",
            "delete": "DELETE /:entity/:id",
        }
    }))
}

/// GET /health - Store connectivity check
pub async fn health(Extension(ctx): Extension<GatewayContext>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = ctx.store.backend();

    match ctx.store.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": backend,
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": backend,
                    "database_error": e.to_string(),
                })),
            )
        }
    }
}
