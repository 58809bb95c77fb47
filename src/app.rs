use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Extension, Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers;
use crate::middleware::{validate_entity_middleware, GatewayContext};

/// Build the full router around an already-connected store
pub fn app(ctx: GatewayContext) -> Router {
    let config = ctx.config.clone();

    let mut router = Router::new()
        // Service
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Generic collections
        .merge(data_routes())
        // Global middleware
        .layer(Extension(ctx))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

fn data_routes() -> Router {
    use handlers::data;

    Router::new()
        // Collection-level operations
        .route("/:entity", get(data::collection_get).post(data::collection_post))
        // Record-level operations
        .route(
            "/:entity/:id",
            get(data::record_get)
                .put(data::record_put)
                .delete(data::record_delete),
        )
        .route_layer(middleware::from_fn(validate_entity_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}
