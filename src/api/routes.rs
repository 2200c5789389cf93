//! API Route Configuration

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::{logging_middleware, rate_limit_middleware};

/// Create the router with all routes and middleware
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` so the
/// rate limiter can key clients by peer address.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // JSON routes
    let api_v1 = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/page", get(handlers::describe_page))
        .route("/stats", get(handlers::get_stats));

    Router::new()
        // Wrapper pages
        .route("/", get(handlers::serve_page))
        .route("/embed", get(handlers::serve_embed))
        .route("/redirect", get(handlers::serve_redirect))
        .nest("/v1", api_v1)
        .route("/health", get(handlers::health_check))
        .fallback(handlers::not_found)
        .with_state(state.clone())
        // Middleware (order matters - bottom runs first)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn_with_state(state, rate_limit_middleware))
}
