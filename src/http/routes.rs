use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/stream/status", get(handlers::get_stream_status))
        .route("/stream/start", post(handlers::start_stream))
        .route("/stream/stop", post(handlers::stop_stream))
        .route("/stream/restart", post(handlers::restart_stream))
        // Platforms
        .route("/platforms", get(handlers::list_platforms))
        .route(
            "/platforms/:platform/connect",
            post(handlers::connect_platform),
        )
        .route(
            "/platforms/:platform/disconnect",
            post(handlers::disconnect_platform),
        )
        // Event stream for the presentation layer
        .route("/events", get(handlers::studio_events))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
