pub mod health;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;
use crate::summary::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Called by AgilePoint forms
        .route("/hse-summary", post(handlers::handle_hse_summary))
        .route("/hse-summary-item", post(handlers::handle_item_summary))
        .route(
            "/hse-summary-incident",
            post(handlers::handle_incident_summary),
        )
        .with_state(state)
}

/// Any origin may call the bridge; preflight requests are answered here.
// TODO: restrict allow_origin to the AgilePoint tenant host once it is fixed per environment
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
