//! Router setup and configuration.

use axum::{Router, http::HeaderName, routing::get};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{health, id};
use crate::api::state::AppState;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let metrics_path = state.config.observability.metrics_path.clone();

    // Health and metrics routes
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(&metrics_path, get(health::metrics));

    // ID routes
    let id_routes = Router::new()
        .route("/generate", get(id::generate))
        .route("/parse", get(id::parse));

    Router::new()
        .merge(health_routes)
        .merge(id_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER)),
        )
        .with_state(state)
}
