//! Health check handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::api::state::AppState;

/// Liveness probe - always returns 200 if the service is running.
pub async fn health() -> Json<Value> {
    Json(json!({
        "code": 0,
        "message": "success",
        "data": {
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}

/// Readiness probe - ready while the generator accepts requests.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let generator_ok = state.generator.is_accepting();

    let status_code = if generator_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = Json(json!({
        "code": if generator_ok { 0 } else { 5003 },
        "message": if generator_ok { "success" } else { "service unavailable" },
        "data": {
            "ready": generator_ok,
            "components": {
                "generator": generator_ok,
                "active_sequencers": state.generator.active_sequencers()
            }
        }
    }));

    (status_code, response)
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<AppState>) -> String {
    let mut output = String::new();

    output.push_str("# HELP idgen_up Whether the service is up\n");
    output.push_str("# TYPE idgen_up gauge\n");
    output.push_str("idgen_up 1\n");

    if let Some(handle) = &state.metrics {
        output.push_str(&handle.render());
    }

    output
}
