// handlers/public/service.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - Service banner and route overview
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Kitten Rating API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "kittens": "/kittens/[:id/] (read public, write owner)",
            "kittens_by_breed": "/kittens/breed/:breed_name/ (public)",
            "breeds": "/breeds/[:id/] (public, read-only)",
            "ratings": "/ratings/ (authenticated)",
            "register": "/register/ (public)",
            "token": "/token/, /token/refresh/ (public)",
        }
    }))
}

/// GET /health - Liveness plus a store round trip
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
