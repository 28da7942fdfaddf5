use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub mod dashboard;
pub mod public;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Folio API",
            "version": version,
            "description": "Portfolio and content management backend API built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "content": "/portfolio, /templates, /tutorials [/:slug] (public)",
                "contact": "/api/contact (public)",
                "auth": "/auth/sign-in, /auth/callback, /auth/sign-out (public)",
                "dashboard": "/dashboard/* (admin only)",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.health.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
