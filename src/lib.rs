use axum::routing::get;
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod actions;
pub mod auth;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod storage;

#[cfg(test)]
pub mod testing;

use state::AppState;

/// Build the full application router: public read paths, auth endpoints,
/// the contact endpoint, and the guarded dashboard surface.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(handlers::public::routes())
        .merge(handlers::dashboard::routes())
        // The guard sees every request before any handler runs
        .layer(axum::middleware::from_fn_with_state(state.clone(), middleware::route_guard))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
