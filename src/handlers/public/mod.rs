use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod contact;
pub mod content;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/portfolio", get(content::portfolio_list))
        .route("/portfolio/:slug", get(content::portfolio_detail))
        .route("/templates", get(content::templates_list))
        .route("/templates/:slug", get(content::template_detail))
        .route("/tutorials", get(content::tutorials_list))
        .route("/tutorials/:slug", get(content::tutorial_detail))
        .route("/api/contact", post(contact::contact_post))
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/sign-out", post(auth::sign_out))
}
