use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::database::contact::NewContactMessage;
use crate::state::AppState;

/// POST /api/contact - validate and persist a contact form submission.
pub async fn contact_post(
    State(state): State<AppState>,
    payload: Result<Json<NewContactMessage>, JsonRejection>,
) -> Response {
    // Malformed bodies become a generic 500 with the detail logged
    let Json(message) = match payload {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Unexpected error in contact API: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error occurred." })),
            )
                .into_response();
        }
    };

    if message.name.trim().is_empty() || message.email.trim().is_empty() || message.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Name, email, and message are required." })),
        )
            .into_response();
    }

    if let Err(e) = state.contact.insert(&message).await {
        tracing::error!("Contact message insert error: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to save message. Database error." })),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(json!({ "message": "Your message has been sent successfully!" })),
    )
        .into_response()
}
