use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{clear_session_cookie, session_cookie, session_token_from_headers};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInPayload {
    pub email: String,
    pub password: String,
}

/// POST /auth/sign-in - password sign-in against the identity provider;
/// establishes the session cookie on success.
pub async fn sign_in(State(state): State<AppState>, Json(payload): Json<SignInPayload>) -> Response {
    match state.identity.sign_in_with_password(&payload.email, &payload.password).await {
        Ok(tokens) => (
            AppendHeaders([(header::SET_COOKIE, session_cookie(&tokens.access_token))]),
            Json(json!({ "success": true })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("Sign-in failed: {}", e);
            ApiError::unauthorized(e.to_string()).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

/// GET /auth/callback - OAuth callback leg. Exchanges the one-time code for
/// a session and lands on the dashboard; a failed exchange lands back on the
/// login surface with the provider's message. Without a code the redirect
/// still goes to the dashboard and the guard sorts the visitor out.
pub async fn callback(State(state): State<AppState>, Query(query): Query<CallbackQuery>) -> Response {
    let site = &state.config.site_url;

    if let Some(code) = query.code {
        match state.identity.exchange_code_for_session(&code).await {
            Ok(tokens) => {
                return (
                    AppendHeaders([(header::SET_COOKIE, session_cookie(&tokens.access_token))]),
                    Redirect::temporary(&format!("{}/dashboard", site)),
                )
                    .into_response();
            }
            Err(e) => {
                tracing::error!("Error exchanging code for session: {}", e);
                let encoded: String = url::form_urlencoded::byte_serialize(e.to_string().as_bytes()).collect();
                return Redirect::temporary(&format!("{}/login?error={}", site, encoded)).into_response();
            }
        }
    }

    Redirect::temporary(&format!("{}/dashboard", site)).into_response()
}

/// POST /auth/sign-out - best-effort provider sign-out, then clear the
/// session cookie and send the client back to the login surface (302).
pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token_from_headers(&headers) {
        if let Err(e) = state.identity.sign_out(&token).await {
            tracing::warn!("Provider sign-out failed: {}", e);
        }
    }

    (
        StatusCode::FOUND,
        AppendHeaders([
            (header::SET_COOKIE, clear_session_cookie()),
            (header::LOCATION, "/login".to_string()),
        ]),
    )
        .into_response()
}
