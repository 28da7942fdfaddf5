use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::{session_token_from_headers, IdentityProvider};
use crate::database::profiles::ProfileStore;
use crate::state::AppState;

pub const PROTECTED_PREFIX: &str = "/dashboard";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// Decide what to do with a request given its path and session token.
///
/// The user is always re-resolved against the identity provider; nothing
/// client-supplied is trusted. Every resolution failure is treated as deny,
/// and denied requests are redirected rather than answered with an error so
/// the protected route surface stays invisible to outsiders.
pub async fn evaluate(
    identity: &dyn IdentityProvider,
    profiles: &dyn ProfileStore,
    path: &str,
    token: Option<&str>,
) -> GuardDecision {
    let is_protected = path.starts_with(PROTECTED_PREFIX);

    let user = match token {
        Some(token) => identity.get_user(token).await.ok(),
        None => None,
    };

    let Some(user) = user else {
        if is_protected {
            tracing::warn!("Route guard: no verified user, redirecting to login");
            let from: String = url::form_urlencoded::byte_serialize(path.as_bytes()).collect();
            return GuardDecision::Redirect(format!("{}?redirectedFrom={}", LOGIN_PATH, from));
        }
        return GuardDecision::Allow;
    };

    // Already signed in: keep the login surface out of reach
    if path == LOGIN_PATH {
        return GuardDecision::Redirect(PROTECTED_PREFIX.to_string());
    }

    if is_protected {
        return match profiles.is_admin(user.id).await {
            Ok(Some(true)) => GuardDecision::Allow,
            Ok(_) => {
                tracing::warn!("Route guard: verified user {} is not admin, redirecting", user.id);
                GuardDecision::Redirect("/".to_string())
            }
            Err(e) => {
                tracing::warn!("Route guard: profile lookup failed for {}: {}", user.id, e);
                GuardDecision::Redirect("/".to_string())
            }
        };
    }

    GuardDecision::Allow
}

/// Edge middleware applying [`evaluate`] to every incoming request.
pub async fn route_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let token = session_token_from_headers(request.headers());

    match evaluate(state.identity.as_ref(), state.profiles.as_ref(), &path, token.as_deref()).await {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(to) => Redirect::temporary(&to).into_response(),
    }
}
