use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::PlatformConfig;

/// Name of the cookie carrying the provider-issued access token.
pub const SESSION_COOKIE: &str = "session_token";

/// User identity as resolved by the external provider. Immutable from this
/// system's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Tokens issued by the provider at sign-in / code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("{0}")]
    Provider(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Gateway to the external identity/session provider. This system never
/// issues or verifies tokens itself; every call is a round trip to the
/// provider's REST API.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the user behind an access token. Any failure means "no user".
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<SessionTokens, AuthError>;

    /// OAuth callback leg: trade a one-time code for a session.
    async fn exchange_code_for_session(&self, code: &str) -> Result<SessionTokens, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

/// Production identity gateway backed by the hosted platform's auth API.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl HttpIdentityProvider {
    pub fn new(platform: &PlatformConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{}/auth/v1", platform.url),
            anon_key: platform.anon_key.clone(),
        }
    }

    async fn provider_error(response: reqwest::Response) -> AuthError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("msg")
                    .or_else(|| v.get("error_description"))
                    .or_else(|| v.get("message"))
                    .and_then(|m| m.as_str().map(String::from))
            })
            .unwrap_or_else(|| format!("auth request failed with status {}", status));
        AuthError::Provider(detail)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .get(format!("{}/user", self.base_url))
            .bearer_auth(access_token)
            .header("apikey", &self.anon_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::NotAuthenticated);
        }
        Ok(response.json::<AuthUser>().await?)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<SessionTokens, AuthError> {
        let response = self
            .client
            .post(format!("{}/token?grant_type=password", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }
        Ok(response.json::<SessionTokens>().await?)
    }

    async fn exchange_code_for_session(&self, code: &str) -> Result<SessionTokens, AuthError> {
        let response = self
            .client
            .post(format!("{}/token?grant_type=authorization_code", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "auth_code": code }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }
        Ok(response.json::<SessionTokens>().await?)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(format!("{}/logout", self.base_url))
            .bearer_auth(access_token)
            .header("apikey", &self.anon_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }
        Ok(())
    }
}

/// Extract the session token from request headers: the session cookie first,
/// falling back to an `Authorization: Bearer` header.
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(cookie_header) = headers.get("cookie").and_then(|v| v.to_str().ok()) {
        for pair in cookie_header.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            if parts.next() == Some(SESSION_COOKIE) {
                if let Some(value) = parts.next() {
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
    }

    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))?
        .to_str()
        .ok()?;
    let token = auth_header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// `Set-Cookie` value establishing the session cookie.
pub fn session_cookie(access_token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, access_token)
}

/// `Set-Cookie` value clearing the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
