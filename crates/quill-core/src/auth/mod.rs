//! Login client and session persistence seam.
//!
//! The login service exchanges a username/password pair for a
//! [`Credential`]; session stores persist that credential across runs.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::models::Credential;
use crate::util::{compact_text, is_http_url};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Wrong credentials")]
    InvalidCredentials,
    #[error("Invalid auth configuration: {0}")]
    InvalidConfiguration(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Login API error: {0}")]
    Api(String),
    #[error("Session storage error: {0}")]
    Storage(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Persistence seam for the active credential.
///
/// Implementations store a single serialized [`Credential`] under a
/// fixed key; a missing or unreadable entry loads as `None`.
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load(&self) -> AuthResult<Option<Credential>>;
    fn save(&self, credential: &Credential) -> AuthResult<()>;
    fn clear(&self) -> AuthResult<()>;
}

/// A username/password pair submitted to the login endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> AuthResult<Self> {
        let username = username.into();
        let password = password.into();
        if username.trim().is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Username must not be empty".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Password must not be empty".to_string(),
            ));
        }
        Ok(Self { username, password })
    }
}

/// HTTP client for the login endpoint.
#[derive(Debug, Clone)]
pub struct LoginClient {
    login_url: String,
    client: Client,
}

impl LoginClient {
    pub fn new(base_url: impl AsRef<str>) -> AuthResult<Self> {
        Ok(Self {
            login_url: normalize_login_url(base_url.as_ref())?,
            client: Client::builder().build()?,
        })
    }

    /// Exchange the pair for a credential.
    ///
    /// A rejected pair surfaces as [`AuthError::InvalidCredentials`]
    /// immediately; there is no retry.
    pub async fn login(&self, request: &LoginRequest) -> AuthResult<Credential> {
        let response = self
            .client
            .post(&self.login_url)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_api_error(status, &body)));
        }

        Ok(response.json::<Credential>().await?)
    }
}

/// Normalize a base URL into the login endpoint URL.
pub fn normalize_login_url(url: &str) -> AuthResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(AuthError::InvalidConfiguration(
            "Login URL must not be empty".to_string(),
        ));
    }
    if !is_http_url(trimmed) {
        return Err(AuthError::InvalidConfiguration(
            "Login URL must include http:// or https://".to_string(),
        ));
    }
    if trimmed.ends_with("/login") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/login"))
    }
}

#[derive(Debug, serde::Deserialize)]
struct LoginErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<LoginErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
