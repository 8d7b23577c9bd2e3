//! HTTP client for the remote notes collection.

use reqwest::{Client, RequestBuilder, StatusCode};
use thiserror::Error;

use crate::models::{Note, NoteDraft, NoteId};
use crate::util::{compact_text, is_http_url};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Note {0} was not found on the server")]
    NotFound(NoteId),
    #[error("Invalid notes API configuration: {0}")]
    InvalidConfiguration(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Notes API error: {0}")]
    Api(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Client for the notes collection endpoint.
///
/// The bearer token is held on the client value itself; callers that
/// need authenticated calls install it after login and pass the client
/// around explicitly. There is no process-global token state.
#[derive(Debug, Clone)]
pub struct NotesClient {
    collection_url: String,
    bearer_token: Option<String>,
    client: Client,
}

impl NotesClient {
    pub fn new(base_url: impl AsRef<str>) -> ApiResult<Self> {
        Ok(Self {
            collection_url: normalize_collection_url(base_url.as_ref())?,
            bearer_token: None,
            client: Client::builder().build()?,
        })
    }

    /// Install the bearer token used on subsequent calls.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.bearer_token = Some(token.into());
    }

    /// Remove the installed bearer token; subsequent calls go out
    /// unauthenticated.
    pub fn clear_token(&mut self) {
        self.bearer_token = None;
    }

    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.bearer_token.is_some()
    }

    /// Fetch the full ordered note collection.
    pub async fn get_all(&self) -> ApiResult<Vec<Note>> {
        let response = self
            .authorized(self.client.get(&self.collection_url))
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json::<Vec<Note>>().await?)
    }

    /// Submit a new note; the server responds with the assigned record.
    pub async fn create(&self, draft: &NoteDraft) -> ApiResult<Note> {
        let response = self
            .authorized(self.client.post(&self.collection_url))
            .json(draft)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json::<Note>().await?)
    }

    /// Replace a note by id, returning the updated record.
    ///
    /// A note deleted server-side in the meantime surfaces as
    /// [`ApiError::NotFound`].
    pub async fn update(&self, id: NoteId, note: &Note) -> ApiResult<Note> {
        let url = format!("{}/{id}", self.collection_url);
        let response = self
            .authorized(self.client.put(&url))
            .json(note)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id));
        }

        let response = check_status(response).await?;
        Ok(response.json::<Note>().await?)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.bearer_token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn check_status(response: reqwest::Response) -> ApiResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Api(parse_api_error(status, &body)))
    }
}

fn normalize_collection_url(url: &str) -> ApiResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::InvalidConfiguration(
            "Notes API URL must not be empty".to_string(),
        ));
    }
    if !is_http_url(trimmed) {
        return Err(ApiError::InvalidConfiguration(
            "Notes API URL must include http:// or https://".to_string(),
        ));
    }
    if trimmed.ends_with("/notes") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/notes"))
    }
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.error.or(payload.message) {
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
