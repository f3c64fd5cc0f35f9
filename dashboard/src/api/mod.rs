//! Typed client for the protocol's backend REST API.
//!
//! Every endpoint decodes into an explicit schema at the boundary, so a
//! malformed response fails fast with a decoding error instead of leaking
//! half-shaped data into the views. Responses arrive wrapped in the
//! backend's `{success, data, error}` envelope.

pub mod health;
pub mod mint;
pub mod oracle;
pub mod transaction;
pub mod vault;

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use shared::ApiResponse;

use crate::config::Config;
use crate::session::Session;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Option<Session>,
}

impl ApiClient {
    pub fn new(config: &Config, session: Option<Session>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()
            .map_err(|e| ApiError::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.get(format!("{}{}", self.base_url, path)))
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.post(format!("{}{}", self.base_url, path)))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session {
            Some(session) => request.bearer_auth(session.access_token()),
            None => request,
        }
    }

    async fn decode<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        let body = response.text().await?;
        parse_envelope(status, &body)
    }
}

/// Unwrap the backend envelope, failing fast on malformed bodies.
fn parse_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    let envelope: ApiResponse<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => return Err(ApiError::Decode(e.to_string())),
        Err(_) => return Err(ApiError::Backend(format!("request failed with status {}", status))),
    };

    if !envelope.success {
        return Err(ApiError::Backend(
            envelope
                .error
                .unwrap_or_else(|| format!("request failed with status {}", status)),
        ));
    }

    envelope
        .data
        .ok_or_else(|| ApiError::Decode("missing data in successful response".to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Http(e.to_string())
    }
}
