use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::state::PreferencesDoc;

use super::types::{AuthResponse, Movie, NewsArticle, PreferencesEnvelope};

/// Errors surfaced by the dashboard API client.
///
/// Transient failures (network, timeout, 5xx) are retried internally before
/// being returned; rejections carry the server's `{ "error": ... }` message
/// so callers can show it verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Base URL in the configuration could not be parsed.
    #[error("Invalid API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Non-2xx response; `message` comes from the server's error body when present
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// 401/403 response: credentials invalid or token expired/absent
    #[error("{0}")]
    Unauthorized(String),
    /// Response body did not match the documented shape
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Human-readable message for feed state, with a fallback when the error
    /// carries no usable text.
    pub fn feed_message(&self, fallback: &str) -> String {
        let msg = self.to_string();
        if msg.trim().is_empty() {
            fallback.to_string()
        } else {
            msg
        }
    }
}

/// Error body shape shared by all non-2xx server responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

// ============================================================================
// ApiClient
// ============================================================================

/// HTTP client for the dashboard API server.
///
/// Wraps every request in a timeout and retries transient failures
/// (network errors, timeouts, 5xx) with a fixed delay between attempts.
/// Client errors (4xx) fail immediately with the server's message.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl ApiClient {
    /// Create a client for the given base URL (e.g. `http://localhost:5000/api`).
    pub fn new(
        base_url: &str,
        timeout: Duration,
        max_retries: u32,
        retry_delay: Duration,
    ) -> Result<Self, ApiError> {
        // Validate early so a typo'd config fails at startup, not mid-fetch
        Url::parse(base_url)?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            timeout,
            max_retries,
            retry_delay,
        })
    }

    /// Create a client from application configuration.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
            config.max_retries,
            Duration::from_millis(config.retry_delay_ms),
        )
    }

    /// Attach a bearer token. Subsequent requests send `Authorization: Bearer <token>`.
    pub fn set_token(&mut self, token: SecretString) {
        self.token = Some(token);
    }

    /// Whether a bearer token is attached.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    // ========================================================================
    // Auth
    // ========================================================================

    /// `POST /auth/login`. Invalid credentials surface as [`ApiError::Unauthorized`].
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.post_json(
            &format!("{}/auth/login", self.base_url),
            &serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    /// `POST /auth/register`. Duplicate accounts and weak passwords surface as
    /// [`ApiError::Rejected`] with the server's message.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.post_json(
            &format!("{}/auth/register", self.base_url),
            &serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    // ========================================================================
    // Content Feeds
    // ========================================================================

    /// `GET /news/{category}`: ordered list of articles for a topic.
    pub async fn fetch_news(&self, category: &str) -> Result<Vec<NewsArticle>, ApiError> {
        self.get_json(&format!("{}/news/{}", self.base_url, category))
            .await
    }

    /// `GET /movies`: popular movies list.
    pub async fn fetch_movies(&self) -> Result<Vec<Movie>, ApiError> {
        self.get_json(&format!("{}/movies", self.base_url)).await
    }

    // ========================================================================
    // Preference Sync
    // ========================================================================

    /// `GET /user/preferences`: the server's copy of the preferences aggregate.
    /// Requires a bearer token.
    pub async fn get_preferences(&self) -> Result<PreferencesDoc, ApiError> {
        let envelope: PreferencesEnvelope = self
            .get_json(&format!("{}/user/preferences", self.base_url))
            .await?;
        Ok(envelope.preferences)
    }

    /// `PUT /user/preferences`: replace the server's copy of the aggregate.
    /// Requires a bearer token.
    pub async fn put_preferences(&self, doc: &PreferencesDoc) -> Result<(), ApiError> {
        let request = self
            .with_auth(self.client.put(format!("{}/user/preferences", self.base_url)))
            .json(doc);
        self.send_with_retry(request).await?;
        Ok(())
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self
            .send_with_retry(self.with_auth(self.client.get(url)))
            .await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        let response = self
            .send_with_retry(self.with_auth(self.client.post(url)).json(body))
            .await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send a request, retrying transient failures up to `max_retries` times.
    ///
    /// Retried: network errors, timeouts, 5xx responses.
    /// Not retried: 4xx responses (converted to `Rejected`/`Unauthorized`).
    async fn send_with_retry(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let mut attempt: u32 = 0;
        loop {
            let request = builder
                .try_clone()
                .ok_or_else(|| ApiError::Decode("request body is not cloneable".to_string()))?;

            match tokio::time::timeout(self.timeout, request.send()).await {
                Err(_) => {
                    if attempt >= self.max_retries {
                        return Err(ApiError::Timeout);
                    }
                    tracing::warn!(attempt = attempt, "Request timed out, retrying");
                }
                Ok(Err(e)) => {
                    if attempt >= self.max_retries {
                        return Err(ApiError::Network(e));
                    }
                    tracing::warn!(attempt = attempt, error = %e, "Request failed, retrying");
                }
                Ok(Ok(response)) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    if status.is_server_error() && attempt < self.max_retries {
                        tracing::warn!(
                            attempt = attempt,
                            status = %status,
                            "Server error, retrying"
                        );
                    } else {
                        return Err(Self::rejection(response).await);
                    }
                }
            }

            tokio::time::sleep(self.retry_delay).await;
            attempt += 1;
        }
    }

    /// Convert a non-2xx response into an error, preferring the server's
    /// `{ "error": ... }` message over a generic status line.
    async fn rejection(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .map(|body| body.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP error! status: {}", status));

        if status == 401 || status == 403 {
            ApiError::Unauthorized(message)
        } else {
            ApiError::Rejected { status, message }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
