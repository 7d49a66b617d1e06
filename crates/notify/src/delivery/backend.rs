//! Confirmation/newsletter HTTP backend channel.
//!
//! [`HttpEmailBackend`] calls the email backend's JSON endpoints:
//!
//! ```text
//! POST {base}/email/confirmation   {"email", "name"}
//! POST {base}/email/newsletter     {"email"}
//! ```
//!
//! Both answer `{"message": ...}` on success. Any non-2xx status or network
//! error is a failure; requests are never retried.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default backend base URL for local development.
const DEFAULT_BACKEND_URL: &str = "http://localhost:3001";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email backend failures.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The underlying HTTP request failed (network, DNS, timeout, body decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Email backend returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// EmailBackend
// ---------------------------------------------------------------------------

/// Success body returned by both backend endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendResponse {
    pub message: String,
}

/// Request body for `POST /email/confirmation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationEmailRequest {
    pub email: String,
    pub name: String,
}

/// Request body for `POST /email/newsletter`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterEmailRequest {
    pub email: String,
}

/// Remote service that sends confirmation and newsletter emails.
#[async_trait]
pub trait EmailBackend: Send + Sync {
    async fn send_confirmation(
        &self,
        email: &str,
        name: &str,
    ) -> Result<BackendResponse, BackendError>;

    async fn subscribe_newsletter(&self, email: &str) -> Result<BackendResponse, BackendError>;
}

// ---------------------------------------------------------------------------
// BackendConfig
// ---------------------------------------------------------------------------

/// Location of the email backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL without trailing slash, e.g. `https://api.example.com`.
    pub base_url: String,
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable            | Default                 |
    /// |---------------------|-------------------------|
    /// | `EMAIL_BACKEND_URL` | `http://localhost:3001` |
    pub fn from_env() -> Self {
        let base_url = std::env::var("EMAIL_BACKEND_URL")
            .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        Self::new(base_url)
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// HttpEmailBackend
// ---------------------------------------------------------------------------

/// `reqwest`-based [`EmailBackend`].
pub struct HttpEmailBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

impl HttpEmailBackend {
    /// Create a backend client reusing an existing [`reqwest::Client`].
    pub fn new(client: reqwest::Client, config: BackendConfig) -> Self {
        Self { client, config }
    }

    /// Execute a single POST request and check the response status.
    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<BackendResponse, BackendError> {
        let url = format!("{}{path}", self.config.base_url);
        let response = self.client.post(&url).json(body).send().await?;
        if !response.status().is_success() {
            return Err(BackendError::HttpStatus(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl EmailBackend for HttpEmailBackend {
    async fn send_confirmation(
        &self,
        email: &str,
        name: &str,
    ) -> Result<BackendResponse, BackendError> {
        let body = ConfirmationEmailRequest {
            email: email.to_string(),
            name: name.to_string(),
        };
        self.post("/email/confirmation", &body).await
    }

    async fn subscribe_newsletter(&self, email: &str) -> Result<BackendResponse, BackendError> {
        let body = NewsletterEmailRequest {
            email: email.to_string(),
        };
        self.post("/email/newsletter", &body).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
