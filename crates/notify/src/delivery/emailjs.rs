//! Transactional email provider channel (EmailJS).
//!
//! [`EmailJsClient`] posts template sends to the EmailJS REST API. The
//! client is built once at start-up from [`EmailJsConfig`] and shared by
//! every dispatch; each send is independent. Any 2xx response counts as
//! delivered regardless of what the provider does with the message later.

use async_trait::async_trait;
use serde::Serialize;

use crate::request::TemplateFields;

/// Default EmailJS send endpoint.
const DEFAULT_API_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email provider failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailProviderError {
    /// The underlying HTTP request failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("Email provider rejected send ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// No provider credentials were configured.
    #[error("Email provider is not configured")]
    NotConfigured,
}

// ---------------------------------------------------------------------------
// EmailProvider
// ---------------------------------------------------------------------------

/// Provider acknowledgement for an accepted send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendResult {
    pub status: u16,
    pub text: String,
}

/// Sends a named template with its field values.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(
        &self,
        template_id: &str,
        fields: &TemplateFields,
    ) -> Result<SendResult, EmailProviderError>;
}

// ---------------------------------------------------------------------------
// EmailJsConfig
// ---------------------------------------------------------------------------

/// Credentials and endpoint for the EmailJS REST API.
#[derive(Debug, Clone)]
pub struct EmailJsConfig {
    /// Full URL of the send endpoint.
    pub api_url: String,
    /// EmailJS service identifier.
    pub service_id: String,
    /// Public key, sent as `user_id`.
    pub public_key: String,
    /// Optional private key, sent as `accessToken`.
    pub private_key: Option<String>,
}

impl EmailJsConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if either `EMAILJS_SERVICE_ID` or `EMAILJS_PUBLIC_KEY`
    /// is not set, signalling that provider delivery is not configured.
    ///
    /// | Variable              | Required | Default                                       |
    /// |-----------------------|----------|-----------------------------------------------|
    /// | `EMAILJS_SERVICE_ID`  | yes      | —                                             |
    /// | `EMAILJS_PUBLIC_KEY`  | yes      | —                                             |
    /// | `EMAILJS_PRIVATE_KEY` | no       | —                                             |
    /// | `EMAILJS_API_URL`     | no       | `https://api.emailjs.com/api/v1.0/email/send` |
    pub fn from_env() -> Option<Self> {
        let service_id = std::env::var("EMAILJS_SERVICE_ID").ok()?;
        let public_key = std::env::var("EMAILJS_PUBLIC_KEY").ok()?;
        Some(Self {
            api_url: std::env::var("EMAILJS_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            service_id,
            public_key,
            private_key: std::env::var("EMAILJS_PRIVATE_KEY").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// EmailJsClient
// ---------------------------------------------------------------------------

/// JSON body of an EmailJS send.
#[derive(Debug, Serialize)]
struct SendBody<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a TemplateFields,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
}

/// EmailJS REST client.
pub struct EmailJsClient {
    client: reqwest::Client,
    config: EmailJsConfig,
}

impl EmailJsClient {
    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn new(client: reqwest::Client, config: EmailJsConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &EmailJsConfig {
        &self.config
    }
}

#[async_trait]
impl EmailProvider for EmailJsClient {
    async fn send(
        &self,
        template_id: &str,
        fields: &TemplateFields,
    ) -> Result<SendResult, EmailProviderError> {
        let body = SendBody {
            service_id: &self.config.service_id,
            template_id,
            user_id: &self.config.public_key,
            template_params: fields,
            access_token: self.config.private_key.as_deref(),
        };

        let response = self.client.post(&self.config.api_url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(EmailProviderError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        tracing::debug!(template_id, status = status.as_u16(), "Email provider accepted send");
        Ok(SendResult {
            status: status.as_u16(),
            text,
        })
    }
}

/// Provider used when no credentials are configured. Every send fails, so
/// dispatch falls through to the next channel or the user-facing fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledEmailProvider;

#[async_trait]
impl EmailProvider for DisabledEmailProvider {
    async fn send(
        &self,
        template_id: &str,
        _fields: &TemplateFields,
    ) -> Result<SendResult, EmailProviderError> {
        tracing::warn!(template_id, "Email provider not configured, send skipped");
        Err(EmailProviderError::NotConfigured)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
