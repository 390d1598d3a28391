use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

pub const DEFAULT_BASE_URL: &str = "https://api.resend.com";
pub const DEFAULT_SENDER: &str = "Technical Assessment <onboarding@resend.dev>";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Delivery settings for the report email.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    pub base_url: String,
    pub api_key: String,
    pub from: String,
    pub recipient: String,
    pub timeout: Duration,
}

impl ReportConfig {
    /// Read settings from `QUIZ_REPORT_*` variables.
    ///
    /// Returns `None` unless both an API key and a recipient are set, which
    /// leaves reporting disabled.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = non_blank(env::var("QUIZ_REPORT_API_KEY").ok())?;
        let recipient = non_blank(env::var("QUIZ_REPORT_RECIPIENT").ok())?;
        let base_url =
            non_blank(env::var("QUIZ_REPORT_BASE_URL").ok()).unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let from = non_blank(env::var("QUIZ_REPORT_FROM").ok()).unwrap_or_else(|| DEFAULT_SENDER.into());
        let timeout_secs = env::var("QUIZ_REPORT_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Some(Self {
            base_url,
            api_key,
            from,
            recipient,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    #[must_use]
    pub fn new(api_key: impl Into<String>, recipient: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            from: DEFAULT_SENDER.into(),
            recipient: recipient.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A fully rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Outbound channel for finished reports.
#[async_trait]
pub trait ReportTransport: Send + Sync {
    /// Deliver one message, returning the provider's message id when it gives one.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the message could not be handed off.
    async fn deliver(&self, email: &OutboundEmail) -> Result<Option<String>, ReportError>;
}

/// Email delivery through the Resend HTTP API.
#[derive(Clone)]
pub struct ResendTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ResendTransport {
    /// # Errors
    ///
    /// Returns `ReportError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ReportConfig) -> Result<Self, ReportError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl ReportTransport for ResendTransport {
    async fn deliver(&self, email: &OutboundEmail) -> Result<Option<String>, ReportError> {
        let url = format!("{}/emails", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiError>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| status.to_string());
            return Err(ReportError::HttpStatus { status, message });
        }

        // Any 2xx counts as delivered; the body may be empty or not JSON.
        Ok(response
            .json::<SendResponse>()
            .await
            .ok()
            .and_then(|body| body.id))
    }
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_serializes_as_provider_payload() {
        let email = OutboundEmail {
            from: DEFAULT_SENDER.into(),
            to: vec!["reviewer@example.com".into()],
            subject: "Assessment Results: 50% (IC2 - Mid-Level Engineer)".into(),
            html: "<p>hi</p>".into(),
            text: "hi".into(),
        };
        let value = serde_json::to_value(&email).unwrap();
        assert_eq!(value["from"], DEFAULT_SENDER);
        assert_eq!(value["to"][0], "reviewer@example.com");
        assert_eq!(value["html"], "<p>hi</p>");
    }

    #[test]
    fn config_defaults() {
        let config = ReportConfig::new("key", "reviewer@example.com");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.from, DEFAULT_SENDER);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(ResendTransport::new(&config).is_ok());
    }

    #[test]
    fn blank_values_are_ignored() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("x".into())).as_deref(), Some("x"));
    }
}
