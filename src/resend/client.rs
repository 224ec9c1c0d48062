use std::future::Future;
use std::time::Duration;

use reqwest::Client;

use super::error::ResendError;
use super::types::{ApiErrorBody, EmailOptions, SendEmailRequest, SendEmailResponse};

const API_URL: &str = "https://api.resend.com";

/// Anything that can deliver a rendered email.
pub trait EmailSender: Send + Sync {
    fn send_email(
        &self,
        email: &EmailOptions,
    ) -> impl Future<Output = Result<SendEmailResponse, ResendError>> + Send;
}

pub struct ResendClient {
    api_key: String,
    default_from: String,
    client: Client,
    base_url: String,
}

impl ResendClient {
    pub fn new(api_key: String, default_from: String) -> Self {
        Self::with_base_url(api_key, default_from, API_URL.to_string())
    }

    /// Create a client pointing at a custom base URL (useful for testing).
    pub fn with_base_url(api_key: String, default_from: String, base_url: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            api_key,
            default_from,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl EmailSender for ResendClient {
    async fn send_email(&self, email: &EmailOptions) -> Result<SendEmailResponse, ResendError> {
        if self.api_key.is_empty() {
            return Err(ResendError::MissingApiKey);
        }

        let body = SendEmailRequest {
            from: email.from.as_deref().unwrap_or(self.default_from.as_str()),
            to: [email.to.as_str()],
            subject: &email.subject,
            html: &email.html,
            reply_to: email.reply_to.as_deref(),
            cc: &email.cc,
            bcc: &email.bcc,
        };

        tracing::debug!(to = %email.to, subject = %email.subject, "sending email via Resend");

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(1000);
            return Err(ResendError::RateLimited {
                retry_after_ms: retry_after,
            });
        }

        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or(text);
            return Err(ResendError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let sent = response.json::<SendEmailResponse>().await?;
        Ok(sent)
    }
}
