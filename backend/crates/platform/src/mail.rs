//! Mail Transport Infrastructure
//!
//! Outbound mail behind a trait so the application layer never knows which
//! delivery mechanism is in use. The production implementation talks to an
//! HTTP mail-delivery API; development setups log the message instead.

use serde::Serialize;
use thiserror::Error;

/// Mail transport errors
#[derive(Debug, Error)]
pub enum MailError {
    /// The delivery API rejected or failed the send
    #[error("Failed to send mail: {0}")]
    SendFailed(String),
}

/// An outbound message
#[derive(Debug, Clone, Serialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Mail transport trait
#[trait_variant::make(MailTransport: Send)]
pub trait LocalMailTransport {
    /// Deliver a single message. Completion means the transport accepted
    /// it, not that it reached the inbox.
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

// ============================================================================
// HTTP mail-delivery API transport
// ============================================================================

/// Transport posting messages to an HTTP mail-delivery API as JSON,
/// authenticated with a bearer key.
#[derive(Clone)]
pub struct HttpMailer {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpMailer {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl MailTransport for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await
            .map_err(|e| MailError::SendFailed(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(MailError::SendFailed(format!(
                "mail API returned {}: {}",
                status, body
            )))
        }
    }
}

// ============================================================================
// Console transport (development)
// ============================================================================

/// Transport that logs messages instead of delivering them.
#[derive(Clone, Default)]
pub struct ConsoleMailer;

impl MailTransport for ConsoleMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Mail (console transport, not delivered)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serializes_with_expected_fields() {
        let message = MailMessage {
            from: "noreply@example.com".to_string(),
            to: "user@example.com".to_string(),
            subject: "Password recovery".to_string(),
            html: "<p>link</p>".to_string(),
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["from"], "noreply@example.com");
        assert_eq!(json["to"], "user@example.com");
        assert_eq!(json["subject"], "Password recovery");
        assert_eq!(json["html"], "<p>link</p>");
    }

    #[tokio::test]
    async fn test_console_mailer_accepts() {
        let mailer = ConsoleMailer;
        let message = MailMessage {
            from: "a@x.com".to_string(),
            to: "b@x.com".to_string(),
            subject: "s".to_string(),
            html: "h".to_string(),
        };
        assert!(MailTransport::send(&mailer, &message).await.is_ok());
    }
}
