//! Notification transport seams
//!
//! Email and SMS delivery are external collaborators. The engine talks to
//! them through narrow traits; the implementations here post JSON to the
//! gateway services that own the actual transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use crate::config::NotificationConfig;

/// Failure of a single notification channel.
///
/// Reported as a value in the channel's `ChannelResult`; never aborts the
/// sibling channel or the evaluation cycle.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Transport-level failure (connect, TLS, timeout inside the client)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Gateway accepted the connection but rejected the send
    #[error("Gateway returned {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        body: String,
    },

    /// Recipient failed syntax validation before any network call
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

/// Email delivery seam
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Send one email
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ChannelError>;
}

/// SMS delivery seam
#[async_trait]
pub trait SmsTransport: Send + Sync {
    /// Send one SMS
    async fn send(&self, to: &str, body: &str) -> Result<(), ChannelError>;
}

/// Email gateway client posting JSON to the mail service
pub struct HttpEmailGateway {
    client: Client,
    endpoint: String,
    from: String,
}

/// SMS gateway client posting JSON to the SMS service
pub struct HttpSmsGateway {
    client: Client,
    endpoint: String,
}

fn gateway_client() -> Result<Client, ChannelError> {
    Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| ChannelError::Http(e.to_string()))
}

impl HttpEmailGateway {
    /// Build a gateway client from the notification config
    pub fn from_config(config: &NotificationConfig) -> Result<Self, ChannelError> {
        Ok(Self {
            client: gateway_client()?,
            endpoint: config.email_gateway_url.clone(),
            from: config.email_from.clone(),
        })
    }
}

impl HttpSmsGateway {
    /// Build a gateway client from the notification config
    pub fn from_config(config: &NotificationConfig) -> Result<Self, ChannelError> {
        Ok(Self {
            client: gateway_client()?,
            endpoint: config.sms_gateway_url.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct SmsPayload<'a> {
    to: &'a str,
    message: &'a str,
}

async fn check_response(response: reqwest::Response) -> Result<(), ChannelError> {
    if response.status().is_success() {
        return Ok(());
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(ChannelError::Rejected { status, body })
}

#[async_trait]
impl EmailTransport for HttpEmailGateway {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ChannelError> {
        if !to.contains('@') {
            return Err(ChannelError::InvalidRecipient(to.to_string()));
        }

        let payload = EmailPayload {
            from: &self.from,
            to,
            subject,
            body,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChannelError::Http(e.to_string()))?;

        check_response(response).await?;

        info!(to, "Email notification sent");
        Ok(())
    }
}

#[async_trait]
impl SmsTransport for HttpSmsGateway {
    async fn send(&self, to: &str, body: &str) -> Result<(), ChannelError> {
        if !to.starts_with('+') || to.len() < 8 {
            return Err(ChannelError::InvalidRecipient(to.to_string()));
        }

        let payload = SmsPayload { to, message: body };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChannelError::Http(e.to_string()))?;

        check_response(response).await?;

        info!(to, "SMS notification sent");
        Ok(())
    }
}
