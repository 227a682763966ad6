//! Outbound mail
//!
//! Mail is never sent from a request handler. Handlers enqueue an
//! [`EmailMessage`] on the outbox and the outbox worker hands it to the
//! configured [`Mailer`].

pub mod templates;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::MailConfig;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Mail API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Mail API rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// A plain-text message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Posts messages as JSON to a mail API
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(client: reqwest::Client, api_url: String, api_key: Option<String>, from: String) -> Self {
        Self {
            client,
            api_url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let mut request = self.client.post(&self.api_url).json(&serde_json::json!({
            "from": self.from,
            "to": message.to,
            "subject": message.subject,
            "text": message.body,
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }
}

/// Logs messages instead of sending them (development, tests)
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Email not sent (no mail API configured)"
        );
        Ok(())
    }
}

/// Pick the mailer for a configuration
pub fn from_config(config: &MailConfig, client: reqwest::Client) -> std::sync::Arc<dyn Mailer> {
    match &config.api_url {
        Some(url) => std::sync::Arc::new(HttpMailer::new(
            client,
            url.clone(),
            config.api_key.clone(),
            config.from.clone(),
        )),
        None => {
            tracing::warn!("MAIL_API_URL not set, outgoing mail will only be logged");
            std::sync::Arc::new(LogMailer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_accepts_everything() {
        let mailer = LogMailer;
        let message = templates::verification_pin("a@b.c", "123456", 15);
        assert!(mailer.send(&message).await.is_ok());
    }
}
