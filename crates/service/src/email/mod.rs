//! Outbound email abstractions.
//!
//! The auth workflows hand an [`EmailMessage`] to an [`EmailSender`] and
//! treat any error as a failed request. Which transport is used is decided at
//! startup from the `[email]` config section:
//!
//! - `LogEmailSender` logs the message and succeeds (local development).
//! - `HttpEmailSender` posts the message as JSON to a mail API.
//! - `memory::MemoryEmailSender` keeps messages in memory for tests.

pub mod templates;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Email delivery abstraction.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error to fail the calling request.
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs the payload instead of sending real email.
#[derive(Clone, Debug, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to_email = %message.to,
            subject = %message.subject,
            body = %message.body,
            "email send stub"
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct HttpEmailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends through a JSON mail API (`POST {from, to, subject, text}`),
/// authenticating with a bearer key when one is configured.
#[derive(Clone, Debug)]
pub struct HttpEmailSender {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpEmailSender {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>, from: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), api_url: api_url.into(), api_key, from: from.into() }
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let payload = HttpEmailPayload {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
        };
        let mut req = self.client.post(&self.api_url).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        req.send()
            .await
            .context("mail api unreachable")?
            .error_for_status()
            .context("mail api rejected message")?;
        info!(to_email = %message.to, subject = %message.subject, "email sent");
        Ok(())
    }
}

/// In-memory sender for tests and doc examples.
pub mod memory {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemoryEmailSender {
        sent: Mutex<Vec<EmailMessage>>,
        fail: Mutex<bool>,
    }

    impl MemoryEmailSender {
        pub fn sent(&self) -> Vec<EmailMessage> {
            self.sent.lock().unwrap().clone()
        }

        pub fn sent_to(&self, to: &str) -> Vec<EmailMessage> {
            self.sent.lock().unwrap().iter().filter(|m| m.to == to).cloned().collect()
        }

        /// Make subsequent sends fail like an unreachable transport.
        pub fn set_failing(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }
    }

    #[async_trait]
    impl EmailSender for MemoryEmailSender {
        async fn send(&self, message: &EmailMessage) -> Result<()> {
            if *self.fail.lock().unwrap() {
                anyhow::bail!("smtp connection refused");
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }
}
