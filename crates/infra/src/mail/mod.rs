//! Mail transport boundary.
//!
//! The dispatcher renders addressed plain-text messages and hands them to a
//! [`MailClient`]. Delivery is the transport's problem; the recording client
//! stands in for dev and tests, the SMTP client (feature `smtp`) talks to a
//! real relay.

pub mod templates;

#[cfg(feature = "smtp")]
mod smtp;
#[cfg(feature = "smtp")]
pub use smtp::SmtpMailClient;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// An addressed, ready-to-send message. Bodies are plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait MailClient: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;

    /// Address the transport sends from.
    fn sender(&self) -> &str;
}

pub type DynMailClient = Arc<dyn MailClient>;

/// Records messages instead of delivering them.
///
/// Can be told to fail for specific recipients, which is how the tests
/// exercise per-recipient failure isolation in the dispatcher.
#[derive(Debug)]
pub struct RecordingMailClient {
    sender: String,
    sent: Mutex<Vec<EmailMessage>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingMailClient {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            sent: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn arc(sender: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(sender))
    }

    /// Every message recorded so far, in send order.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Make future sends to `address` fail.
    pub fn fail_for(&self, address: impl Into<String>) {
        self.failing.lock().unwrap().insert(address.into());
    }
}

#[async_trait]
impl MailClient for RecordingMailClient {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        if self.failing.lock().unwrap().contains(&message.to) {
            return Err(MailError::Delivery(format!(
                "recipient {} rejected by transport",
                message.to
            )));
        }
        tracing::info!(to = %message.to, subject = %message.subject, "recorded outgoing mail");
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    fn sender(&self) -> &str {
        &self.sender
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str) -> EmailMessage {
        EmailMessage {
            to: to.to_string(),
            subject: "subject".to_string(),
            body: "body".to_string(),
        }
    }

    #[tokio::test]
    async fn records_messages_in_order() {
        let client = RecordingMailClient::new("reports@example.com");
        client.send(message("a@example.com")).await.unwrap();
        client.send(message("b@example.com")).await.unwrap();

        let sent = client.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "a@example.com");
        assert_eq!(sent[1].to, "b@example.com");
    }

    #[tokio::test]
    async fn failure_injection_only_hits_the_marked_recipient() {
        let client = RecordingMailClient::new("reports@example.com");
        client.fail_for("a@example.com");

        assert!(client.send(message("a@example.com")).await.is_err());
        client.send(message("b@example.com")).await.unwrap();
        assert_eq!(client.sent().len(), 1);
    }
}
