//! Outgoing email

use crate::error::CatalogError;
use async_trait::async_trait;
use std::sync::Mutex;

/// A plain-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers account emails such as password reset links
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), CatalogError>;
}

/// Writes messages to the log instead of delivering them
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), CatalogError> {
        tracing::info!(to = %email.to, subject = %email.subject, "Email queued");
        tracing::debug!(body = %email.body, "Email body");
        Ok(())
    }
}

/// Keeps every message in memory; used to inspect reset links
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every delivery fails
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<Email> {
        self.sent().pop()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> Result<(), CatalogError> {
        if self.fail {
            return Err(CatalogError::Delivery("mail transport unavailable".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email);
        }
        Ok(())
    }
}
