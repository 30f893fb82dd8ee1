//! Mail notifications for failed services

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::search::SearchResult;

/// Default SMTP relay port
pub const DEFAULT_SMTP_PORT: u16 = 25;

/// Mail to send for one cycle with hits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Backend-reported match count
    pub total: u64,
    /// Returned messages, each terminated by a newline
    pub messages: String,
}

impl Notification {
    /// Only a result with a positive total produces a notification
    pub fn from_result(result: &SearchResult) -> Option<Self> {
        if !result.has_hits() {
            return None;
        }

        let mut messages = String::new();
        for message in &result.messages {
            messages.push_str(message);
            messages.push('\n');
        }

        Some(Self {
            total: result.total,
            messages,
        })
    }

    pub fn subject(&self) -> String {
        format!("{} service(s) unavailable", self.total)
    }
}

/// Delivers notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifierError>;
}

/// Sends one plaintext mail per notification through an SMTP relay
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    relay: String,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    /// Create a notifier for an unauthenticated, unencrypted relay
    pub fn new(
        relay: &str,
        port: u16,
        from: &str,
        to: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, NotifierError> {
        let from = parse_mailbox(from)?;
        let to = parse_mailbox(to)?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(relay).port(port);
        if timeout.is_some() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            transport: builder.build(),
            relay: format!("{}:{}", relay, port),
            from,
            to,
        })
    }

    /// Build the mail for a notification
    pub fn message(&self, notification: &Notification) -> Result<Message, NotifierError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(notification.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.messages.clone())
            .map_err(|e| NotifierError::Message(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifierError> {
    address
        .parse()
        .map_err(|e| NotifierError::Address(format!("{}: {}", address, e)))
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifierError> {
        tracing::info!(
            from = %self.from,
            to = %self.to,
            relay = %self.relay,
            "Sending mail"
        );

        let message = self.message(notification)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| NotifierError::Delivery(format!("{} via {}", e, self.relay)))?;

        tracing::debug!(total = notification.total, "Mail sent");
        Ok(())
    }
}

/// Notifier errors
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("invalid mail address {0}")]
    Address(String),

    #[error("failed to build mail: {0}")]
    Message(String),

    #[error("failed to send mail: {0}")]
    Delivery(String),
}
