use super::request::{RequestKind, Urgency};
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// A file attached to an outgoing email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// An email addressed to the configured finance recipient.
///
/// The sender mailbox comes from the transport configuration; only its
/// display name is chosen per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub sender_name: String,
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<EmailAttachment>,
}

/// Advisory summary posted to the team chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatSummary {
    pub kind: RequestKind,
    pub total: String,
    pub requester: String,
    pub department: String,
    pub urgency: Urgency,
    pub payment_date: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<()>;
}

#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn post(&self, summary: &ChatSummary) -> Result<()>;
}

pub type MailerRef = Arc<dyn Mailer>;
pub type ChatNotifierRef = Arc<dyn ChatNotifier>;
