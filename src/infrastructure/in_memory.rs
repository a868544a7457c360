use crate::domain::ports::{ChatNotifier, ChatSummary, Mailer, OutgoingEmail};
use crate::error::{RequestError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A mailer that keeps every message in memory.
///
/// Clones share the same outbox, so a test can hand one clone to the
/// dispatcher and inspect the other.
#[derive(Default, Clone)]
pub struct InMemoryMailer {
    outbox: Arc<RwLock<Vec<OutgoingEmail>>>,
    failure: Option<String>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every delivery fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.outbox.read().await.clone()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        if let Some(reason) = &self.failure {
            return Err(RequestError::DispatchError(reason.clone()));
        }
        self.outbox.write().await.push(email);
        Ok(())
    }
}

/// A chat notifier that records posted summaries, optionally failing every post.
#[derive(Default, Clone)]
pub struct InMemoryChatNotifier {
    posts: Arc<RwLock<Vec<ChatSummary>>>,
    fail: bool,
}

impl InMemoryChatNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn posts(&self) -> Vec<ChatSummary> {
        self.posts.read().await.clone()
    }
}

#[async_trait]
impl ChatNotifier for InMemoryChatNotifier {
    async fn post(&self, summary: &ChatSummary) -> Result<()> {
        if self.fail {
            return Err(RequestError::ChatError("webhook unreachable".to_string()));
        }
        self.posts.write().await.push(summary.clone());
        Ok(())
    }
}
