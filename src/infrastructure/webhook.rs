use crate::domain::ports::{ChatNotifier, ChatSummary};
use crate::domain::request::Urgency;
use crate::error::{RequestError, Result};
use async_trait::async_trait;
use serde_json::{Value, json};

const IMMEDIATE_COLOR: u32 = 0xFF0000;
const NORMAL_COLOR: u32 = 0x0099FF;

/// Posts request summaries to a Discord-compatible webhook.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    footer: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, footer: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            footer: footer.into(),
        }
    }

    /// The JSON body posted for `summary` at `timestamp` (RFC 3339).
    pub fn payload(&self, summary: &ChatSummary, timestamp: &str) -> Value {
        let urgency = summary.urgency.label().to_uppercase();
        json!({
            "content": format!("💰 **New request: {}**", summary.kind.label()),
            "embeds": [{
                "title": format!("Total: {}", summary.total),
                "color": urgency_color(summary.urgency),
                "fields": [
                    { "name": "Requester", "value": summary.requester, "inline": true },
                    { "name": "Department", "value": summary.department, "inline": true },
                    { "name": "Urgency", "value": urgency, "inline": true },
                    { "name": "Payment Date", "value": summary.payment_date, "inline": true },
                ],
                "footer": { "text": self.footer },
                "timestamp": timestamp,
            }],
        })
    }
}

fn urgency_color(urgency: Urgency) -> u32 {
    match urgency {
        Urgency::Immediate => IMMEDIATE_COLOR,
        Urgency::Normal => NORMAL_COLOR,
    }
}

#[async_trait]
impl ChatNotifier for WebhookNotifier {
    async fn post(&self, summary: &ChatSummary) -> Result<()> {
        let timestamp = chrono::Utc::now().to_rfc3339();
        self.client
            .post(&self.url)
            .json(&self.payload(summary, &timestamp))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| RequestError::ChatError(e.to_string()))?;
        tracing::debug!("Chat summary posted");
        Ok(())
    }
}
