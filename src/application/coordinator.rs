use crate::application::dispatcher::{ChatOutcome, Dispatcher};
use crate::application::normalizer::normalize;
use crate::config::AppConfig;
use crate::domain::form::DecodedPayload;
use crate::domain::money::Money;
use crate::domain::ports::{ChatNotifierRef, MailerRef};
use crate::error::{RequestError, Result};
use crate::infrastructure::smtp::SmtpMailer;
use crate::infrastructure::webhook::WebhookNotifier;
use crate::rendering::DocumentRenderer;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Multipart field carrying the uploaded files.
pub const ATTACHMENT_FIELD: &str = "anexos";

/// Where a request is in its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Decoding,
    Normalizing,
    Rendering,
    Dispatching,
    Done,
    Failed,
}

impl Stage {
    fn successor(&self) -> Option<Stage> {
        match self {
            Stage::Idle => Some(Stage::Decoding),
            Stage::Decoding => Some(Stage::Normalizing),
            Stage::Normalizing => Some(Stage::Rendering),
            Stage::Rendering => Some(Stage::Dispatching),
            Stage::Dispatching => Some(Stage::Done),
            Stage::Done | Stage::Failed => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Decoding => "decoding",
            Stage::Normalizing => "normalizing",
            Stage::Rendering => "rendering",
            Stage::Dispatching => "dispatching",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A request that ended in [`Stage::Failed`].
///
/// Displays as the raw error of the stage that failed.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PipelineFailure {
    /// The active stage when the failure happened.
    pub stage: Stage,
    #[source]
    pub error: RequestError,
}

/// Outcome of a request that reached [`Stage::Done`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub total: Money,
    pub line_items: usize,
    /// Attachments on the email, the rendered document included.
    pub attachments: usize,
    pub chat: ChatOutcome,
}

/// Forward-only stage tracker for one request.
struct Pipeline {
    stage: Stage,
}

impl Pipeline {
    fn start() -> Self {
        Self { stage: Stage::Idle }
    }

    fn advance(&mut self) {
        if let Some(next) = self.stage.successor() {
            tracing::debug!(from = %self.stage, to = %next, "Pipeline stage");
            self.stage = next;
        }
    }

    fn fail(&mut self, error: RequestError) -> PipelineFailure {
        let stage = self.stage;
        tracing::error!(%stage, error = %error, "Request failed");
        self.stage = Stage::Failed;
        PipelineFailure { stage, error }
    }
}

/// Runs one request through decode, normalize, render and dispatch.
///
/// Holds only read-only collaborators, so a single instance is shared by
/// every concurrent request.
pub struct RequestCoordinator {
    renderer: DocumentRenderer,
    dispatcher: Dispatcher,
}

impl RequestCoordinator {
    pub fn new(renderer: DocumentRenderer, dispatcher: Dispatcher) -> Self {
        Self {
            renderer,
            dispatcher,
        }
    }

    /// Wires the SMTP mailer and, when a webhook URL is configured, the chat notifier.
    pub fn from_config(config: &AppConfig) -> Self {
        let mailer: MailerRef = Arc::new(SmtpMailer::new(config.email.clone()));
        let chat = config.chat_webhook_url.as_ref().map(|url| {
            Arc::new(WebhookNotifier::new(url.clone(), config.chat_footer.clone())) as ChatNotifierRef
        });
        if chat.is_none() {
            tracing::info!("DISCORD_WEBHOOK_URL not set, chat summaries disabled");
        }
        Self::new(
            DocumentRenderer::new(config.locale),
            Dispatcher::new(mailer, chat, config.locale),
        )
    }

    /// Drives `decode` and the remaining stages to a terminal state.
    ///
    /// Staged uploads are owned by this call and released when it returns,
    /// whatever the outcome.
    pub async fn run<D>(&self, decode: D) -> std::result::Result<Submission, PipelineFailure>
    where
        D: Future<Output = Result<DecodedPayload>>,
    {
        let mut pipeline = Pipeline::start();

        pipeline.advance();
        let payload = decode.await.map_err(|e| pipeline.fail(e))?;

        pipeline.advance();
        let request = normalize(&payload.fields, &request_date_fallback()).map_err(|e| pipeline.fail(e))?;

        pipeline.advance();
        let document = self
            .renderer
            .render(&request.record, &request.items)
            .map_err(|e| pipeline.fail(e))?;
        tracing::debug!(pages = document.page_count, bytes = document.bytes.len(), "Document rendered");

        pipeline.advance();
        let uploads = payload
            .files
            .into_iter()
            .filter(|file| {
                let wanted = file.field == ATTACHMENT_FIELD;
                if !wanted {
                    tracing::debug!(field = %file.field, filename = %file.filename, "Ignoring file outside the attachment field");
                }
                wanted
            })
            .collect();
        let report = self
            .dispatcher
            .dispatch(&request, document, uploads)
            .await
            .map_err(|e| pipeline.fail(e))?;

        pipeline.advance();
        let submission = Submission {
            total: report.total,
            line_items: request.items.len(),
            attachments: report.attachments,
            chat: report.chat,
        };
        tracing::info!(
            total = %submission.total.value(),
            line_items = submission.line_items,
            attachments = submission.attachments,
            "Request completed"
        );
        Ok(submission)
    }
}

/// Request date shown when the form carries none: today, `dd/mm/yyyy`.
pub fn request_date_fallback() -> String {
    chrono::Local::now().format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attachment::AttachmentRef;
    use crate::domain::form::FormFields;
    use crate::domain::money::NumberLocale;
    use crate::infrastructure::in_memory::{InMemoryChatNotifier, InMemoryMailer};
    use rust_decimal_macros::dec;

    fn fields() -> FormFields {
        [
            ("tipo_solicitacao", "pagamento"),
            ("solicitante", "Bruno Lima"),
            ("departamento", "Sales"),
            ("cpf_cnpj", "987.654.321-00"),
            ("urgencia", "imediato"),
            ("data_pagamento", "30/10/2026"),
            ("row_count", "2"),
            ("valor_despesa_0", "100"),
            ("km_rodado_1", "50"),
            ("valor_unit_km_1", "2"),
        ]
        .into_iter()
        .collect()
    }

    fn coordinator(mailer: &InMemoryMailer, chat: &InMemoryChatNotifier) -> RequestCoordinator {
        RequestCoordinator::new(
            DocumentRenderer::default(),
            Dispatcher::new(
                Arc::new(mailer.clone()),
                Some(Arc::new(chat.clone())),
                NumberLocale::PtBr,
            ),
        )
    }

    #[tokio::test]
    async fn test_successful_request_reaches_done() {
        let mailer = InMemoryMailer::new();
        let chat = InMemoryChatNotifier::new();
        let files = vec![
            AttachmentRef::stage(ATTACHMENT_FIELD, "receipt.pdf", b"%PDF-1.4").await.unwrap(),
            AttachmentRef::stage("other", "ignored.txt", b"x").await.unwrap(),
        ];

        let submission = coordinator(&mailer, &chat)
            .run(async { Ok(DecodedPayload::new(fields(), files)) })
            .await
            .unwrap();

        assert_eq!(submission.total, Money::new(dec!(200)));
        assert_eq!(submission.line_items, 2);
        assert_eq!(submission.attachments, 2);
        assert_eq!(submission.chat, ChatOutcome::Delivered);

        let sent = mailer.sent().await;
        assert_eq!(sent[0].attachments[0].filename, "Reimbursement_Bruno.pdf");
        assert_eq!(sent[0].attachments[1].filename, "receipt.pdf");
        assert_eq!(chat.posts().await[0].total, "R$ 200,00");
    }

    #[tokio::test]
    async fn test_decode_failure_stops_at_decoding() {
        let mailer = InMemoryMailer::new();
        let chat = InMemoryChatNotifier::new();

        let failure = coordinator(&mailer, &chat)
            .run(async { Err(RequestError::DecodeError("truncated body".to_string())) })
            .await
            .unwrap_err();

        assert_eq!(failure.stage, Stage::Decoding);
        assert_eq!(failure.to_string(), "Malformed request body: truncated body");
        assert!(mailer.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_validation_failure_skips_render_and_dispatch() {
        let mailer = InMemoryMailer::new();
        let chat = InMemoryChatNotifier::new();
        let mut fields = fields();
        fields.append("cobrar_cliente_0", "true");
        fields.append("nome_cliente_0", "");

        let failure = coordinator(&mailer, &chat)
            .run(async { Ok(DecodedPayload::new(fields, Vec::new())) })
            .await
            .unwrap_err();

        assert_eq!(failure.stage, Stage::Normalizing);
        assert!(matches!(failure.error, RequestError::ValidationError(_)));
        assert!(mailer.sent().await.is_empty());
        assert!(chat.posts().await.is_empty());
    }

    #[tokio::test]
    async fn test_email_failure_fails_at_dispatching_without_chat() {
        let mailer = InMemoryMailer::failing("connection refused");
        let chat = InMemoryChatNotifier::new();

        let failure = coordinator(&mailer, &chat)
            .run(async { Ok(DecodedPayload::new(fields(), Vec::new())) })
            .await
            .unwrap_err();

        assert_eq!(failure.stage, Stage::Dispatching);
        assert_eq!(failure.to_string(), "Failed to deliver email: connection refused");
        assert!(chat.posts().await.is_empty());
    }

    #[tokio::test]
    async fn test_chat_failure_still_completes() {
        let mailer = InMemoryMailer::new();
        let coordinator = RequestCoordinator::new(
            DocumentRenderer::default(),
            Dispatcher::new(
                Arc::new(mailer.clone()),
                Some(Arc::new(InMemoryChatNotifier::failing())),
                NumberLocale::PtBr,
            ),
        );

        let submission = coordinator
            .run(async { Ok(DecodedPayload::new(fields(), Vec::new())) })
            .await
            .unwrap();

        assert_eq!(submission.chat, ChatOutcome::Failed);
        assert_eq!(mailer.sent().await.len(), 1);
    }

    #[test]
    fn test_stage_order() {
        let mut stage = Stage::Idle;
        let mut visited = vec![stage];
        while let Some(next) = stage.successor() {
            stage = next;
            visited.push(stage);
        }
        assert_eq!(
            visited,
            vec![
                Stage::Idle,
                Stage::Decoding,
                Stage::Normalizing,
                Stage::Rendering,
                Stage::Dispatching,
                Stage::Done
            ]
        );
        assert_eq!(Stage::Failed.successor(), None);
    }

    #[test]
    fn test_request_date_fallback_format() {
        let date = request_date_fallback();
        let parts: Vec<&str> = date.split('/').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 2);
        assert_eq!(parts[1].len(), 2);
        assert_eq!(parts[2].len(), 4);
    }
}
