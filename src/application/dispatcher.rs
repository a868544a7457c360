use crate::domain::attachment::AttachmentRef;
use crate::domain::money::{Money, NumberLocale};
use crate::domain::ports::{ChatNotifierRef, ChatSummary, EmailAttachment, MailerRef, OutgoingEmail};
use crate::domain::request::NormalizedRequest;
use crate::error::{RequestError, Result};
use crate::rendering::RenderedDocument;

const PDF_CONTENT_TYPE: &str = "application/pdf";
const OCTET_STREAM: &str = "application/octet-stream";

/// What happened to the advisory chat summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOutcome {
    /// No webhook configured.
    Skipped,
    Delivered,
    /// Posting failed; the failure was logged and ignored.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub total: Money,
    pub attachments: usize,
    pub chat: ChatOutcome,
}

/// Sends the email (primary, failures propagate) and then the chat summary
/// (advisory, failures are swallowed).
pub struct Dispatcher {
    mailer: MailerRef,
    chat: Option<ChatNotifierRef>,
    locale: NumberLocale,
}

impl Dispatcher {
    pub fn new(mailer: MailerRef, chat: Option<ChatNotifierRef>, locale: NumberLocale) -> Self {
        Self {
            mailer,
            chat,
            locale,
        }
    }

    /// Delivers `document` and every upload, then posts the chat summary.
    ///
    /// Uploads are read and released before the email is handed to the
    /// transport. The chat summary is only attempted after the email succeeded.
    pub async fn dispatch(
        &self,
        request: &NormalizedRequest,
        document: RenderedDocument,
        uploads: Vec<AttachmentRef>,
    ) -> Result<DispatchReport> {
        let total = request.grand_total();
        debug_assert_eq!(total, document.grand_total);

        let mut attachments = Vec::with_capacity(uploads.len() + 1);
        attachments.push(EmailAttachment {
            filename: document_filename(request),
            content_type: PDF_CONTENT_TYPE.to_string(),
            content: document.bytes,
        });
        for mut upload in uploads {
            let content = upload.read_all().await.map_err(|e| {
                RequestError::DispatchError(format!(
                    "could not read attachment '{}': {e}",
                    upload.filename
                ))
            })?;
            attachments.push(EmailAttachment {
                content_type: guess_content_type(&upload.filename).to_string(),
                filename: upload.filename,
                content,
            });
        }
        let attachment_count = attachments.len();

        self.mailer.send(self.email(request, total, attachments)).await?;
        tracing::info!(
            requester = %request.record.requester,
            attachments = attachment_count,
            "Request email delivered"
        );

        let chat = self.notify_chat(request, total).await;
        Ok(DispatchReport {
            total,
            attachments: attachment_count,
            chat,
        })
    }

    fn email(
        &self,
        request: &NormalizedRequest,
        total: Money,
        attachments: Vec<EmailAttachment>,
    ) -> OutgoingEmail {
        let record = &request.record;
        OutgoingEmail {
            sender_name: record.requester.clone(),
            subject: format!(
                "Reimbursement/Payment - {} - {}",
                record.department, record.requester
            ),
            html_body: format!(
                "<p>New request received.</p><p><strong>Total:</strong> {}</p>",
                self.locale.format_currency(total)
            ),
            attachments,
        }
    }

    async fn notify_chat(&self, request: &NormalizedRequest, total: Money) -> ChatOutcome {
        let Some(chat) = &self.chat else {
            return ChatOutcome::Skipped;
        };
        let record = &request.record;
        let summary = ChatSummary {
            kind: record.kind,
            total: self.locale.format_currency(total),
            requester: record.requester.clone(),
            department: record.department.clone(),
            urgency: record.urgency,
            payment_date: record.payment_date.clone(),
        };
        match chat.post(&summary).await {
            Ok(()) => ChatOutcome::Delivered,
            Err(e) => {
                tracing::warn!(error = %e, "Chat summary not delivered");
                ChatOutcome::Failed
            }
        }
    }
}

/// `Reimbursement_<first name>.pdf`
pub fn document_filename(request: &NormalizedRequest) -> String {
    format!("Reimbursement_{}.pdf", request.record.requester_first_name())
}

fn guess_content_type(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => PDF_CONTENT_TYPE,
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("xml") => "application/xml",
        Some("zip") => "application/zip",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => OCTET_STREAM,
    }
}
