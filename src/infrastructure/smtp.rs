use crate::config::{EmailSettings, SmtpSettings};
use crate::domain::ports::{Mailer, OutgoingEmail};
use crate::error::{RequestError, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Delivers request emails through an SMTP relay.
///
/// Settings are validated on every send rather than at startup, so a missing
/// item fails the request that needed it with a dispatch error.
pub struct SmtpMailer {
    settings: EmailSettings,
}

impl SmtpMailer {
    pub fn new(settings: EmailSettings) -> Self {
        Self { settings }
    }

    fn transport(settings: &SmtpSettings) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let tls = TlsParameters::new(settings.host.clone()).map_err(dispatch_error)?;
        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(settings.host.as_str())
                .port(settings.port)
                .tls(Tls::Opportunistic(tls))
                .credentials(Credentials::new(
                    settings.username.clone(),
                    settings.password.clone(),
                ))
                .build(),
        )
    }
}

/// Builds the MIME message: an HTML part followed by every attachment.
pub fn build_message(settings: &SmtpSettings, email: OutgoingEmail) -> Result<Message> {
    let from_address: Address = settings.from_address.parse().map_err(dispatch_error)?;
    let to_address: Address = settings.to_address.parse().map_err(dispatch_error)?;

    let mut body = MultiPart::mixed().singlepart(SinglePart::html(email.html_body));
    for attachment in email.attachments {
        let content_type = ContentType::parse(&attachment.content_type)
            .or_else(|_| ContentType::parse("application/octet-stream"))
            .map_err(dispatch_error)?;
        body = body.singlepart(Attachment::new(attachment.filename).body(attachment.content, content_type));
    }

    Message::builder()
        .from(Mailbox::new(Some(email.sender_name), from_address))
        .to(Mailbox::new(None, to_address))
        .subject(email.subject)
        .multipart(body)
        .map_err(dispatch_error)
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let settings = self.settings.resolve()?;
        let message = build_message(&settings, email)?;
        let transport = Self::transport(&settings)?;
        transport.send(message).await.map_err(dispatch_error)?;
        tracing::debug!(host = %settings.host, port = settings.port, "SMTP relay accepted message");
        Ok(())
    }
}

fn dispatch_error(error: impl std::fmt::Display) -> RequestError {
    RequestError::DispatchError(error.to_string())
}
