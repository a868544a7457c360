use crate::domain::money::NumberLocale;
use crate::error::{RequestError, Result};
use std::env;

pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;
pub const DEFAULT_MAX_FIELD_BYTES: usize = 64 * 1024;
pub const DEFAULT_MAX_FILES: usize = 20;
pub const DEFAULT_CHAT_FOOTER: &str = "Finance Requests";

/// Size limits enforced while decoding a multipart body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_body_bytes: usize,
    pub max_field_bytes: usize,
    pub max_files: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_field_bytes: DEFAULT_MAX_FIELD_BYTES,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

/// SMTP settings as found in the environment. Every item is optional here;
/// [`EmailSettings::resolve`] reports the first missing one.
#[derive(Clone, Debug, Default)]
pub struct EmailSettings {
    pub host: Option<String>,
    pub port: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
}

/// Complete SMTP settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub to_address: String,
}

impl EmailSettings {
    pub fn resolve(&self) -> Result<SmtpSettings> {
        let port = require(&self.port, "EMAIL_SERVER_PORT")?;
        Ok(SmtpSettings {
            host: require(&self.host, "EMAIL_SERVER_HOST")?,
            port: port.trim().parse().map_err(|_| {
                RequestError::DispatchError(format!("EMAIL_SERVER_PORT is not a valid port: '{port}'"))
            })?,
            username: require(&self.username, "EMAIL_SERVER_USER")?,
            password: require(&self.password, "EMAIL_SERVER_PASSWORD")?,
            from_address: require(&self.from_address, "EMAIL_FROM")?,
            to_address: require(&self.to_address, "EMAIL_TO")?,
        })
    }
}

fn require(value: &Option<String>, name: &str) -> Result<String> {
    value
        .clone()
        .ok_or_else(|| RequestError::DispatchError(format!("email transport is not configured: {name} is not set")))
}

/// Process-wide configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub chat_webhook_url: Option<String>,
    pub chat_footer: String,
    pub email: EmailSettings,
    pub locale: NumberLocale,
    pub limits: DecodeLimits,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chat_webhook_url: None,
            chat_footer: DEFAULT_CHAT_FOOTER.to_string(),
            email: EmailSettings::default(),
            locale: NumberLocale::default(),
            limits: DecodeLimits::default(),
        }
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let locale = match var("DOCUMENT_LOCALE").map(|raw| raw.parse::<NumberLocale>()) {
            Some(Ok(locale)) => locale,
            Some(Err(reason)) => {
                tracing::warn!(%reason, "Ignoring DOCUMENT_LOCALE");
                NumberLocale::default()
            }
            None => NumberLocale::default(),
        };
        let size = |name: &str, default: usize| {
            var(name)
                .and_then(|raw| raw.trim().parse::<usize>().ok())
                .unwrap_or(default)
        };

        Self {
            chat_webhook_url: var("DISCORD_WEBHOOK_URL"),
            chat_footer: var("CHAT_FOOTER").unwrap_or_else(|| DEFAULT_CHAT_FOOTER.to_string()),
            email: EmailSettings {
                host: var("EMAIL_SERVER_HOST"),
                port: var("EMAIL_SERVER_PORT"),
                username: var("EMAIL_SERVER_USER"),
                password: var("EMAIL_SERVER_PASSWORD"),
                from_address: var("EMAIL_FROM"),
                to_address: var("EMAIL_TO"),
            },
            locale,
            limits: DecodeLimits {
                max_body_bytes: size("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
                max_field_bytes: size("MAX_FIELD_BYTES", DEFAULT_MAX_FIELD_BYTES),
                max_files: size("MAX_FILES", DEFAULT_MAX_FILES),
            },
        }
    }
}
