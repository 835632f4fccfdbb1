//! SMTP notifier implementation using lettre.
//!
//! Renders the request's template and delivers one multipart message
//! addressed to every recipient. Against MailHog/Mailpit use the default
//! non-TLS configuration.

use super::Notifier;
use crate::error::{NotificationError, NotificationResult};
use crate::models::NotificationRequest;
use crate::templates::TemplateEngine;
use core_config::{env_flag, env_or_default, env_parse, ConfigError, FromEnv};
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};
use std::env;
use tracing::{debug, error, info};

/// SMTP configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    /// SMTP server host.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// SMTP username (optional for dev servers like Mailpit).
    pub username: Option<String>,
    /// SMTP password (optional for dev servers like Mailpit).
    pub password: Option<String>,
    /// Whether to use TLS (false for local dev servers).
    pub use_tls: bool,
}

impl SmtpConfig {
    /// Create a new SMTP configuration without credentials or TLS.
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            username: None,
            password: None,
            use_tls: false,
        }
    }
}

impl FromEnv for SmtpConfig {
    /// SMTP_HOST (localhost), SMTP_PORT (1025), SMTP_USERNAME, SMTP_PASSWORD,
    /// SMTP_USE_TLS (false)
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_or_default("SMTP_HOST", "localhost"),
            port: env_parse("SMTP_PORT", 1025)?,
            username: env::var("SMTP_USERNAME").ok(),
            password: env::var("SMTP_PASSWORD").ok(),
            use_tls: env_flag("SMTP_USE_TLS"),
        })
    }
}

/// Notifier that delivers rendered emails over SMTP.
pub struct SmtpNotifier {
    transport: SmtpTransport,
    templates: TemplateEngine,
    config: SmtpConfig,
}

impl SmtpNotifier {
    /// Create a new SMTP notifier.
    pub fn new(config: SmtpConfig, templates: TemplateEngine) -> NotificationResult<Self> {
        let transport = Self::build_transport(&config)?;
        Ok(Self {
            transport,
            templates,
            config,
        })
    }

    /// Build the SMTP transport based on configuration.
    fn build_transport(config: &SmtpConfig) -> NotificationResult<SmtpTransport> {
        let mut builder = if config.use_tls {
            SmtpTransport::relay(&config.host)
                .map_err(|e| NotificationError::ProviderError(format!("Failed to create SMTP relay: {}", e)))?
                .port(config.port)
        } else {
            SmtpTransport::builder_dangerous(&config.host).port(config.port)
        };

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(builder.build())
    }

    /// Check the server accepts connections.
    pub fn health_check(&self) -> NotificationResult<bool> {
        Ok(self.transport.test_connection()?)
    }

    /// Render and build a lettre Message for the request.
    fn build_message(&self, request: &NotificationRequest) -> NotificationResult<Message> {
        let rendered = self.templates.render(request.template, &request.data)?;

        let from: Mailbox = request
            .from_address
            .parse()
            .map_err(|e| NotificationError::ProviderError(format!("Invalid from address: {}", e)))?;

        let mut builder = Message::builder().from(from).subject(&request.subject);

        for recipient in &request.to {
            let mailbox: Mailbox = recipient
                .parse()
                .map_err(|e| NotificationError::ProviderError(format!("Invalid to address '{}': {}", recipient, e)))?;
            builder = builder.to(mailbox);
        }

        builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(rendered.text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(rendered.html),
                    ),
            )
            .map_err(|e| NotificationError::ProviderError(format!("Failed to build email message: {}", e)))
    }

    fn deliver(&self, request: &NotificationRequest) -> NotificationResult<Option<String>> {
        let message = self.build_message(request)?;
        let response = self.transport.send(&message)?;
        Ok(response.message().next().map(|s| s.to_string()))
    }
}

impl Notifier for SmtpNotifier {
    fn send_email(&self, request: NotificationRequest) {
        debug!(
            to = ?request.to,
            subject = %request.subject,
            template = %request.template,
            host = %self.config.host,
            port = %self.config.port,
            "Sending email via SMTP"
        );

        match self.deliver(&request) {
            Ok(message_id) => info!(
                to = ?request.to,
                template = %request.template,
                message_id = ?message_id,
                "Email sent successfully via SMTP"
            ),
            Err(e) => error!(
                to = ?request.to,
                template = %request.template,
                error = %e,
                "Failed to send email via SMTP"
            ),
        }
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
