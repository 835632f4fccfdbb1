//! Notifier implementations.
//!
//! This module contains the `Notifier` trait the rule engine sends through
//! and the implementations that deliver or log the resulting requests.

mod smtp;

pub use smtp::{SmtpConfig, SmtpNotifier};

use crate::models::NotificationRequest;
use tracing::info;

/// Receives fully resolved notification requests from the rule engine.
///
/// Sending is fire-and-forget: implementations own their failures and never
/// report them back to the caller.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    fn send_email(&self, request: NotificationRequest);

    /// Get the notifier name for logging.
    fn name(&self) -> &'static str;
}

/// Dry-run notifier that only logs each request.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_email(&self, request: NotificationRequest) {
        let data = serde_json::Value::Object(request.data);
        info!(
            subject = %request.subject,
            from = %request.from_address,
            to = ?request.to,
            template = %request.template,
            data = %data,
            "Dry run: notification not sent"
        );
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
