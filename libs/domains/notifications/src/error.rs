//! Error types for the notifications domain.

use thiserror::Error;

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Errors that can occur in the notifications domain.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The event is missing a required correlating identifier or carries
    /// metadata of the wrong shape.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Email provider error.
    #[error("Email provider error: {0}")]
    ProviderError(String),

    /// Template rendering error.
    #[error("Template rendering error: {0}")]
    TemplateError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl NotificationError {
    /// Missing required identifier on an incoming event.
    pub fn missing_field(event_type: impl std::fmt::Display, field: &str) -> Self {
        NotificationError::InvalidEvent(format!("{event_type} event is missing required '{field}'"))
    }
}

impl From<handlebars::RenderError> for NotificationError {
    fn from(err: handlebars::RenderError) -> Self {
        NotificationError::TemplateError(err.to_string())
    }
}

impl From<core_config::ConfigError> for NotificationError {
    fn from(err: core_config::ConfigError) -> Self {
        NotificationError::ConfigError(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for NotificationError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        NotificationError::ProviderError(err.to_string())
    }
}
