//! Configuration consumed by the rule engine.

use core_config::{env_or_default, env_parse, env_required, ConfigError, FromEnv};

/// Sender settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub from_address: String,
}

impl FromEnv for EmailConfig {
    /// Requires NOTIFIER_FROM_ADDRESS (no default)
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            from_address: env_required("NOTIFIER_FROM_ADDRESS")?,
        })
    }
}

/// Fixed contact addresses for compliance and catalogue notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactConfig {
    /// Ethics officer mailbox that verifies HMDMC numbers.
    pub email_hmdmc_verify: String,
    /// Development team mailbox for catalogue events.
    pub email_dev_team: String,
}

impl FromEnv for ContactConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            email_hmdmc_verify: env_required("NOTIFIER_HMDMC_VERIFY_EMAIL")?,
            email_dev_team: env_required("NOTIFIER_DEV_TEAM_EMAIL")?,
        })
    }
}

/// Where links in notification bodies point to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    pub protocol: String,
    pub root: String,
    pub port: u16,
}

impl FromEnv for LinkConfig {
    /// Reads from environment variables with defaults:
    /// - NOTIFIER_LINK_PROTOCOL: http
    /// - NOTIFIER_LINK_ROOT: localhost
    /// - NOTIFIER_LINK_PORT: 80
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            protocol: env_or_default("NOTIFIER_LINK_PROTOCOL", "http"),
            root: env_or_default("NOTIFIER_LINK_ROOT", "localhost"),
            port: env_parse("NOTIFIER_LINK_PORT", 80)?,
        })
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            root: "localhost".to_string(),
            port: 80,
        }
    }
}

/// Read-only configuration handed to every [`crate::RuleEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierConfig {
    pub email: EmailConfig,
    pub contact: ContactConfig,
    pub link: LinkConfig,
}

impl NotifierConfig {
    pub fn new(email: EmailConfig, contact: ContactConfig, link: LinkConfig) -> Self {
        Self { email, contact, link }
    }
}

impl FromEnv for NotifierConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            email: EmailConfig::from_env()?,
            contact: ContactConfig::from_env()?,
            link: LinkConfig::from_env()?,
        })
    }
}
