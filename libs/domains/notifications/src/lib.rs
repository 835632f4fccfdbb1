//! Notifications Domain
//!
//! Decides which emails a lifecycle event produces and hands them to a
//! notifier for delivery.
//!
//! # Events
//!
//! - Submission created / received
//! - Manifest created / received (with HMDMC compliance copy)
//! - Work order dispatched / concluded
//! - Catalogue new / processed / rejected
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Event (JSON)   │  ← One lifecycle event from the bus
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │   RuleEngine    │  ← Picks recipients, subject, template, data
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │    Notifier     │  ← SMTP (rendered via TemplateEngine) or dry-run log
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_notifications::{Event, LogNotifier, NotifierConfig, RuleEngine};
//!
//! let event: Event = serde_json::from_str(line)?;
//! RuleEngine::new(&config, &event, &LogNotifier).check_rules()?;
//! ```

pub mod config;
pub mod error;
pub mod links;
pub mod models;
pub mod providers;
pub mod rules;
pub mod templates;

// Re-export commonly used types
pub use config::{ContactConfig, EmailConfig, LinkConfig, NotifierConfig};
pub use error::{NotificationError, NotificationResult};
pub use links::LinkBuilder;
pub use models::{
    Event, EventType, LifecycleEvent, NotificationRequest, Template, WorkOrderStatus,
};
pub use providers::{LogNotifier, Notifier, SmtpConfig, SmtpNotifier};
pub use rules::{append_if_present, RuleEngine};
pub use templates::TemplateEngine;
