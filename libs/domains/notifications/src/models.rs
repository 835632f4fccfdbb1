//! Data models for the notifications domain.

use crate::error::{NotificationError, NotificationResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ============================================================================
// Incoming events
// ============================================================================

/// Lifecycle event types published by the upstream services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr)]
pub enum EventType {
    #[serde(rename = "aker.events.submission.created")]
    #[strum(serialize = "aker.events.submission.created")]
    SubmissionCreated,
    #[serde(rename = "aker.events.submission.received")]
    #[strum(serialize = "aker.events.submission.received")]
    SubmissionReceived,
    #[serde(rename = "aker.events.manifest.created")]
    #[strum(serialize = "aker.events.manifest.created")]
    ManifestCreated,
    #[serde(rename = "aker.events.manifest.received")]
    #[strum(serialize = "aker.events.manifest.received")]
    ManifestReceived,
    #[serde(rename = "aker.events.work_order.dispatched")]
    #[strum(serialize = "aker.events.work_order.dispatched")]
    WorkOrderDispatched,
    #[serde(rename = "aker.events.work_order.concluded")]
    #[strum(serialize = "aker.events.work_order.concluded")]
    WorkOrderConcluded,
    #[serde(rename = "aker.events.catalogue.new")]
    #[strum(serialize = "aker.events.catalogue.new")]
    CatalogueNew,
    #[serde(rename = "aker.events.catalogue.processed")]
    #[strum(serialize = "aker.events.catalogue.processed")]
    CatalogueProcessed,
    #[serde(rename = "aker.events.catalogue.rejected")]
    #[strum(serialize = "aker.events.catalogue.rejected")]
    CatalogueRejected,
}

/// An event as received from the message bus.
///
/// `event_type` stays a plain string so that events of unknown types still
/// deserialize and can be ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: String,
    /// ISO-8601 timestamp, kept verbatim.
    pub timestamp: String,
    /// Email address of the user that triggered the event.
    pub user_identifier: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub notifier_info: Map<String, Value>,
}

impl Event {
    pub fn new(
        event_type: impl Into<String>,
        timestamp: impl Into<String>,
        user_identifier: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: timestamp.into(),
            user_identifier: user_identifier.into(),
            metadata: Map::new(),
            notifier_info: Map::new(),
        }
    }

    /// Builder method to set one metadata entry.
    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Builder method to set one notifier_info entry.
    pub fn with_notifier_info(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.notifier_info.insert(key.to_string(), value.into());
        self
    }

    /// The recognized event type, or `None` for anything else.
    pub fn kind(&self) -> Option<EventType> {
        self.event_type.parse().ok()
    }
}

// ============================================================================
// Typed event payloads
// ============================================================================

/// Optional extra recipients carried by submission and manifest events.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Stakeholders {
    #[serde(default)]
    pub sample_custodian: Option<String>,
    #[serde(default)]
    pub deputies: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SubmissionMetadata {
    #[serde(default)]
    pub submission_id: Option<Value>,
    #[serde(default)]
    pub hmdmc_numbers: Option<Value>,
    #[serde(default)]
    pub barcode: Option<Value>,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub all_received: Option<Value>,
    #[serde(flatten)]
    pub stakeholders: Stakeholders,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ManifestMetadata {
    #[serde(default)]
    pub manifest_id: Option<Value>,
    #[serde(default)]
    pub hmdmc: Option<Value>,
    #[serde(flatten)]
    pub stakeholders: Stakeholders,
}

/// Work order correlation values. `work_order_id` comes from the event
/// metadata, the other two from `notifier_info`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkOrderMetadata {
    pub work_order_id: Option<Value>,
    pub work_plan_id: Option<Value>,
    pub drs_study_code: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct WorkOrderIdField {
    #[serde(default)]
    work_order_id: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct WorkOrderInfoFields {
    #[serde(default)]
    work_plan_id: Option<Value>,
    #[serde(default)]
    drs_study_code: Option<Value>,
}

/// Work order lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum WorkOrderStatus {
    Dispatched,
    Concluded,
}

impl WorkOrderStatus {
    /// Status word for subjects: "Dispatched", "Concluded".
    pub fn title(&self) -> &'static str {
        match self {
            WorkOrderStatus::Dispatched => "Dispatched",
            WorkOrderStatus::Concluded => "Concluded",
        }
    }
}

/// Typed view of a recognized event.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    SubmissionCreated(SubmissionMetadata),
    SubmissionReceived(SubmissionMetadata),
    ManifestCreated(ManifestMetadata),
    ManifestReceived(ManifestMetadata),
    WorkOrder {
        status: WorkOrderStatus,
        metadata: WorkOrderMetadata,
    },
    CatalogueNew,
    CatalogueProcessed,
    CatalogueRejected {
        error: Option<Value>,
    },
}

impl LifecycleEvent {
    /// Build the typed view of `event`.
    ///
    /// Returns `Ok(None)` for unrecognized event types and
    /// [`NotificationError::InvalidEvent`] when metadata has the wrong shape.
    pub fn from_event(event: &Event) -> NotificationResult<Option<Self>> {
        let Some(kind) = event.kind() else {
            return Ok(None);
        };

        let typed = match kind {
            EventType::SubmissionCreated => {
                LifecycleEvent::SubmissionCreated(parse_map(kind, &event.metadata)?)
            }
            EventType::SubmissionReceived => {
                LifecycleEvent::SubmissionReceived(parse_map(kind, &event.metadata)?)
            }
            EventType::ManifestCreated => {
                LifecycleEvent::ManifestCreated(parse_map(kind, &event.metadata)?)
            }
            EventType::ManifestReceived => {
                LifecycleEvent::ManifestReceived(parse_map(kind, &event.metadata)?)
            }
            EventType::WorkOrderDispatched | EventType::WorkOrderConcluded => {
                let status = if kind == EventType::WorkOrderDispatched {
                    WorkOrderStatus::Dispatched
                } else {
                    WorkOrderStatus::Concluded
                };
                let id: WorkOrderIdField = parse_map(kind, &event.metadata)?;
                let info: WorkOrderInfoFields = parse_map(kind, &event.notifier_info)?;
                LifecycleEvent::WorkOrder {
                    status,
                    metadata: WorkOrderMetadata {
                        work_order_id: id.work_order_id,
                        work_plan_id: info.work_plan_id,
                        drs_study_code: info.drs_study_code,
                    },
                }
            }
            EventType::CatalogueNew => LifecycleEvent::CatalogueNew,
            EventType::CatalogueProcessed => LifecycleEvent::CatalogueProcessed,
            EventType::CatalogueRejected => LifecycleEvent::CatalogueRejected {
                error: event.metadata.get("error").cloned(),
            },
        };

        Ok(Some(typed))
    }
}

fn parse_map<T: DeserializeOwned>(kind: EventType, map: &Map<String, Value>) -> NotificationResult<T> {
    serde_json::from_value(Value::Object(map.clone()))
        .map_err(|e| NotificationError::InvalidEvent(format!("{kind} event has malformed metadata: {e}")))
}

// ============================================================================
// Outgoing notifications
// ============================================================================

/// Template identifiers understood by the template engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Template {
    SubmissionCreated,
    SubmissionCreatedHmdmc,
    SubmissionReceived,
    ManifestCreated,
    ManifestCreatedHmdmc,
    ManifestReceived,
    WoEvent,
    CatalogueNew,
    CatalogueProcessed,
    CatalogueRejected,
}

/// A fully resolved send request handed to a [`crate::Notifier`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationRequest {
    pub subject: String,
    pub from_address: String,
    /// Recipients in the order they were added.
    pub to: Vec<String>,
    pub template: Template,
    pub data: Map<String, Value>,
}

// ============================================================================
// Value helpers
// ============================================================================

/// Truthiness of a metadata value: null, false, zero, empty strings and empty
/// collections are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Render a value for a subject line; strings are rendered without quotes.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_type_round_trips_wire_name() {
        let kind: EventType = "aker.events.work_order.concluded".parse().unwrap();
        assert_eq!(kind, EventType::WorkOrderConcluded);
        assert_eq!(kind.to_string(), "aker.events.work_order.concluded");
    }

    #[test]
    fn test_unknown_event_type_has_no_kind() {
        let event = Event::new("aker.events.something.else", "2026-01-01T00:00:00", "u@sanger.ac.uk");
        assert_eq!(event.kind(), None);
        assert_eq!(LifecycleEvent::from_event(&event).unwrap(), None);
    }

    #[test]
    fn test_event_deserializes_without_maps() {
        let event: Event = serde_json::from_value(json!({
            "event_type": "aker.events.catalogue.new",
            "timestamp": "2026-01-01T00:00:00",
            "user_identifier": "u@sanger.ac.uk"
        }))
        .unwrap();
        assert!(event.metadata.is_empty());
        assert!(event.notifier_info.is_empty());
        assert_eq!(event.kind(), Some(EventType::CatalogueNew));
    }

    #[test]
    fn test_manifest_metadata_parses_stakeholders() {
        let event = Event::new("aker.events.manifest.received", "t", "u@sanger.ac.uk")
            .with_metadata("manifest_id", 123)
            .with_metadata("sample_custodian", "c@sanger.ac.uk")
            .with_metadata("deputies", json!(["a@sanger.ac.uk", "b@sanger.ac.uk"]));

        let Some(LifecycleEvent::ManifestReceived(meta)) = LifecycleEvent::from_event(&event).unwrap() else {
            panic!("expected manifest received");
        };
        assert_eq!(meta.manifest_id, Some(json!(123)));
        assert_eq!(meta.stakeholders.sample_custodian.as_deref(), Some("c@sanger.ac.uk"));
        assert_eq!(meta.stakeholders.deputies.unwrap().len(), 2);
    }

    #[test]
    fn test_null_metadata_is_absent() {
        let event = Event::new("aker.events.submission.received", "t", "u@sanger.ac.uk")
            .with_metadata("deputies", Value::Null)
            .with_metadata("barcode", Value::Null);

        let Some(LifecycleEvent::SubmissionReceived(meta)) = LifecycleEvent::from_event(&event).unwrap() else {
            panic!("expected submission received");
        };
        assert_eq!(meta.stakeholders.deputies, None);
        assert_eq!(meta.barcode, None);
    }

    #[test]
    fn test_malformed_deputies_is_invalid_event() {
        let event = Event::new("aker.events.manifest.created", "t", "u@sanger.ac.uk")
            .with_metadata("deputies", "not-a-list");

        let err = LifecycleEvent::from_event(&event).unwrap_err();
        assert!(matches!(err, NotificationError::InvalidEvent(_)));
    }

    #[test]
    fn test_work_order_reads_notifier_info() {
        let event = Event::new("aker.events.work_order.dispatched", "t", "u@sanger.ac.uk")
            .with_metadata("work_order_id", 123)
            .with_notifier_info("work_plan_id", 1)
            .with_notifier_info("drs_study_code", 1234);

        let typed = LifecycleEvent::from_event(&event).unwrap().unwrap();
        assert_eq!(
            typed,
            LifecycleEvent::WorkOrder {
                status: WorkOrderStatus::Dispatched,
                metadata: WorkOrderMetadata {
                    work_order_id: Some(json!(123)),
                    work_plan_id: Some(json!(1)),
                    drs_study_code: Some(json!(1234)),
                },
            }
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!({})));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(42)));
        assert!(is_truthy(&json!("abc")));
        assert!(is_truthy(&json!(["x"])));
    }

    #[test]
    fn test_value_text_strips_quotes() {
        assert_eq!(value_text(&json!("abc")), "abc");
        assert_eq!(value_text(&json!(123)), "123");
    }

    #[test]
    fn test_template_names() {
        assert_eq!(Template::WoEvent.as_ref(), "wo_event");
        assert_eq!(Template::ManifestCreatedHmdmc.to_string(), "manifest_created_hmdmc");
        assert_eq!(serde_json::to_value(Template::CatalogueRejected).unwrap(), json!("catalogue_rejected"));
    }

    #[test]
    fn test_work_order_status_words() {
        assert_eq!(WorkOrderStatus::Dispatched.to_string(), "dispatched");
        assert_eq!(WorkOrderStatus::Concluded.title(), "Concluded");
    }
}
