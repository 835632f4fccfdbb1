//! Event-to-notification rules.
//!
//! [`RuleEngine`] inspects one event, picks the handler for its type and hands
//! every resulting [`NotificationRequest`] to a [`Notifier`]. One engine is
//! built per event and nothing is shared between invocations.

use crate::config::NotifierConfig;
use crate::error::{NotificationError, NotificationResult};
use crate::links::LinkBuilder;
use crate::models::{
    is_truthy, value_text, Event, LifecycleEvent, ManifestMetadata, NotificationRequest, Stakeholders,
    SubmissionMetadata, Template, WorkOrderMetadata, WorkOrderStatus,
};
use crate::providers::Notifier;
use serde_json::{Map, Value};
use tracing::{debug, info};

pub const SBJ_SUB_CREATED: &str = "Aker | New Submission Created";
pub const SBJ_SUB_CREATED_HMDMC: &str = "Aker | New Submission Created with HMDMC";
pub const SBJ_SUB_RECEIVED: &str = "Aker | Submission Received";
pub const SBJ_MAN_CREATED: &str = "Aker | Manifest Created";
pub const SBJ_MAN_CREATED_HMDMC: &str = "Aker | Manifest Created with HMDMC";
pub const SBJ_MAN_RECEIVED: &str = "Aker | Manifest Received";
pub const SBJ_PREFIX_WO: &str = "Aker | Work Order";
pub const SBJ_CAT_NEW: &str = "Aker | New Catalogue";
pub const SBJ_CAT_PROCESSED: &str = "Aker | Catalogue Processed";
pub const SBJ_CAT_REJECTED: &str = "Aker | Catalogue Rejected";

/// Rendered in work order subjects when the study code is missing.
pub const DRS_STUDY_CODE_PLACEHOLDER: &str = "nil";

/// Insert `value` under `key` when it is present and truthy.
///
/// Returns whether the value was inserted.
pub fn append_if_present(data: &mut Map<String, Value>, key: &str, value: Option<&Value>) -> bool {
    match value {
        Some(v) if is_truthy(v) => {
            data.insert(key.to_string(), v.clone());
            true
        }
        _ => false,
    }
}

/// Recipients for submission and manifest events: the user, then the
/// custodian, then each deputy.
fn stakeholder_recipients(user_identifier: &str, stakeholders: &Stakeholders) -> Vec<String> {
    let mut to = vec![user_identifier.to_string()];
    if let Some(custodian) = stakeholders.sample_custodian.as_ref().filter(|c| !c.is_empty()) {
        to.push(custodian.clone());
    }
    if let Some(deputies) = &stakeholders.deputies {
        to.extend(deputies.iter().cloned());
    }
    to
}

/// Applies the notification rules to a single event.
pub struct RuleEngine<'a, N: Notifier + ?Sized> {
    config: &'a NotifierConfig,
    event: &'a Event,
    notifier: &'a N,
    links: LinkBuilder<'a>,
}

impl<'a, N: Notifier + ?Sized> RuleEngine<'a, N> {
    pub fn new(config: &'a NotifierConfig, event: &'a Event, notifier: &'a N) -> Self {
        Self {
            config,
            event,
            notifier,
            links: LinkBuilder::new(&config.link),
        }
    }

    /// Run every rule that applies to the event.
    ///
    /// Unknown event types are ignored. Fails with
    /// [`NotificationError::InvalidEvent`] for malformed metadata or a work
    /// order event without `work_order_id`; nothing is sent in that case.
    pub fn check_rules(&self) -> NotificationResult<()> {
        let Some(typed) = LifecycleEvent::from_event(self.event)? else {
            debug!(event_type = %self.event.event_type, "Ignoring unrecognized event type");
            return Ok(());
        };

        debug!(event_type = %self.event.event_type, notifier = self.notifier.name(), "Applying rules");

        match typed {
            LifecycleEvent::SubmissionCreated(meta) => self.on_submission_created(&meta),
            LifecycleEvent::SubmissionReceived(meta) => self.on_submission_received(&meta),
            LifecycleEvent::ManifestCreated(meta) => self.on_manifest_created(&meta),
            LifecycleEvent::ManifestReceived(meta) => self.on_manifest_received(&meta),
            LifecycleEvent::WorkOrder { status, metadata } => self.on_work_order_event(status, &metadata)?,
            LifecycleEvent::CatalogueNew => self.on_catalogue_new(),
            LifecycleEvent::CatalogueProcessed => self.on_catalogue_processed(),
            LifecycleEvent::CatalogueRejected { error } => self.on_catalogue_rejected(error),
        }

        Ok(())
    }

    fn send(&self, subject: String, to: Vec<String>, template: Template, data: Map<String, Value>) {
        info!(
            event_type = %self.event.event_type,
            template = %template,
            recipients = to.len(),
            "Dispatching notification"
        );
        self.notifier.send_email(NotificationRequest {
            subject,
            from_address: self.config.email.from_address.clone(),
            to,
            template,
            data,
        });
    }

    fn on_submission_created(&self, meta: &SubmissionMetadata) {
        let (to, mut data) = self.common_submission(meta);
        data.insert("user_identifier".to_string(), Value::from(self.event.user_identifier.clone()));

        self.send(SBJ_SUB_CREATED.to_string(), to, Template::SubmissionCreated, data.clone());

        // Only the ethics officer copy carries the HMDMC numbers; it reuses the submission link
        if append_if_present(&mut data, "hmdmc_numbers", meta.hmdmc_numbers.as_ref()) {
            self.send(
                SBJ_SUB_CREATED_HMDMC.to_string(),
                vec![self.config.contact.email_hmdmc_verify.clone()],
                Template::SubmissionCreatedHmdmc,
                data,
            );
        }
    }

    fn on_submission_received(&self, meta: &SubmissionMetadata) {
        let (to, mut data) = self.common_submission(meta);
        append_if_present(&mut data, "barcode", meta.barcode.as_ref());
        append_if_present(&mut data, "created_at", meta.created_at.as_ref());
        append_if_present(&mut data, "all_received", meta.all_received.as_ref());

        self.send(SBJ_SUB_RECEIVED.to_string(), to, Template::SubmissionReceived, data);
    }

    fn common_submission(&self, meta: &SubmissionMetadata) -> (Vec<String>, Map<String, Value>) {
        let mut data = Map::new();
        if let Some(id) = meta.submission_id.as_ref().filter(|id| is_truthy(id)) {
            data.insert("submission_id".to_string(), id.clone());
            data.insert("link".to_string(), Value::from(self.links.submission(&value_text(id))));
        }
        let to = stakeholder_recipients(&self.event.user_identifier, &meta.stakeholders);
        (to, data)
    }

    fn on_manifest_created(&self, meta: &ManifestMetadata) {
        let (to, mut data) = self.common_manifest(meta);
        data.insert("user_identifier".to_string(), Value::from(self.event.user_identifier.clone()));
        let hmdmc = append_if_present(&mut data, "hmdmc_list", meta.hmdmc.as_ref());

        self.send(
            self.manifest_subject(SBJ_MAN_CREATED, meta),
            to,
            Template::ManifestCreated,
            data.clone(),
        );

        if hmdmc {
            self.send(
                self.manifest_subject(SBJ_MAN_CREATED_HMDMC, meta),
                vec![self.config.contact.email_hmdmc_verify.clone()],
                Template::ManifestCreatedHmdmc,
                data,
            );
        }
    }

    fn on_manifest_received(&self, meta: &ManifestMetadata) {
        let (to, data) = self.common_manifest(meta);
        self.send(
            self.manifest_subject(SBJ_MAN_RECEIVED, meta),
            to,
            Template::ManifestReceived,
            data,
        );
    }

    fn common_manifest(&self, meta: &ManifestMetadata) -> (Vec<String>, Map<String, Value>) {
        let mut data = Map::new();
        if let Some(id) = meta.manifest_id.as_ref().filter(|id| is_truthy(id)) {
            data.insert("manifest_id".to_string(), id.clone());
            data.insert("link".to_string(), Value::from(self.links.manifest(&value_text(id))));
        }
        let to = stakeholder_recipients(&self.event.user_identifier, &meta.stakeholders);
        (to, data)
    }

    fn manifest_subject(&self, prefix: &str, meta: &ManifestMetadata) -> String {
        match meta.manifest_id.as_ref().filter(|id| is_truthy(id)) {
            Some(id) => format!("{} {}", prefix, value_text(id)),
            None => prefix.to_string(),
        }
    }

    fn on_work_order_event(&self, status: WorkOrderStatus, meta: &WorkOrderMetadata) -> NotificationResult<()> {
        let work_order_id = meta
            .work_order_id
            .as_ref()
            .filter(|id| is_truthy(id))
            .ok_or_else(|| NotificationError::missing_field(&self.event.event_type, "work_order_id"))?;
        let (to, mut data) = self.common_work_order(work_order_id, meta);
        data.insert("user_identifier".to_string(), Value::from(self.event.user_identifier.clone()));
        data.insert("work_order_status".to_string(), Value::from(status.to_string()));

        let drs_study_code = meta
            .drs_study_code
            .as_ref()
            .filter(|code| is_truthy(code))
            .map(value_text)
            .unwrap_or_else(|| DRS_STUDY_CODE_PLACEHOLDER.to_string());

        let subject = format!(
            "{} {} {} [Data release:{}]",
            SBJ_PREFIX_WO,
            value_text(work_order_id),
            status.title(),
            drs_study_code
        );

        self.send(subject, to, Template::WoEvent, data);
        Ok(())
    }

    fn common_work_order(&self, work_order_id: &Value, meta: &WorkOrderMetadata) -> (Vec<String>, Map<String, Value>) {
        let mut data = Map::new();
        data.insert("work_order_id".to_string(), work_order_id.clone());
        if let Some(work_plan_id) = meta.work_plan_id.as_ref().filter(|id| is_truthy(id)) {
            data.insert(
                "link".to_string(),
                Value::from(self.links.work_plan(&value_text(work_plan_id))),
            );
        }
        (vec![self.event.user_identifier.clone()], data)
    }

    fn common_catalogue(&self) -> Vec<String> {
        vec![self.config.contact.email_dev_team.clone()]
    }

    fn on_catalogue_new(&self) {
        self.send(SBJ_CAT_NEW.to_string(), self.common_catalogue(), Template::CatalogueNew, Map::new());
    }

    fn on_catalogue_processed(&self) {
        self.send(
            SBJ_CAT_PROCESSED.to_string(),
            self.common_catalogue(),
            Template::CatalogueProcessed,
            Map::new(),
        );
    }

    fn on_catalogue_rejected(&self, error: Option<Value>) {
        let mut data = Map::new();
        data.insert("error".to_string(), error.unwrap_or(Value::Null));
        data.insert("timestamp".to_string(), Value::from(self.event.timestamp.clone()));
        self.send(
            SBJ_CAT_REJECTED.to_string(),
            self.common_catalogue(),
            Template::CatalogueRejected,
            data,
        );
    }
}
