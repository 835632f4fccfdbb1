//! Email template rendering engine.
//!
//! This module provides Handlebars-based rendering for every [`Template`].
//! Each template has an HTML and a plain text variant, registered as
//! `{name}_html` and `{name}_text`.

use crate::error::{NotificationError, NotificationResult};
use crate::models::Template;
use handlebars::Handlebars;
use serde_json::{Map, Value};
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::debug;

/// Rendered email bodies.
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    /// HTML body content.
    pub html: String,
    /// Plain text body content.
    pub text: String,
}

/// Template engine for rendering notification emails.
#[derive(Clone)]
pub struct TemplateEngine {
    handlebars: Arc<Handlebars<'static>>,
}

impl TemplateEngine {
    /// Create a new template engine with all templates registered.
    pub fn new() -> NotificationResult<Self> {
        let mut handlebars = Handlebars::new();

        for template in Template::iter() {
            let (html, text) = sources(template);
            for (suffix, source) in [("html", html), ("text", text)] {
                let name = format!("{}_{}", template, suffix);
                handlebars
                    .register_template_string(&name, source)
                    .map_err(|e| NotificationError::TemplateError(format!("Failed to register {}: {}", name, e)))?;
            }
        }

        Ok(Self {
            handlebars: Arc::new(handlebars),
        })
    }

    /// Render both variants of `template` with the request's data.
    pub fn render(&self, template: Template, data: &Map<String, Value>) -> NotificationResult<RenderedEmail> {
        debug!(template = %template, "Rendering email");

        let html = self.handlebars.render(&format!("{}_html", template), data)?;
        let text = self.handlebars.render(&format!("{}_text", template), data)?;

        Ok(RenderedEmail { html, text })
    }
}

fn sources(template: Template) -> (&'static str, &'static str) {
    match template {
        Template::SubmissionCreated => (SUBMISSION_CREATED_HTML, SUBMISSION_CREATED_TEXT),
        Template::SubmissionCreatedHmdmc => (SUBMISSION_CREATED_HMDMC_HTML, SUBMISSION_CREATED_HMDMC_TEXT),
        Template::SubmissionReceived => (SUBMISSION_RECEIVED_HTML, SUBMISSION_RECEIVED_TEXT),
        Template::ManifestCreated => (MANIFEST_CREATED_HTML, MANIFEST_CREATED_TEXT),
        Template::ManifestCreatedHmdmc => (MANIFEST_CREATED_HMDMC_HTML, MANIFEST_CREATED_HMDMC_TEXT),
        Template::ManifestReceived => (MANIFEST_RECEIVED_HTML, MANIFEST_RECEIVED_TEXT),
        Template::WoEvent => (WO_EVENT_HTML, WO_EVENT_TEXT),
        Template::CatalogueNew => (CATALOGUE_NEW_HTML, CATALOGUE_NEW_TEXT),
        Template::CatalogueProcessed => (CATALOGUE_PROCESSED_HTML, CATALOGUE_PROCESSED_TEXT),
        Template::CatalogueRejected => (CATALOGUE_REJECTED_HTML, CATALOGUE_REJECTED_TEXT),
    }
}

// ============================================================================
// Email Templates
// ============================================================================

const SUBMISSION_CREATED_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; color: #18181b;">
  <h1 style="font-size: 20px;">Submission created</h1>
  <p>A new sample submission{{#if submission_id}} ({{submission_id}}){{/if}} has been created by {{user_identifier}}.</p>
  {{#if link}}<p><a href="{{link}}" style="color: #2563eb;">View submission</a></p>{{/if}}
</body>
</html>"#;

const SUBMISSION_CREATED_TEXT: &str = r#"Submission created

A new sample submission{{#if submission_id}} ({{submission_id}}){{/if}} has been created by {{user_identifier}}.
{{#if link}}
View submission: {{link}}
{{/if}}"#;

const SUBMISSION_CREATED_HMDMC_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; color: #18181b;">
  <h1 style="font-size: 20px;">HMDMC verification required</h1>
  <p>Submission{{#if submission_id}} {{submission_id}}{{/if}} created by {{user_identifier}} lists the following HMDMC numbers:</p>
  <ul>{{#each hmdmc_numbers}}<li>{{this}}</li>{{/each}}</ul>
  {{#if link}}<p><a href="{{link}}" style="color: #2563eb;">Review submission</a></p>{{/if}}
</body>
</html>"#;

const SUBMISSION_CREATED_HMDMC_TEXT: &str = r#"HMDMC verification required

Submission{{#if submission_id}} {{submission_id}}{{/if}} created by {{user_identifier}} lists the following HMDMC numbers:
{{#each hmdmc_numbers}}
- {{this}}
{{/each}}
{{#if link}}
Review submission: {{link}}
{{/if}}"#;

const SUBMISSION_RECEIVED_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; color: #18181b;">
  <h1 style="font-size: 20px;">Submission received</h1>
  <p>Labware{{#if barcode}} {{barcode}}{{/if}} for submission{{#if submission_id}} {{submission_id}}{{/if}} has been received{{#if created_at}} on {{created_at}}{{/if}}.</p>
  {{#if all_received}}<p><strong>All labware for this submission has now been received.</strong></p>{{/if}}
  {{#if link}}<p><a href="{{link}}" style="color: #2563eb;">View submission</a></p>{{/if}}
</body>
</html>"#;

const SUBMISSION_RECEIVED_TEXT: &str = r#"Submission received

Labware{{#if barcode}} {{barcode}}{{/if}} for submission{{#if submission_id}} {{submission_id}}{{/if}} has been received{{#if created_at}} on {{created_at}}{{/if}}.
{{#if all_received}}
All labware for this submission has now been received.
{{/if}}
{{#if link}}
View submission: {{link}}
{{/if}}"#;

const MANIFEST_CREATED_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; color: #18181b;">
  <h1 style="font-size: 20px;">Manifest created</h1>
  <p>Manifest{{#if manifest_id}} {{manifest_id}}{{/if}} has been created by {{user_identifier}}.</p>
  {{#if link}}<p><a href="{{link}}" style="color: #2563eb;">View manifest</a></p>{{/if}}
</body>
</html>"#;

const MANIFEST_CREATED_TEXT: &str = r#"Manifest created

Manifest{{#if manifest_id}} {{manifest_id}}{{/if}} has been created by {{user_identifier}}.
{{#if link}}
View manifest: {{link}}
{{/if}}"#;

const MANIFEST_CREATED_HMDMC_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; color: #18181b;">
  <h1 style="font-size: 20px;">HMDMC verification required</h1>
  <p>Manifest{{#if manifest_id}} {{manifest_id}}{{/if}} created by {{user_identifier}} references HMDMC: {{hmdmc_list}}</p>
  {{#if link}}<p><a href="{{link}}" style="color: #2563eb;">Review manifest</a></p>{{/if}}
</body>
</html>"#;

const MANIFEST_CREATED_HMDMC_TEXT: &str = r#"HMDMC verification required

Manifest{{#if manifest_id}} {{manifest_id}}{{/if}} created by {{user_identifier}} references HMDMC: {{hmdmc_list}}
{{#if link}}
Review manifest: {{link}}
{{/if}}"#;

const MANIFEST_RECEIVED_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; color: #18181b;">
  <h1 style="font-size: 20px;">Manifest received</h1>
  <p>Manifest{{#if manifest_id}} {{manifest_id}}{{/if}} has been received.</p>
  {{#if link}}<p><a href="{{link}}" style="color: #2563eb;">View manifest</a></p>{{/if}}
</body>
</html>"#;

const MANIFEST_RECEIVED_TEXT: &str = r#"Manifest received

Manifest{{#if manifest_id}} {{manifest_id}}{{/if}} has been received.
{{#if link}}
View manifest: {{link}}
{{/if}}"#;

const WO_EVENT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; color: #18181b;">
  <h1 style="font-size: 20px;">Work order {{work_order_id}} {{work_order_status}}</h1>
  <p>Work order {{work_order_id}} has been {{work_order_status}}.</p>
  {{#if link}}<p><a href="{{link}}" style="color: #2563eb;">View work plan</a></p>{{/if}}
</body>
</html>"#;

const WO_EVENT_TEXT: &str = r#"Work order {{work_order_id}} {{work_order_status}}

Work order {{work_order_id}} has been {{work_order_status}}.
{{#if link}}
View work plan: {{link}}
{{/if}}"#;

const CATALOGUE_NEW_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; color: #18181b;">
  <p>A new catalogue has been published.</p>
</body>
</html>"#;

const CATALOGUE_NEW_TEXT: &str = "A new catalogue has been published.";

const CATALOGUE_PROCESSED_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; color: #18181b;">
  <p>The latest catalogue has been processed.</p>
</body>
</html>"#;

const CATALOGUE_PROCESSED_TEXT: &str = "The latest catalogue has been processed.";

const CATALOGUE_REJECTED_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; color: #18181b;">
  <h1 style="font-size: 20px; color: #b91c1c;">Catalogue rejected</h1>
  <p>A catalogue was rejected at {{timestamp}}.</p>
  <pre style="background-color: #f4f4f5; padding: 12px;">{{error}}</pre>
</body>
</html>"#;

const CATALOGUE_REJECTED_TEXT: &str = r#"Catalogue rejected

A catalogue was rejected at {{timestamp}}.

{{error}}"#;
