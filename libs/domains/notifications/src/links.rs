//! Links back into the web application, embedded in notification bodies.

use crate::config::LinkConfig;

/// Path of the submission page.
pub const PATH_SUBMISSION: &str = "submissions";
/// Path of the reception page that lists manifests.
pub const PATH_RECEPTION: &str = "reception/material_submissions";
/// Work plan path segments surrounding the work plan id.
pub const PATH_WORK_ORDER_BEGIN: &str = "work-orders/work_plans";
pub const PATH_WORK_ORDER_END: &str = "dispatch";

/// Formats links against a [`LinkConfig`]. Pure string formatting.
#[derive(Debug, Clone, Copy)]
pub struct LinkBuilder<'a> {
    config: &'a LinkConfig,
}

impl<'a> LinkBuilder<'a> {
    pub fn new(config: &'a LinkConfig) -> Self {
        Self { config }
    }

    fn base(&self) -> String {
        format!("{}://{}:{}", self.config.protocol, self.config.root, self.config.port)
    }

    /// `{protocol}://{root}:{port}/{path}/{id}`
    pub fn entity(&self, path: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base(), path, id)
    }

    pub fn submission(&self, submission_id: &str) -> String {
        self.entity(PATH_SUBMISSION, submission_id)
    }

    pub fn manifest(&self, manifest_id: &str) -> String {
        self.entity(PATH_RECEPTION, manifest_id)
    }

    /// `{protocol}://{root}:{port}/work-orders/work_plans/{work_plan_id}/dispatch`
    pub fn work_plan(&self, work_plan_id: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base(),
            PATH_WORK_ORDER_BEGIN,
            work_plan_id,
            PATH_WORK_ORDER_END
        )
    }
}
