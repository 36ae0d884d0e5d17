use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{IssueTrackerService, VersionControlService};

/// Everything a workflow needs for one run; built once in `main`.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub version_control: Arc<dyn VersionControlService>,
    pub issue_tracker: Arc<dyn IssueTrackerService>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        version_control: Arc<dyn VersionControlService>,
        issue_tracker: Arc<dyn IssueTrackerService>,
    ) -> Self {
        Self {
            config,
            version_control,
            issue_tracker,
        }
    }
}
