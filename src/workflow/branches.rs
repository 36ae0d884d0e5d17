use crate::domain::branch::{BranchName, FetchOutcome};
use crate::services::VersionControlService;

/// Best-effort existence checks for ticket branches.
///
/// Release windows routinely mention branches deleted after merging, so no
/// failure here is ever fatal: anything other than a successful fetch means
/// the branch does not exist.
pub struct BranchResolver<'a> {
    version_control: &'a dyn VersionControlService,
}

impl<'a> BranchResolver<'a> {
    pub fn new(version_control: &'a dyn VersionControlService) -> Self {
        Self { version_control }
    }

    /// Fetches `branch` into a same-named local ref; true when the remote had it.
    pub async fn exists(&self, branch: &BranchName) -> bool {
        match self.version_control.fetch_branch(branch).await {
            Ok(FetchOutcome::Fetched) => {
                tracing::debug!(%branch, "fetched ticket branch");
                true
            }
            Ok(FetchOutcome::NotFound { reason }) => {
                tracing::debug!(%branch, %reason, "ticket branch not on remote");
                false
            }
            Err(err) => {
                tracing::warn!(%branch, error = %err, "fetch failed; treating branch as absent");
                false
            }
        }
    }

    /// Local ref first, remote fetch otherwise.
    pub async fn available(&self, branch: &BranchName) -> bool {
        match self.version_control.has_local_branch(branch).await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(%branch, error = %err, "could not inspect local refs");
            }
        }
        self.exists(branch).await
    }
}
