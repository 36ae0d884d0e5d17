use async_trait::async_trait;

use crate::domain::branch::{BranchName, FetchOutcome};
use crate::domain::commit::Commit;
use crate::error::AppResult;

#[async_trait]
pub trait VersionControlService: Send + Sync {
    /// Merge commits reachable from `to` but not from `from`.
    async fn merge_commits(&self, from: &str, to: &str) -> AppResult<Vec<Commit>>;

    async fn has_local_branch(&self, branch: &BranchName) -> AppResult<bool>;

    /// Fetches `branch` from the default remote into a same-named local ref.
    ///
    /// A remote that rejects the ref is reported as `FetchOutcome::NotFound`,
    /// not as an error.
    async fn fetch_branch(&self, branch: &BranchName) -> AppResult<FetchOutcome>;

    /// Paths touched by a merge relative to its first parent.
    async fn changed_files(&self, commit: &Commit) -> AppResult<Vec<String>>;
}
