use std::collections::{HashSet, VecDeque};

use crate::domain::branch::BranchName;
use crate::domain::commit::{Commit, MergeCommitSet};
use crate::error::AppResult;
use crate::services::VersionControlService;
use crate::workflow::branches::BranchResolver;

/// Expand only ticket branches merged straight into the release range.
pub const DEFAULT_EXPANSION_DEPTH: usize = 1;

/// Walks merge history over a release window, pulling in merges that live on
/// ticket branches merged into that window.
pub struct MergeHistoryCollector<'a> {
    version_control: &'a dyn VersionControlService,
    expansion_depth: usize,
}

impl<'a> MergeHistoryCollector<'a> {
    pub fn new(version_control: &'a dyn VersionControlService) -> Self {
        Self {
            version_control,
            expansion_depth: DEFAULT_EXPANSION_DEPTH,
        }
    }

    /// How many levels of `tickets/<KEY>` branches get walked. `0` disables
    /// expansion entirely.
    pub fn with_expansion_depth(mut self, depth: usize) -> Self {
        self.expansion_depth = depth;
        self
    }

    /// Merge commits in `from..to` plus those in `from..tickets/<KEY>` for
    /// every merged ticket branch that still exists.
    ///
    /// Only the primary walk can fail the call. A ticket branch that cannot
    /// be resolved or walked is skipped.
    pub async fn collect(&self, from: &str, to: &str) -> AppResult<MergeCommitSet> {
        let resolver = BranchResolver::new(self.version_control);
        let mut merges = MergeCommitSet::new();
        let mut visited = HashSet::new();

        let primary = self.version_control.merge_commits(from, to).await?;
        tracing::info!(from, to, count = primary.len(), "walked release range");

        let mut pending: VecDeque<(Commit, usize)> =
            primary.into_iter().map(|commit| (commit, 0)).collect();

        while let Some((commit, depth)) = pending.pop_front() {
            let key = commit.ticket_key();
            if !merges.insert(commit) || depth >= self.expansion_depth {
                continue;
            }

            let branch = BranchName::for_ticket(&key);
            if !visited.insert(branch.clone()) || !resolver.available(&branch).await {
                continue;
            }

            match self.version_control.merge_commits(from, branch.as_str()).await {
                Ok(children) => {
                    tracing::debug!(%branch, count = children.len(), "expanded ticket branch");
                    pending.extend(children.into_iter().map(|child| (child, depth + 1)));
                }
                Err(err) => {
                    tracing::warn!(%branch, error = %err, "skipping ticket branch");
                }
            }
        }

        tracing::info!(count = merges.len(), "collected merge commits");
        Ok(merges)
    }
}
