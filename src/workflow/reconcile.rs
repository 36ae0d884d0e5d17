use std::collections::BTreeSet;

use crate::domain::commit::{CommitId, MergeCommitSet};
use crate::domain::ticket::TicketKey;

/// How a ticket key is compared with the key derived from a merge commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Keys must be identical.
    #[default]
    Exact,
    /// The ticket key only has to occur inside the commit key. `CAP-1` also
    /// matches a `CAP-10` merge in this mode.
    Substring,
}

impl MatchMode {
    pub fn matches(self, ticket: &TicketKey, commit_key: &TicketKey) -> bool {
        match self {
            MatchMode::Exact => ticket == commit_key,
            MatchMode::Substring => commit_key.as_str().contains(ticket.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevantCommit {
    pub commit_id: CommitId,
    /// Key extracted from the commit message.
    pub commit_key: TicketKey,
    /// Tracked ticket the commit was matched to.
    pub ticket: TicketKey,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub relevant_commits: Vec<RelevantCommit>,
    pub tickets_with_commits: BTreeSet<TicketKey>,
    pub tickets_without_commits: BTreeSet<TicketKey>,
    /// Merges whose key matched no tracked ticket.
    pub untracked_commits: Vec<(CommitId, TicketKey)>,
}

/// Matches every merge against every tracked ticket key.
///
/// A commit appears once in `relevant_commits` per ticket it matched. The two
/// ticket sets always partition `tickets`.
pub fn reconcile(
    commits: &MergeCommitSet,
    tickets: &BTreeSet<TicketKey>,
    mode: MatchMode,
) -> ReconciliationResult {
    let mut result = ReconciliationResult::default();

    for commit in commits.iter() {
        let commit_key = commit.ticket_key();
        let mut matched = false;
        for ticket in tickets {
            if mode.matches(ticket, &commit_key) {
                matched = true;
                result.tickets_with_commits.insert(ticket.clone());
                result.relevant_commits.push(RelevantCommit {
                    commit_id: commit.id.clone(),
                    commit_key: commit_key.clone(),
                    ticket: ticket.clone(),
                });
            }
        }
        if !matched {
            result
                .untracked_commits
                .push((commit.id.clone(), commit_key));
        }
    }

    result.tickets_without_commits = tickets
        .difference(&result.tickets_with_commits)
        .cloned()
        .collect();
    tracing::info!(
        matched = result.tickets_with_commits.len(),
        unmatched = result.tickets_without_commits.len(),
        untracked = result.untracked_commits.len(),
        "reconciled commits against tickets"
    );
    result
}
