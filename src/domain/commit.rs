use std::collections::BTreeMap;
use std::fmt;

use crate::domain::ticket::TicketKey;

/// Full hex object name of a commit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitId(pub String);

impl CommitId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: CommitId,
    pub message: String,
    pub parent_count: usize,
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parent_count >= 2
    }

    /// Ticket key named by the merged branch on the first line of the message.
    pub fn ticket_key(&self) -> TicketKey {
        TicketKey::from_commit_message(&self.message)
    }
}

/// Merge commits collected over a release window, deduplicated by id.
///
/// Iteration follows commit id order so reports are reproducible between
/// runs over the same range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeCommitSet {
    commits: BTreeMap<CommitId, Commit>,
}

impl MergeCommitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when a commit with the same id was already present.
    pub fn insert(&mut self, commit: Commit) -> bool {
        if self.commits.contains_key(&commit.id) {
            return false;
        }
        self.commits.insert(commit.id.clone(), commit);
        true
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Commit> {
        self.commits.values()
    }
}

impl FromIterator<Commit> for MergeCommitSet {
    fn from_iter<I: IntoIterator<Item = Commit>>(iter: I) -> Self {
        let mut set = Self::new();
        for commit in iter {
            set.insert(commit);
        }
        set
    }
}
