use std::fmt;

use crate::domain::ticket::TicketKey;

const TICKET_BRANCH_PREFIX: &str = "tickets";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchName(pub String);

impl BranchName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Conventional work branch for a ticket: `tickets/<KEY>`.
    pub fn for_ticket(key: &TicketKey) -> Self {
        Self(format!("{TICKET_BRANCH_PREFIX}/{}", key.as_str().trim()))
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of asking the remote for a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A local ref of the same name now points at the remote tip.
    Fetched,
    NotFound { reason: String },
}
