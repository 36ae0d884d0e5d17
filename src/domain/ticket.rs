use std::collections::BTreeSet;
use std::fmt;

/// Statuses that count as finished regardless of labels.
pub const CLOSED_STATUSES: [&str; 4] = ["Done", "Won't Fix", "Invalid", "Resolved"];

/// Link relation that records informational coupling only.
pub const NON_SUBSTANTIVE_RELATION: &str = "is triggering";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TicketKey(pub String);

impl TicketKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last `/`-separated segment of the message's first line.
    ///
    /// Merge commits conventionally read `... from org/tickets/<KEY>`. No
    /// shape validation happens here: a message that breaks the convention
    /// still yields a key, it just never matches a real ticket.
    pub fn from_commit_message(message: &str) -> Self {
        let first_line = message.lines().next().unwrap_or_default();
        let last_segment = first_line.rsplit('/').next().unwrap_or_default();
        Self(last_segment.to_string())
    }

    /// True for `<PROJECT>-<number>` where `PROJECT` is one of `projects`.
    pub fn is_in_projects(&self, projects: &[String]) -> bool {
        match self.0.split_once('-') {
            Some((project, number)) => {
                projects.iter().any(|known| known == project)
                    && !number.is_empty()
                    && number.chars().all(|c| c.is_ascii_digit())
            }
            None => false,
        }
    }

    /// Parses a comma separated key list, dropping blanks.
    pub fn parse_list(input: &str) -> BTreeSet<TicketKey> {
        input
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(TicketKey::new)
            .collect()
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSide {
    /// The other ticket sits on the inward end of the link.
    Inward,
    Outward,
}

/// One issue link as seen from the ticket that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketLink {
    pub id: String,
    pub type_name: String,
    /// Relation text for the populated side, e.g. "is blocked by".
    pub relation: String,
    pub side: LinkSide,
    pub other: TicketKey,
}

impl TicketLink {
    pub fn is_substantive(&self) -> bool {
        !self
            .relation
            .trim()
            .eq_ignore_ascii_case(NON_SUBSTANTIVE_RELATION)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub key: TicketKey,
    pub status: String,
    pub labels: BTreeSet<String>,
    pub summary: String,
    pub links: Vec<TicketLink>,
}

impl Ticket {
    pub fn is_closed(&self) -> bool {
        CLOSED_STATUSES.contains(&self.status.as_str())
    }

    /// Closed, or still open but carrying the done label.
    pub fn is_done(&self, done_label: &str) -> bool {
        self.is_closed() || self.labels.contains(done_label)
    }
}
