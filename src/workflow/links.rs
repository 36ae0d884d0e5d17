use std::collections::{BTreeMap, BTreeSet};

use crate::domain::ticket::{Ticket, TicketKey, TicketLink};
use crate::error::AppResult;
use crate::services::IssueTrackerService;

/// Tickets linked to a bucket ticket, keyed by ticket key.
#[derive(Debug, Clone, Default)]
pub struct LinkedTicketSet {
    tickets: BTreeMap<TicketKey, Ticket>,
}

impl LinkedTicketSet {
    pub fn insert(&mut self, ticket: Ticket) {
        self.tickets.insert(ticket.key.clone(), ticket);
    }

    pub fn keys(&self) -> BTreeSet<TicketKey> {
        self.tickets.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.values()
    }
}

/// Explicit candidate list split by presence among a release's linked keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketConfirmation {
    pub found: BTreeSet<TicketKey>,
    pub missing: BTreeSet<TicketKey>,
}

impl BucketConfirmation {
    pub fn partition(linked: &BTreeSet<TicketKey>, candidates: &BTreeSet<TicketKey>) -> Self {
        let (found, missing) = candidates
            .iter()
            .cloned()
            .partition(|candidate| linked.contains(candidate));
        Self { found, missing }
    }
}

/// Links of `ticket` that carry release work.
pub fn substantive_links(ticket: &Ticket) -> Vec<TicketLink> {
    ticket
        .links
        .iter()
        .filter(|link| link.is_substantive())
        .cloned()
        .collect()
}

pub struct TicketLinkResolver<'a> {
    issue_tracker: &'a dyn IssueTrackerService,
}

impl<'a> TicketLinkResolver<'a> {
    pub fn new(issue_tracker: &'a dyn IssueTrackerService) -> Self {
        Self { issue_tracker }
    }

    /// Substantive links of `bucket`, in link order.
    pub async fn bucket_links(&self, bucket: &TicketKey) -> AppResult<Vec<TicketLink>> {
        let bucket_ticket = self.issue_tracker.fetch_ticket(bucket).await?;
        let links = substantive_links(&bucket_ticket);
        tracing::info!(
            %bucket,
            total = bucket_ticket.links.len(),
            kept = links.len(),
            "read bucket links"
        );
        Ok(links)
    }

    /// Resolves the far side of every substantive link, one lookup per link.
    pub async fn resolve(&self, bucket: &TicketKey) -> AppResult<LinkedTicketSet> {
        let bucket_ticket = self.issue_tracker.fetch_ticket(bucket).await?;
        self.resolve_links_of(&bucket_ticket).await
    }

    /// Same as [`Self::resolve`] for a bucket ticket already in hand.
    pub async fn resolve_links_of(&self, bucket: &Ticket) -> AppResult<LinkedTicketSet> {
        let mut linked = LinkedTicketSet::default();
        for link in substantive_links(bucket) {
            linked.insert(self.issue_tracker.fetch_ticket(&link.other).await?);
        }
        tracing::debug!(bucket = %bucket.key, resolved = linked.tickets.len(), "resolved links");
        Ok(linked)
    }

    /// Partitions `candidates` into keys the bucket links and keys it does
    /// not. Only the bucket itself is looked up.
    pub async fn confirm_in_bucket(
        &self,
        bucket: &TicketKey,
        candidates: &BTreeSet<TicketKey>,
    ) -> AppResult<BucketConfirmation> {
        let linked_keys = self
            .bucket_links(bucket)
            .await?
            .into_iter()
            .map(|link| link.other)
            .collect::<BTreeSet<_>>();

        let confirmation = BucketConfirmation::partition(&linked_keys, candidates);
        if !confirmation.missing.is_empty() {
            tracing::warn!(
                %bucket,
                missing = confirmation.missing.len(),
                "requested tickets are not linked to the bucket"
            );
        }
        Ok(confirmation)
    }
}
