use crate::context::AppContext;
use crate::domain::ticket::{Ticket, TicketKey};
use crate::error::AppResult;
use crate::workflow::links::TicketLinkResolver;
use crate::workflow::release::fix_version_tickets;

pub struct TicketProgress {
    pub ticket: Ticket,
    pub done: bool,
}

pub struct ReleaseStatus {
    pub bucket: Ticket,
    pub tickets: Vec<TicketProgress>,
}

impl ReleaseStatus {
    pub fn outstanding(&self) -> usize {
        self.tickets.iter().filter(|progress| !progress.done).count()
    }
}

/// Progress of every ticket linked to a release's bucket ticket.
pub async fn release_status(ctx: &AppContext, bucket: &TicketKey) -> AppResult<ReleaseStatus> {
    let bucket_ticket = ctx.issue_tracker.fetch_ticket(bucket).await?;
    ticket_status(ctx, bucket_ticket).await
}

/// One status block per ticket scheduled for `version`.
pub async fn fix_version_status(ctx: &AppContext, version: &str) -> AppResult<Vec<ReleaseStatus>> {
    let mut statuses = Vec::new();
    for release_ticket in fix_version_tickets(ctx, version).await? {
        statuses.push(ticket_status(ctx, release_ticket).await?);
    }
    Ok(statuses)
}

async fn ticket_status(ctx: &AppContext, bucket: Ticket) -> AppResult<ReleaseStatus> {
    let linked = TicketLinkResolver::new(ctx.issue_tracker.as_ref())
        .resolve_links_of(&bucket)
        .await?;

    let done_label = ctx.config.done_label.as_str();
    let tickets = linked
        .iter()
        .map(|ticket| TicketProgress {
            done: ticket.is_done(done_label),
            ticket: ticket.clone(),
        })
        .collect();

    Ok(ReleaseStatus { bucket, tickets })
}
