use std::collections::BTreeSet;

use crate::context::AppContext;
use crate::domain::ticket::{TicketKey, TicketLink};
use crate::error::AppResult;

/// Moves every link of `current` whose far ticket is not in `keep` over to
/// `next`. Returns the links that moved (or would move, on a dry run).
pub async fn move_bucket_links(
    ctx: &AppContext,
    current: &TicketKey,
    next: &TicketKey,
    keep: &BTreeSet<TicketKey>,
    dry_run: bool,
) -> AppResult<Vec<TicketLink>> {
    let current_ticket = ctx.issue_tracker.fetch_ticket(current).await?;
    let moving = current_ticket
        .links
        .into_iter()
        .filter(|link| !keep.contains(&link.other))
        .collect::<Vec<_>>();

    if dry_run {
        return Ok(moving);
    }

    for link in &moving {
        ctx.issue_tracker.create_link(next, link).await?;
        ctx.issue_tracker.delete_link(&link.id).await?;
        tracing::info!(ticket = %link.other, from = %current, to = %next, "moved link");
    }
    Ok(moving)
}
