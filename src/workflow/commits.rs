use std::collections::BTreeSet;

use crate::context::AppContext;
use crate::domain::ticket::TicketKey;
use crate::error::{AppError, AppResult};
use crate::workflow::history::MergeHistoryCollector;
use crate::workflow::links::{BucketConfirmation, TicketLinkResolver};
use crate::workflow::reconcile::{MatchMode, ReconciliationResult, reconcile};
use crate::workflow::release::{fix_version_tickets, release_ticket_keys};

/// Where the tracker-side ticket set of a release comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseSource {
    Bucket(TicketKey),
    /// Tickets scheduled for a fix version plus the tickets they link.
    FixVersion(String),
}

#[derive(Debug, Clone)]
pub struct CommitCorrelationRequest {
    pub source: Option<ReleaseSource>,
    pub tickets: Option<BTreeSet<TicketKey>>,
    pub from: String,
    pub to: String,
    pub match_mode: MatchMode,
    pub expansion_depth: usize,
}

pub struct CommitCorrelationOutcome {
    pub result: ReconciliationResult,
    pub not_in_bucket: BTreeSet<TicketKey>,
}

/// Reconciles the merges of a release window against its tracked tickets.
///
/// Tickets come from the bucket's links, from a fix version, from an explicit
/// list, or from an explicit list confirmed against the release's tickets
/// when both are given.
pub async fn correlate_commits(
    ctx: &AppContext,
    request: CommitCorrelationRequest,
) -> AppResult<CommitCorrelationOutcome> {
    let resolver = TicketLinkResolver::new(ctx.issue_tracker.as_ref());

    let (tickets, not_in_bucket) = match (request.source, request.tickets) {
        (Some(ReleaseSource::Bucket(bucket)), Some(candidates)) => {
            let confirmation = resolver.confirm_in_bucket(&bucket, &candidates).await?;
            (confirmation.found, confirmation.missing)
        }
        (Some(ReleaseSource::Bucket(bucket)), None) => {
            (resolver.resolve(&bucket).await?.keys(), BTreeSet::new())
        }
        (Some(ReleaseSource::FixVersion(version)), candidates) => {
            let release_keys = release_ticket_keys(&fix_version_tickets(ctx, &version).await?);
            match candidates {
                Some(candidates) => {
                    let confirmation = BucketConfirmation::partition(&release_keys, &candidates);
                    (confirmation.found, confirmation.missing)
                }
                None => (release_keys, BTreeSet::new()),
            }
        }
        (None, Some(candidates)) => (candidates, BTreeSet::new()),
        (None, None) => {
            return Err(AppError::Configuration(
                "a bucket ticket, a fix version or a ticket list is required".to_string(),
            ));
        }
    };

    let commits = MergeHistoryCollector::new(ctx.version_control.as_ref())
        .with_expansion_depth(request.expansion_depth)
        .collect(&request.from, &request.to)
        .await?;

    Ok(CommitCorrelationOutcome {
        result: reconcile(&commits, &tickets, request.match_mode),
        not_in_bucket,
    })
}
