use std::collections::BTreeSet;

use crate::context::AppContext;
use crate::domain::ticket::TicketKey;
use crate::error::AppResult;
use crate::workflow::history::MergeHistoryCollector;
use crate::workflow::links::TicketLinkResolver;
use crate::workflow::reconcile::MatchMode;

#[derive(Debug, Clone)]
pub struct KeepRequest {
    pub bucket: TicketKey,
    pub from: String,
    pub to: String,
    /// Lowercased component names.
    pub components: BTreeSet<String>,
    pub match_mode: MatchMode,
    pub expansion_depth: usize,
}

/// Splits a comma separated component list into lowercased names.
pub fn parse_components(input: &str) -> BTreeSet<String> {
    input
        .split(',')
        .map(|component| component.trim().to_lowercase())
        .filter(|component| !component.is_empty())
        .collect()
}

fn mentions_component(text: &str, components: &BTreeSet<String>) -> bool {
    let text = text.to_lowercase();
    components
        .iter()
        .any(|component| text.contains(component.as_str()))
}

/// Tickets of an incremental release that touch the given components.
///
/// A linked ticket is kept when a merge touching one of the components
/// carries its key, or when its summary names a component.
pub async fn tickets_to_keep(ctx: &AppContext, request: KeepRequest) -> AppResult<Vec<TicketKey>> {
    let linked = TicketLinkResolver::new(ctx.issue_tracker.as_ref())
        .resolve(&request.bucket)
        .await?;

    let commits = MergeHistoryCollector::new(ctx.version_control.as_ref())
        .with_expansion_depth(request.expansion_depth)
        .collect(&request.from, &request.to)
        .await?;

    let mut relevant_keys = BTreeSet::new();
    for commit in commits.iter() {
        let files = ctx.version_control.changed_files(commit).await?;
        if files
            .iter()
            .any(|file| mentions_component(file, &request.components))
        {
            relevant_keys.insert(commit.ticket_key());
        }
    }
    tracing::info!(
        relevant = relevant_keys.len(),
        "found merges touching the components"
    );

    Ok(linked
        .iter()
        .filter(|ticket| {
            relevant_keys
                .iter()
                .any(|commit_key| request.match_mode.matches(&ticket.key, commit_key))
                || mentions_component(&ticket.summary, &request.components)
        })
        .map(|ticket| ticket.key.clone())
        .collect())
}
