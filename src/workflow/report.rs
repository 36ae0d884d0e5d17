use std::collections::BTreeSet;

use crate::domain::ticket::TicketKey;
use crate::workflow::reconcile::ReconciliationResult;

pub const NOT_IN_BUCKET_HEADER: &str = "Tickets not linked to the bucket ticket:";
pub const UNTRACKED_HEADER: &str = "Merge commits without a tracked ticket:";
pub const NO_COMMITS_HEADER: &str = "No commits found for the following tickets:";
pub const FOUND_HEADER: &str = "Found commits for the following tickets:";

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub verbose: bool,
    /// Requested keys the bucket ticket does not link.
    pub not_in_bucket: BTreeSet<TicketKey>,
    /// Projects whose untracked merges are listed; empty lists them all.
    pub ticket_projects: Vec<String>,
}

/// Renders a reconciliation as plain text.
///
/// Verbose-only blocks come first so the output always ends with the
/// found-commits header followed by one `<key>: <commit>` line per match.
pub fn render(result: &ReconciliationResult, options: &ReportOptions) -> String {
    let mut out = String::new();

    if options.verbose {
        push_block(
            &mut out,
            NOT_IN_BUCKET_HEADER,
            options.not_in_bucket.iter().map(TicketKey::to_string),
        );
        push_block(
            &mut out,
            UNTRACKED_HEADER,
            result
                .untracked_commits
                .iter()
                .filter(|(_, commit_key)| {
                    options.ticket_projects.is_empty()
                        || commit_key.is_in_projects(&options.ticket_projects)
                })
                .map(|(commit_id, commit_key)| format!("{commit_key}: {commit_id}")),
        );
    }

    push_block(
        &mut out,
        NO_COMMITS_HEADER,
        result.tickets_without_commits.iter().map(TicketKey::to_string),
    );

    push_line(&mut out, FOUND_HEADER);
    for relevant in &result.relevant_commits {
        push_line(
            &mut out,
            &format!("{}: {}", relevant.commit_key, relevant.commit_id),
        );
    }
    out
}

/// Header plus lines, or nothing when there are no lines.
fn push_block(out: &mut String, header: &str, lines: impl Iterator<Item = String>) {
    let mut lines = lines.peekable();
    if lines.peek().is_none() {
        return;
    }
    push_line(out, header);
    for line in lines {
        push_line(out, &line);
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
