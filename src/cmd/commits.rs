use clap::{ArgGroup, Args};

use crate::context::AppContext;
use crate::domain::ticket::TicketKey;
use crate::error::AppResult;
use crate::workflow::commits::{CommitCorrelationRequest, ReleaseSource, correlate_commits};
use crate::workflow::history::DEFAULT_EXPANSION_DEPTH;
use crate::workflow::report::{ReportOptions, render};

use super::match_mode;

#[derive(Args, Debug, Clone)]
#[command(group(
    ArgGroup::new("ticket_source")
        .required(true)
        .multiple(true)
        .args(["bucket", "fix_version", "tickets"])
))]
pub struct CommitsArgs {
    /// Tag or ref of the previous release.
    pub previous: String,
    /// Ref the release is cut from; defaults to the configured integration branch.
    #[arg(long)]
    pub to: Option<String>,
    /// Bucket ticket whose links define the release's tickets.
    #[arg(short, long, conflicts_with = "fix_version")]
    pub bucket: Option<String>,
    /// Release version whose scheduled tickets (and their links) define the release.
    #[arg(short = 'f', long)]
    pub fix_version: Option<String>,
    /// Comma separated ticket keys to check alone or within the bucket or fix version.
    #[arg(short, long)]
    pub tickets: Option<String>,
    /// Match a ticket when its key occurs anywhere in the merged branch's key.
    #[arg(long)]
    pub substring: bool,
    /// Levels of merged ticket branches to walk.
    #[arg(long, default_value_t = DEFAULT_EXPANSION_DEPTH)]
    pub depth: usize,
    /// Also list unlinked tickets and ticket-branch merges without a tracked ticket.
    #[arg(short, long)]
    pub verbose: bool,
}

pub async fn run(ctx: &AppContext, args: CommitsArgs) -> AppResult<()> {
    let source = match (args.bucket, args.fix_version) {
        (Some(bucket), _) => Some(ReleaseSource::Bucket(TicketKey::new(bucket.trim()))),
        (None, Some(version)) => Some(ReleaseSource::FixVersion(version)),
        (None, None) => None,
    };
    let request = CommitCorrelationRequest {
        source,
        tickets: args.tickets.as_deref().map(TicketKey::parse_list),
        from: args.previous,
        to: args
            .to
            .unwrap_or_else(|| ctx.config.integration_branch.clone()),
        match_mode: match_mode(args.substring),
        expansion_depth: args.depth,
    };

    let outcome = correlate_commits(ctx, request).await?;
    let options = ReportOptions {
        verbose: args.verbose,
        not_in_bucket: outcome.not_in_bucket,
        ticket_projects: ctx.config.ticket_prefixes.clone(),
    };
    print!("{}", render(&outcome.result, &options));
    Ok(())
}
