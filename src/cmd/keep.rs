use clap::Args;

use crate::context::AppContext;
use crate::domain::ticket::TicketKey;
use crate::error::AppResult;
use crate::workflow::history::DEFAULT_EXPANSION_DEPTH;
use crate::workflow::keep::{KeepRequest, parse_components, tickets_to_keep};

use super::match_mode;

#[derive(Args, Debug, Clone)]
pub struct KeepArgs {
    /// Bucket ticket of the current release.
    pub bucket: String,
    /// Tag or ref of the previous release.
    pub previous: String,
    /// Comma separated components shipped in the incremental release.
    #[arg(short, long)]
    pub components: String,
    /// Ref the release is cut from; defaults to the configured integration branch.
    #[arg(long)]
    pub to: Option<String>,
    /// Match a ticket when its key occurs anywhere in the merged branch's key.
    #[arg(long)]
    pub substring: bool,
    /// Levels of merged ticket branches to walk.
    #[arg(long, default_value_t = DEFAULT_EXPANSION_DEPTH)]
    pub depth: usize,
}

pub async fn run(ctx: &AppContext, args: KeepArgs) -> AppResult<()> {
    let request = KeepRequest {
        bucket: TicketKey::new(args.bucket.trim()),
        from: args.previous,
        to: args
            .to
            .unwrap_or_else(|| ctx.config.integration_branch.clone()),
        components: parse_components(&args.components),
        match_mode: match_mode(args.substring),
        expansion_depth: args.depth,
    };

    let kept = tickets_to_keep(ctx, request).await?;
    let joined = kept
        .iter()
        .map(TicketKey::as_str)
        .collect::<Vec<_>>()
        .join(",");
    println!("{joined}");
    Ok(())
}
