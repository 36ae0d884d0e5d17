use clap::Args;

use crate::context::AppContext;
use crate::domain::ticket::TicketKey;
use crate::error::AppResult;
use crate::workflow::move_links::move_bucket_links;

#[derive(Args, Debug, Clone)]
pub struct MoveLinksArgs {
    /// Bucket ticket of the current release.
    pub current: String,
    /// Bucket ticket of the next release.
    pub next: String,
    /// Comma separated tickets that stay on the current bucket.
    #[arg(short, long, default_value = "")]
    pub keep: String,
    /// Print the links that would move without touching the tracker.
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(ctx: &AppContext, args: MoveLinksArgs) -> AppResult<()> {
    let current = TicketKey::new(args.current.trim());
    let next = TicketKey::new(args.next.trim());
    let keep = TicketKey::parse_list(&args.keep);

    let moved = move_bucket_links(ctx, &current, &next, &keep, args.dry_run).await?;
    let verb = if args.dry_run { "Would move" } else { "Moved" };
    for link in &moved {
        println!("{verb} {} ({}) from {current} to {next}", link.other, link.type_name);
    }
    if moved.is_empty() {
        println!("No links to move.");
    }
    Ok(())
}
