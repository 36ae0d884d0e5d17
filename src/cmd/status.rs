use clap::{ArgGroup, Args};

use crate::context::AppContext;
use crate::domain::ticket::TicketKey;
use crate::error::AppResult;
use crate::workflow::status::{ReleaseStatus, fix_version_status, release_status};

#[derive(Args, Debug, Clone)]
#[command(group(
    ArgGroup::new("release")
        .required(true)
        .args(["bucket", "fix_version"])
))]
pub struct StatusArgs {
    /// Bucket ticket of the release.
    pub bucket: Option<String>,
    /// Show every ticket scheduled for this release version instead.
    #[arg(short = 'f', long)]
    pub fix_version: Option<String>,
}

pub async fn run(ctx: &AppContext, args: StatusArgs) -> AppResult<()> {
    if let Some(version) = args.fix_version {
        let statuses = fix_version_status(ctx, &version).await?;
        println!("Number of issues: {}", statuses.len());
        for status in &statuses {
            print_status(status);
        }
        return Ok(());
    }

    if let Some(bucket) = args.bucket {
        let status = release_status(ctx, &TicketKey::new(bucket.trim())).await?;
        print_status(&status);
    }
    Ok(())
}

fn print_status(status: &ReleaseStatus) {
    println!(
        "{} ({}): {}",
        status.bucket.key, status.bucket.status, status.bucket.summary
    );
    println!("Number of tickets: {}", status.tickets.len());
    for progress in &status.tickets {
        let mark = if progress.done { '\u{2713}' } else { '\u{2717}' };
        println!(
            " * {} ({}): {} ({mark})",
            progress.ticket.key, progress.ticket.status, progress.ticket.summary
        );
    }
    if status.outstanding() == 0 {
        println!("All tickets are done.");
    }
}
