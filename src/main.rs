mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod workflow;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cmd::commits::CommitsArgs;
use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::keep::KeepArgs;
use crate::cmd::links::MoveLinksArgs;
use crate::cmd::status::StatusArgs;
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::git::GitCli;
use crate::infra::jira::JiraClient;

#[derive(Parser)]
#[command(
    name = "relcheck",
    author,
    version,
    about = "Cross-check release tickets against merged code"
)]
struct Cli {
    /// Log filter written to stderr, e.g. `info` or `relcheck=debug`.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    /// Repository to inspect instead of the configured one.
    #[arg(long, global = true)]
    repo: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match merged ticket branches against a release's tickets.
    Commits(CommitsArgs),
    /// Show progress of every ticket linked to a bucket ticket or fix version.
    Status(StatusArgs),
    /// List bucket tickets touching the components of an incremental release.
    Keep(KeepArgs),
    /// Move bucket links that are not kept over to the next bucket ticket.
    MoveLinks(MoveLinksArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Config(args) => config_cmd::run(args.command),
        Commands::Commits(args) => {
            let ctx = build_context(cli.repo, args.bucket.is_some() || args.fix_version.is_some())?;
            cmd::commits::run(&ctx, args).await
        }
        Commands::Status(args) => {
            let ctx = build_context(cli.repo, true)?;
            cmd::status::run(&ctx, args).await
        }
        Commands::Keep(args) => {
            let ctx = build_context(cli.repo, true)?;
            cmd::keep::run(&ctx, args).await
        }
        Commands::MoveLinks(args) => {
            let ctx = build_context(cli.repo, true)?;
            cmd::links::run(&ctx, args).await
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn build_context(repo_override: Option<PathBuf>, uses_tracker: bool) -> AppResult<AppContext> {
    let cwd = std::env::current_dir()?;
    let mut config = AppConfig::load(&cwd)?;
    if let Some(repo) = repo_override {
        config.repository = repo;
    }

    if uses_tracker {
        if config.jira_base_url.is_none() {
            tracing::warn!("Jira base URL not configured; ticket lookups will fail");
        }
        if config.jira_email.is_none() {
            tracing::warn!("Jira email not configured; ticket lookups will fail");
        }
        if config.jira_token.is_none() {
            tracing::warn!("Jira token not configured; ticket lookups will fail");
        }
    }
    tracing::debug!(repository = %config.repository.display(), "using repository");

    let git = Arc::new(GitCli::new(
        config.repository.clone(),
        config.remote.clone(),
    ));
    let issue_tracker = Arc::new(JiraClient::new(
        config.jira_base_url.clone(),
        config.jira_email.clone(),
        config.jira_token.clone(),
    ));

    Ok(AppContext::new(config, git, issue_tracker))
}
