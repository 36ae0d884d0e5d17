use std::io::{self, Write};

use clap::{Args, Subcommand};

use crate::config::{
    DEFAULT_DONE_LABEL, DEFAULT_INTEGRATION_BRANCH, DEFAULT_RELEASE_PROJECT,
    DEFAULT_RELEASE_VERSION_PREFIX, DEFAULT_REMOTE, DEFAULT_TICKET_PREFIXES, StoredConfig,
    config_file_path,
};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring relcheck.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!("Secrets are stored in the local config file; protect your filesystem accordingly.");
    println!();

    apply_prompt(
        "Jira base URL (e.g., https://company.atlassian.net)",
        &mut cfg.jira_base_url,
        false,
    )?;
    apply_prompt("Jira email", &mut cfg.jira_email, false)?;
    apply_prompt("Jira API token", &mut cfg.jira_token, true)?;
    apply_prompt("Repository path", &mut cfg.repository, false)?;
    apply_prompt("Git remote", &mut cfg.remote, false)?;
    apply_prompt("Integration branch", &mut cfg.integration_branch, false)?;
    apply_prompt("Done label", &mut cfg.done_label, false)?;
    apply_prompt("Release Jira project", &mut cfg.release_project, false)?;
    apply_prompt("Fix version prefix", &mut cfg.release_version_prefix, false)?;
    apply_prompt(
        "Ticket projects (comma separated)",
        &mut cfg.ticket_prefixes,
        false,
    )?;

    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    println!("Jira base URL: {}", display_value(&cfg.jira_base_url));
    println!("Jira email: {}", display_value(&cfg.jira_email));
    println!("Jira API token: {}", mask_secret(&cfg.jira_token));
    println!("Repository path: {}", display_value(&cfg.repository));
    println!(
        "Git remote: {}",
        display_or_default(&cfg.remote, DEFAULT_REMOTE)
    );
    println!(
        "Integration branch: {}",
        display_or_default(&cfg.integration_branch, DEFAULT_INTEGRATION_BRANCH)
    );
    println!(
        "Done label: {}",
        display_or_default(&cfg.done_label, DEFAULT_DONE_LABEL)
    );
    println!(
        "Release Jira project: {}",
        display_or_default(&cfg.release_project, DEFAULT_RELEASE_PROJECT)
    );
    println!(
        "Fix version prefix: {}",
        display_or_default(&cfg.release_version_prefix, DEFAULT_RELEASE_VERSION_PREFIX)
    );
    println!(
        "Ticket projects: {}",
        display_or_default(&cfg.ticket_prefixes, DEFAULT_TICKET_PREFIXES)
    );

    Ok(())
}

fn apply_prompt(field: &str, target: &mut Option<String>, secret: bool) -> AppResult<()> {
    match prompt(field, target.as_deref(), secret)? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn prompt(field: &str, current: Option<&str>, secret: bool) -> AppResult<PromptAction> {
    let mut stdout = io::stdout();

    match (current, secret) {
        (Some(_), true) => write!(stdout, "{field} [****] (Enter to keep, '-' to clear): ")?,
        (Some(value), false) => {
            write!(stdout, "{field} [{value}] (Enter to keep, '-' to clear): ")?
        }
        (None, _) => write!(stdout, "{field} (Enter to skip): ")?,
    }
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim();

    if trimmed.is_empty() {
        Ok(PromptAction::Keep)
    } else if trimmed == "-" {
        Ok(PromptAction::Clear)
    } else {
        Ok(PromptAction::Set(trimmed.to_string()))
    }
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn display_or_default(value: &Option<String>, default: &str) -> String {
    match value.as_deref().filter(|v| !v.is_empty()) {
        Some(v) => v.to_string(),
        None => format!("{default} (default)"),
    }
}

fn mask_secret(value: &Option<String>) -> String {
    let Some(token) = value.as_deref().filter(|token| !token.is_empty()) else {
        return "<not set>".to_string();
    };
    let chars = token.chars().collect::<Vec<_>>();
    if chars.len() <= 6 {
        return "***".to_string();
    }
    let prefix = chars[..3].iter().collect::<String>();
    let suffix = chars[chars.len() - 3..].iter().collect::<String>();
    format!("{prefix}***{suffix}")
}

enum PromptAction {
    Keep,
    Clear,
    Set(String),
}
