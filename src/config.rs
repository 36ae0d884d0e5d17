use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const APP_DIR_NAME: &str = "relcheck";
const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_INTEGRATION_BRANCH: &str = "develop";
pub const DEFAULT_DONE_LABEL: &str = "xmldone";
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_RELEASE_PROJECT: &str = "CAP";
pub const DEFAULT_RELEASE_VERSION_PREFIX: &str = "ts_xml";
pub const DEFAULT_TICKET_PREFIXES: &str = "DM,CAP,TPC";

/// Settings resolved for one run: stored file, then environment, then defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jira_base_url: Option<String>,
    pub jira_email: Option<String>,
    pub jira_token: Option<String>,
    pub repository: PathBuf,
    pub remote: String,
    pub integration_branch: String,
    pub done_label: String,
    /// Jira project searched for fix-version tickets.
    pub release_project: String,
    /// Prepended to a release version to form the Jira fix version name.
    pub release_version_prefix: String,
    /// Projects whose keys count as ticket branches in untracked-merge output.
    pub ticket_prefixes: Vec<String>,
}

impl AppConfig {
    pub fn load(workspace_hint: &Path) -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        Ok(Self::resolve(stored, workspace_hint, |name| env::var(name).ok()))
    }

    fn resolve(
        stored: StoredConfig,
        workspace_hint: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let pick = |var: &str, stored: Option<String>| {
            lookup(var)
                .filter(|value| !value.trim().is_empty())
                .or(stored)
                .filter(|value| !value.trim().is_empty())
        };

        let repository = pick("RELCHECK_REPOSITORY", stored.repository)
            .map(PathBuf::from)
            .unwrap_or_else(|| workspace_hint.to_path_buf());

        Self {
            jira_base_url: pick("RELCHECK_JIRA_BASE_URL", stored.jira_base_url),
            jira_email: pick("RELCHECK_JIRA_EMAIL", stored.jira_email),
            jira_token: pick("RELCHECK_JIRA_TOKEN", stored.jira_token),
            repository,
            remote: stored
                .remote
                .unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
            integration_branch: stored
                .integration_branch
                .unwrap_or_else(|| DEFAULT_INTEGRATION_BRANCH.to_string()),
            done_label: stored
                .done_label
                .unwrap_or_else(|| DEFAULT_DONE_LABEL.to_string()),
            release_project: stored
                .release_project
                .unwrap_or_else(|| DEFAULT_RELEASE_PROJECT.to_string()),
            release_version_prefix: stored
                .release_version_prefix
                .unwrap_or_else(|| DEFAULT_RELEASE_VERSION_PREFIX.to_string()),
            ticket_prefixes: parse_prefixes(
                stored
                    .ticket_prefixes
                    .as_deref()
                    .unwrap_or(DEFAULT_TICKET_PREFIXES),
            ),
        }
    }
}

/// On-disk configuration written by `relcheck config init`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    pub jira_base_url: Option<String>,
    pub jira_email: Option<String>,
    pub jira_token: Option<String>,
    pub repository: Option<String>,
    pub remote: Option<String>,
    pub integration_branch: Option<String>,
    pub done_label: Option<String>,
    pub release_project: Option<String>,
    pub release_version_prefix: Option<String>,
    pub ticket_prefixes: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    fn load_from(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&config_file_path()?)
    }

    fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(path, data)?;
        Ok(())
    }
}

/// Splits a comma separated project list, dropping blanks.
pub fn parse_prefixes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn config_directory() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| {
            AppError::Configuration("unable to determine the user config directory".to_string())
        })
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}
