//! In-memory service fakes shared by the workflow tests.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::{
    AppConfig, DEFAULT_DONE_LABEL, DEFAULT_INTEGRATION_BRANCH, DEFAULT_RELEASE_PROJECT,
    DEFAULT_RELEASE_VERSION_PREFIX, DEFAULT_REMOTE, DEFAULT_TICKET_PREFIXES, parse_prefixes,
};
use crate::context::AppContext;
use crate::domain::branch::{BranchName, FetchOutcome};
use crate::domain::commit::{Commit, CommitId};
use crate::domain::ticket::{LinkSide, Ticket, TicketKey, TicketLink};
use crate::error::{AppError, AppResult};
use crate::services::{IssueTrackerService, VersionControlService};

pub fn merge(id: &str, key: &str) -> Commit {
    Commit {
        id: CommitId(id.to_string()),
        message: format!("Merge pull request #{id} from org/tickets/{key}\n\nWork for {key}"),
        parent_count: 2,
    }
}

pub fn ticket(key: &str, status: &str, summary: &str) -> Ticket {
    Ticket {
        key: TicketKey::new(key),
        status: status.to_string(),
        labels: BTreeSet::new(),
        summary: summary.to_string(),
        links: Vec::new(),
    }
}

pub fn link(id: &str, relation: &str, other: &str) -> TicketLink {
    TicketLink {
        id: id.to_string(),
        type_name: "Relates".to_string(),
        relation: relation.to_string(),
        side: LinkSide::Inward,
        other: TicketKey::new(other),
    }
}

pub fn keys(list: &[&str]) -> BTreeSet<TicketKey> {
    list.iter().map(|key| TicketKey::new(*key)).collect()
}

#[derive(Default)]
pub struct FakeRepository {
    ranges: HashMap<String, Vec<Commit>>,
    broken_ranges: HashSet<String>,
    remote_branches: HashSet<String>,
    unreachable_remote: bool,
    files: HashMap<String, Vec<String>>,
    local_branches: Mutex<HashSet<String>>,
    pub fetches: Mutex<Vec<String>>,
}

impl FakeRepository {
    pub fn with_range(mut self, from: &str, to: &str, commits: Vec<Commit>) -> Self {
        self.ranges.insert(format!("{from}..{to}"), commits);
        self
    }

    pub fn with_broken_range(mut self, from: &str, to: &str) -> Self {
        self.broken_ranges.insert(format!("{from}..{to}"));
        self
    }

    pub fn with_remote_branch(mut self, name: &str) -> Self {
        self.remote_branches.insert(name.to_string());
        self
    }

    pub fn with_local_branch(self, name: &str) -> Self {
        self.local_branches
            .lock()
            .unwrap()
            .insert(name.to_string());
        self
    }

    pub fn with_unreachable_remote(mut self) -> Self {
        self.unreachable_remote = true;
        self
    }

    pub fn with_files(mut self, id: &str, files: &[&str]) -> Self {
        self.files
            .insert(id.to_string(), files.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

#[async_trait]
impl VersionControlService for FakeRepository {
    async fn merge_commits(&self, from: &str, to: &str) -> AppResult<Vec<Commit>> {
        let range = format!("{from}..{to}");
        if self.broken_ranges.contains(&range) {
            return Err(AppError::VersionControl(format!("cannot walk {range}")));
        }
        match self.ranges.get(&range) {
            Some(commits) => Ok(commits.clone()),
            None if self.local_branches.lock().unwrap().contains(to) => Ok(Vec::new()),
            None => Err(AppError::VersionControl(format!("unknown revision {to}"))),
        }
    }

    async fn has_local_branch(&self, branch: &BranchName) -> AppResult<bool> {
        Ok(self.local_branches.lock().unwrap().contains(branch.as_str()))
    }

    async fn fetch_branch(&self, branch: &BranchName) -> AppResult<FetchOutcome> {
        self.fetches.lock().unwrap().push(branch.as_str().to_string());
        if self.unreachable_remote {
            return Err(AppError::VersionControl("remote unreachable".to_string()));
        }
        if self.remote_branches.contains(branch.as_str()) {
            self.local_branches
                .lock()
                .unwrap()
                .insert(branch.as_str().to_string());
            Ok(FetchOutcome::Fetched)
        } else {
            Ok(FetchOutcome::NotFound {
                reason: format!("couldn't find remote ref {branch}"),
            })
        }
    }

    async fn changed_files(&self, commit: &Commit) -> AppResult<Vec<String>> {
        Ok(self.files.get(commit.id.as_str()).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeTracker {
    tickets: HashMap<String, Ticket>,
    searches: HashMap<String, Vec<String>>,
    pub queries: Mutex<Vec<String>>,
    pub lookups: Mutex<Vec<String>>,
    pub created: Mutex<Vec<(String, TicketLink)>>,
    pub deleted: Mutex<Vec<String>>,
}

impl FakeTracker {
    pub fn with_ticket(mut self, ticket: Ticket) -> Self {
        self.tickets.insert(ticket.key.0.clone(), ticket);
        self
    }

    /// Answers `jql` with the registered tickets named by `keys`.
    pub fn with_search(mut self, jql: &str, keys: &[&str]) -> Self {
        self.searches.insert(
            jql.to_string(),
            keys.iter().map(|key| key.to_string()).collect(),
        );
        self
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }
}

#[async_trait]
impl IssueTrackerService for FakeTracker {
    async fn fetch_ticket(&self, key: &TicketKey) -> AppResult<Ticket> {
        self.lookups.lock().unwrap().push(key.0.clone());
        self.tickets
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| AppError::IssueTracker(format!("Jira responded with 404: {key}")))
    }

    async fn search_tickets(&self, jql: &str) -> AppResult<Vec<Ticket>> {
        self.queries.lock().unwrap().push(jql.to_string());
        Ok(self
            .searches
            .get(jql)
            .into_iter()
            .flatten()
            .filter_map(|key| self.tickets.get(key).cloned())
            .collect())
    }

    async fn create_link(&self, owner: &TicketKey, link: &TicketLink) -> AppResult<()> {
        self.created
            .lock()
            .unwrap()
            .push((owner.0.clone(), link.clone()));
        Ok(())
    }

    async fn delete_link(&self, link_id: &str) -> AppResult<()> {
        self.deleted.lock().unwrap().push(link_id.to_string());
        Ok(())
    }
}

pub fn context(repository: Arc<FakeRepository>, tracker: Arc<FakeTracker>) -> AppContext {
    let config = AppConfig {
        jira_base_url: None,
        jira_email: None,
        jira_token: None,
        repository: "/work".into(),
        remote: DEFAULT_REMOTE.to_string(),
        integration_branch: DEFAULT_INTEGRATION_BRANCH.to_string(),
        done_label: DEFAULT_DONE_LABEL.to_string(),
        release_project: DEFAULT_RELEASE_PROJECT.to_string(),
        release_version_prefix: DEFAULT_RELEASE_VERSION_PREFIX.to_string(),
        ticket_prefixes: parse_prefixes(DEFAULT_TICKET_PREFIXES),
    };
    AppContext::new(config, repository, tracker)
}
