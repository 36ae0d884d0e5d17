use std::path::PathBuf;
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::branch::{BranchName, FetchOutcome};
use crate::domain::commit::{Commit, CommitId};
use crate::error::{AppError, AppResult};
use crate::services::VersionControlService;

const FIELD_SEPARATOR: char = '\u{1f}';
const RECORD_SEPARATOR: char = '\u{1e}';
const LOG_FORMAT: &str = "--format=%H%x1f%P%x1f%B%x1e";

pub struct GitCli {
    workspace_root: PathBuf,
    remote: String,
}

impl GitCli {
    pub fn new(workspace_root: PathBuf, remote: String) -> Self {
        Self {
            workspace_root,
            remote,
        }
    }

    fn git_cmd(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.workspace_root);
        cmd.args(["-c", "core.quotePath=false"]);
        cmd.kill_on_drop(true);
        cmd
    }

    async fn output(&self, args: &[&str]) -> AppResult<Output> {
        tracing::debug!(?args, "running git");
        self.git_cmd()
            .args(args)
            .output()
            .await
            .map_err(|err| AppError::VersionControl(format!("failed to run git: {err}")))
    }

    async fn stdout(&self, args: &[&str]) -> AppResult<String> {
        let output = self.output(args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::VersionControl(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn parse_log(raw: &str) -> Vec<Commit> {
    raw.split(RECORD_SEPARATOR)
        .filter_map(|record| {
            let record = record.trim_start_matches('\n');
            if record.trim().is_empty() {
                return None;
            }
            let mut fields = record.splitn(3, FIELD_SEPARATOR);
            let id = fields.next()?.trim();
            let parents = fields.next()?;
            let message = fields.next().unwrap_or_default();
            Some(Commit {
                id: CommitId(id.to_string()),
                message: message.trim_end().to_string(),
                parent_count: parents.split_whitespace().count(),
            })
        })
        .collect()
}

#[async_trait]
impl VersionControlService for GitCli {
    async fn merge_commits(&self, from: &str, to: &str) -> AppResult<Vec<Commit>> {
        let range = format!("{from}..{to}");
        let raw = self
            .stdout(&["log", "--merges", LOG_FORMAT, range.as_str(), "--"])
            .await?;
        let commits = parse_log(&raw)
            .into_iter()
            .filter(Commit::is_merge)
            .collect::<Vec<_>>();
        tracing::debug!(%range, count = commits.len(), "listed merge commits");
        Ok(commits)
    }

    async fn has_local_branch(&self, branch: &BranchName) -> AppResult<bool> {
        let reference = format!("refs/heads/{}", branch.as_str());
        let output = self
            .output(&["show-ref", "--verify", "--quiet", reference.as_str()])
            .await?;
        Ok(output.status.success())
    }

    async fn fetch_branch(&self, branch: &BranchName) -> AppResult<FetchOutcome> {
        let refspec = format!("{0}:{0}", branch.as_str());
        let output = self
            .output(&["fetch", "--quiet", self.remote.as_str(), refspec.as_str()])
            .await?;
        if output.status.success() {
            return Ok(FetchOutcome::Fetched);
        }
        let reason = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Ok(FetchOutcome::NotFound { reason })
    }

    async fn changed_files(&self, commit: &Commit) -> AppResult<Vec<String>> {
        let first_parent = format!("{}^1", commit.id);
        let raw = self
            .stdout(&["diff", "--name-only", first_parent.as_str(), commit.id.as_str(), "--"])
            .await?;
        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::process::Command as StdCommand;

    use tempfile::TempDir;

    use super::*;

    fn git_available() -> bool {
        StdCommand::new("git")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = StdCommand::new("git")
            .arg("-C")
            .arg(dir)
            .args(["-c", "commit.gpgsign=false"])
            .args(args)
            .env("GIT_AUTHOR_NAME", "Release Bot")
            .env("GIT_AUTHOR_EMAIL", "bot@example.com")
            .env("GIT_COMMITTER_NAME", "Release Bot")
            .env("GIT_COMMITTER_EMAIL", "bot@example.com")
            .status()
            .expect("git should run");
        assert!(status.success(), "git {args:?} failed");
    }

    fn commit_file(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), name).unwrap();
        git(dir, &["add", name]);
        git(dir, &["commit", "-q", "-m", format!("Add {name}").as_str()]);
    }

    /// develop: base (tag v1) <- merge of tickets/CAP-1, which itself merged tickets/CAP-2.
    fn release_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        git(root, &["init", "-q"]);
        git(root, &["checkout", "-q", "-b", "develop"]);
        commit_file(root, "base.txt");
        git(root, &["tag", "v1"]);

        git(root, &["checkout", "-q", "-b", "tickets/CAP-2"]);
        commit_file(root, "Hexapod.xml");
        git(root, &["checkout", "-q", "develop"]);
        git(root, &["checkout", "-q", "-b", "tickets/CAP-1"]);
        commit_file(root, "Dome.xml");
        git(
            root,
            &[
                "merge",
                "-q",
                "--no-ff",
                "-m",
                "Merge pull request #2 from org/tickets/CAP-2",
                "tickets/CAP-2",
            ],
        );
        git(root, &["checkout", "-q", "develop"]);
        git(
            root,
            &[
                "merge",
                "-q",
                "--no-ff",
                "-m",
                "Merge pull request #1 from org/tickets/CAP-1",
                "tickets/CAP-1",
            ],
        );
        dir
    }

    #[test]
    fn parses_log_records() {
        let raw = "aaa\u{1f}p1 p2\u{1f}Merge pull request #1 from org/tickets/CAP-1\n\nBody\n\u{1e}\nbbb\u{1f}p3\u{1f}Plain commit\n\u{1e}\n";
        let commits = parse_log(raw);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].id.as_str(), "aaa");
        assert_eq!(commits[0].parent_count, 2);
        assert_eq!(
            commits[0].message,
            "Merge pull request #1 from org/tickets/CAP-1\n\nBody"
        );
        assert_eq!(commits[1].parent_count, 1);
    }

    #[tokio::test]
    async fn lists_merges_in_range() {
        if !git_available() {
            return;
        }
        let repo = release_repo();
        let git = GitCli::new(repo.path().to_path_buf(), "origin".to_string());

        let commits = git.merge_commits("v1", "develop").await.unwrap();
        let mut keys = commits
            .iter()
            .map(|commit| commit.ticket_key().0)
            .collect::<Vec<_>>();
        keys.sort();
        assert_eq!(keys, vec!["CAP-1".to_string(), "CAP-2".to_string()]);
        assert!(commits.iter().all(Commit::is_merge));
    }

    #[tokio::test]
    async fn unknown_range_start_is_an_error() {
        if !git_available() {
            return;
        }
        let repo = release_repo();
        let git = GitCli::new(repo.path().to_path_buf(), "origin".to_string());

        let result = git.merge_commits("no-such-tag", "develop").await;
        assert!(matches!(result, Err(AppError::VersionControl(_))));
    }

    #[tokio::test]
    async fn reports_changed_files_of_merge() {
        if !git_available() {
            return;
        }
        let repo = release_repo();
        let git = GitCli::new(repo.path().to_path_buf(), "origin".to_string());

        let commits = git.merge_commits("v1", "develop").await.unwrap();
        let top = commits
            .iter()
            .find(|commit| commit.ticket_key().as_str() == "CAP-1")
            .unwrap();
        let mut files = git.changed_files(top).await.unwrap();
        files.sort();
        assert_eq!(files, vec!["Dome.xml".to_string(), "Hexapod.xml".to_string()]);
    }

    #[tokio::test]
    async fn fetches_existing_branch_and_rejects_missing_one() {
        if !git_available() {
            return;
        }
        let upstream = release_repo();
        let clone_dir = TempDir::new().unwrap();
        let clone_path = clone_dir.path().join("clone");
        let status = StdCommand::new("git")
            .arg("clone")
            .arg("-q")
            .arg(upstream.path())
            .arg(&clone_path)
            .status()
            .unwrap();
        assert!(status.success());

        let git = GitCli::new(clone_path, "origin".to_string());
        let present = BranchName("tickets/CAP-2".to_string());
        let missing = BranchName("tickets/CAP-999".to_string());

        assert!(!git.has_local_branch(&present).await.unwrap());
        assert_eq!(
            git.fetch_branch(&present).await.unwrap(),
            FetchOutcome::Fetched
        );
        assert!(git.has_local_branch(&present).await.unwrap());
        assert!(matches!(
            git.fetch_branch(&missing).await.unwrap(),
            FetchOutcome::NotFound { .. }
        ));
    }
}
