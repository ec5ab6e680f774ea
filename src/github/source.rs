//! The history source collaborator: where PRs, commits and labels come from.

use async_trait::async_trait;

use crate::error::GitHubError;
use crate::timeline::{CommitEvent, PullRequestEvent};

/// Read/write access to a repository's merged history.
///
/// This abstraction allows replacing the GitHub API in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// All merged pull requests, labels included.
    ///
    /// `commits` holds only the commit the PR landed as on the base branch, if
    /// known. Squash and rebase merges produce a SHA that never appears in the
    /// PR's own commit list.
    async fn search_merged_pull_requests(&self) -> Result<Vec<PullRequestEvent>, GitHubError>;

    /// Commit hashes on the pull request's branch.
    async fn commits_for_pull_request(&self, number: u64) -> Result<Vec<String>, GitHubError>;

    /// Every commit on the release branch.
    async fn all_commits(&self) -> Result<Vec<CommitEvent>, GitHubError>;

    /// Current labels on a pull request.
    async fn labels_for_pull_request(&self, number: u64) -> Result<Vec<String>, GitHubError>;

    async fn add_label_to_pull_request(&self, number: u64, label: &str)
    -> Result<(), GitHubError>;
}
