//! GitHub-backed history source via octocrab.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::GitHubError;
use crate::timeline::{CommitEvent, PullRequestEvent};

use super::retry::{DEFAULT_MAX_ATTEMPTS, retry_with_backoff};
use super::source::HistorySource;

const PER_PAGE: usize = 100;

/// Guard against a list endpoint that never returns a short page.
///
/// Hitting it is an error: a truncated history would silently corrupt
/// deduplication and replay.
pub const DEFAULT_MAX_PAGES: u32 = 1000;

#[derive(Debug, Deserialize)]
struct ApiPullRequest {
    number: u64,
    title: Option<String>,
    merged_at: Option<DateTime<Utc>>,
    /// The commit that landed on the base branch (merge, squash or rebase head).
    merge_commit_sha: Option<String>,
    #[serde(default)]
    labels: Vec<ApiLabel>,
}

#[derive(Debug, Deserialize)]
struct ApiLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiCommit {
    sha: String,
    commit: ApiCommitDetail,
}

#[derive(Debug, Deserialize)]
struct ApiCommitDetail {
    message: String,
    author: Option<ApiSignature>,
    committer: Option<ApiSignature>,
}

#[derive(Debug, Deserialize)]
struct ApiSignature {
    date: Option<DateTime<Utc>>,
}

/// History source reading a single GitHub repository and branch.
pub struct GitHubSource {
    client: Octocrab,
    owner: String,
    repo: String,
    branch: String,
    max_attempts: u32,
    max_pages: u32,
}

impl GitHubSource {
    /// Construct a source authenticated with a personal token.
    pub fn new(token: &str, owner: &str, repo: &str, branch: &str) -> Result<Self, GitHubError> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| GitHubError::RequestFailed {
                operation: "building client".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self::with_client(client, owner, repo, branch))
    }

    /// Use a pre-configured octocrab client.
    ///
    /// This allows dependency injection for testing with mock servers.
    pub fn with_client(client: Octocrab, owner: &str, repo: &str, branch: &str) -> Self {
        Self {
            client,
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    fn route(&self, path: &str) -> String {
        format!("/repos/{}/{}/{}", self.owner, self.repo, path)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        operation: &str,
        route: &str,
        params: &[(&str, String)],
    ) -> Result<T, GitHubError> {
        retry_with_backoff(self.max_attempts, || async {
            let response: Result<T, octocrab::Error> = self.client.get(route, Some(params)).await;
            response.map_err(|e| self.classify_error(operation, e))
        })
        .await
    }

    /// Fetch every page of a list endpoint.
    async fn get_paged<T: DeserializeOwned>(
        &self,
        operation: &str,
        route: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, GitHubError> {
        let mut all = Vec::new();
        let mut page = 1u32;

        loop {
            let mut page_params = params.to_vec();
            page_params.push(("per_page", PER_PAGE.to_string()));
            page_params.push(("page", page.to_string()));

            let items: Vec<T> = self.get(operation, route, &page_params).await?;
            let count = items.len();
            all.extend(items);

            if count < PER_PAGE {
                break;
            }

            if page >= self.max_pages {
                return Err(GitHubError::PaginationLimit {
                    operation: operation.to_string(),
                    pages: self.max_pages,
                });
            }

            page += 1;
        }

        Ok(all)
    }

    /// Map an octocrab error to a domain error.
    fn classify_error(&self, operation: &str, e: octocrab::Error) -> GitHubError {
        // Check error content using both Display and Debug output
        // to handle different octocrab error formats
        let err_display = e.to_string();
        let err_debug = format!("{:?}", e);

        if err_display.to_lowercase().contains("rate limit")
            || err_debug.to_lowercase().contains("rate limit")
        {
            return GitHubError::RateLimited {
                operation: operation.to_string(),
            };
        }
        // 401, and 403 responses that are not rate limits
        const AUTH_MESSAGES: [&str; 3] = [
            "Bad credentials",
            "Requires authentication",
            "Resource not accessible",
        ];
        if AUTH_MESSAGES
            .iter()
            .any(|msg| err_display.contains(msg) || err_debug.contains(msg))
        {
            return GitHubError::AuthenticationFailed;
        }
        if err_display.contains("Not Found") || err_debug.contains("Not Found") {
            return GitHubError::RepositoryNotFound {
                owner: self.owner.clone(),
                repo: self.repo.clone(),
            };
        }
        GitHubError::RequestFailed {
            operation: operation.to_string(),
            source: Box::new(e),
        }
    }
}

#[async_trait]
impl HistorySource for GitHubSource {
    async fn search_merged_pull_requests(&self) -> Result<Vec<PullRequestEvent>, GitHubError> {
        let params = [
            ("state", "closed".to_string()),
            ("base", self.branch.clone()),
        ];
        let prs: Vec<ApiPullRequest> = self
            .get_paged("listing pull requests", &self.route("pulls"), &params)
            .await?;

        let merged: Vec<PullRequestEvent> = prs
            .into_iter()
            // Closed without merge
            .filter_map(|pr| {
                let merged_at = pr.merged_at?;
                Some(PullRequestEvent {
                    number: pr.number,
                    title: pr.title.unwrap_or_default(),
                    merged_at,
                    labels: pr.labels.into_iter().map(|l| l.name).collect(),
                    commits: pr.merge_commit_sha.into_iter().collect(),
                })
            })
            .collect();

        debug!(count = merged.len(), "Merged pull requests on {}", self.branch);
        Ok(merged)
    }

    async fn commits_for_pull_request(&self, number: u64) -> Result<Vec<String>, GitHubError> {
        let commits: Vec<ApiCommit> = self
            .get_paged(
                "listing pull request commits",
                &self.route(&format!("pulls/{}/commits", number)),
                &[],
            )
            .await?;

        Ok(commits.into_iter().map(|c| c.sha).collect())
    }

    async fn all_commits(&self) -> Result<Vec<CommitEvent>, GitHubError> {
        let params = [("sha", self.branch.clone())];
        let commits: Vec<ApiCommit> = self
            .get_paged("listing commits", &self.route("commits"), &params)
            .await?;

        let mut events = Vec::with_capacity(commits.len());
        for commit in commits {
            let date = commit
                .commit
                .author
                .as_ref()
                .and_then(|a| a.date)
                .or_else(|| commit.commit.committer.as_ref().and_then(|c| c.date));

            match date {
                Some(authored_at) => events.push(CommitEvent {
                    hash: commit.sha,
                    authored_at,
                    message: commit.commit.message,
                }),
                None => warn!(commit = %commit.sha, "Skipping commit without a date"),
            }
        }

        Ok(events)
    }

    async fn labels_for_pull_request(&self, number: u64) -> Result<Vec<String>, GitHubError> {
        let labels: Vec<ApiLabel> = self
            .get_paged(
                "listing pull request labels",
                &self.route(&format!("issues/{}/labels", number)),
                &[],
            )
            .await?;

        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    async fn add_label_to_pull_request(
        &self,
        number: u64,
        label: &str,
    ) -> Result<(), GitHubError> {
        let body = serde_json::json!({ "labels": [label] });
        let route = self.route(&format!("issues/{}/labels", number));

        let _: serde_json::Value = self
            .client
            .post(route, Some(&body))
            .await
            .map_err(|e| self.classify_error("adding label", e))?;

        debug!(pr = number, label, "Added label");
        Ok(())
    }
}
