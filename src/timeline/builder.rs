//! Merge PRs and independent commits into one deduplicated timeline.

use std::collections::HashSet;

use futures::{StreamExt, TryStreamExt, stream};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::GitHubError;
use crate::github::HistorySource;

use super::filter::is_release_artifact;
use super::{CommitEvent, Event, PullRequestEvent, Timeline};

/// Maximum number of PR commit lists fetched concurrently.
pub const MAX_CONCURRENT_FETCHES: usize = 8;

/// Builds the timeline from a history source, at most once per instance.
pub struct TimelineBuilder<'a, S: HistorySource + ?Sized> {
    source: &'a S,
    cache: OnceCell<Timeline>,
}

impl<'a, S: HistorySource + ?Sized> TimelineBuilder<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            cache: OnceCell::new(),
        }
    }

    /// Build the timeline, or return the one already built by this instance.
    pub async fn build(&self) -> Result<&Timeline, GitHubError> {
        self.cache.get_or_try_init(|| self.fetch_and_assemble()).await
    }

    async fn fetch_and_assemble(&self) -> Result<Timeline, GitHubError> {
        let pull_requests = self.source.search_merged_pull_requests().await?;
        debug!(count = pull_requests.len(), "Fetched merged pull requests");

        let pull_requests = self.resolve_commits(pull_requests).await?;
        let commits = self.source.all_commits().await?;
        debug!(count = commits.len(), "Fetched commits");

        let timeline = assemble(pull_requests, commits);
        info!(events = timeline.len(), "Built release timeline");
        Ok(timeline)
    }

    /// Add each PR's branch commits to the merge commit it already carries.
    /// Any single failure fails the whole build.
    async fn resolve_commits(
        &self,
        pull_requests: Vec<PullRequestEvent>,
    ) -> Result<Vec<PullRequestEvent>, GitHubError> {
        let source = self.source;

        stream::iter(pull_requests)
            .map(|mut pr| async move {
                let branch_commits = source.commits_for_pull_request(pr.number).await?;
                for hash in branch_commits {
                    if !pr.commits.contains(&hash) {
                        pr.commits.push(hash);
                    }
                }
                Ok::<_, GitHubError>(pr)
            })
            .buffered(MAX_CONCURRENT_FETCHES)
            .try_collect()
            .await
    }
}

/// Combine PRs (with resolved commits) and all commits into a timeline.
///
/// Commits already represented by a PR and release-artifact commits are
/// dropped. The result is stable-sorted by date, so on equal timestamps PRs
/// keep their place ahead of commits.
pub fn assemble(pull_requests: Vec<PullRequestEvent>, commits: Vec<CommitEvent>) -> Timeline {
    let owned: HashSet<&str> = pull_requests
        .iter()
        .flat_map(|pr| pr.commits.iter().map(String::as_str))
        .collect();

    let independent: Vec<CommitEvent> = commits
        .into_iter()
        .filter(|commit| !owned.contains(commit.hash.as_str()))
        .filter(|commit| !is_release_artifact(&commit.message))
        .collect();

    debug!(
        independent = independent.len(),
        "Filtered commits not covered by a pull request"
    );

    let events: Vec<Event> = pull_requests
        .into_iter()
        .map(Event::PullRequest)
        .chain(independent.into_iter().map(Event::Commit))
        .collect();

    Timeline::from_events(events)
}
