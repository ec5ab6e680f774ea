//! Release-relevant history events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A merged pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    pub number: u64,
    pub title: String,
    pub merged_at: DateTime<Utc>,
    pub labels: Vec<String>,
    /// Commit hashes belonging to this PR, resolved by the timeline builder.
    #[serde(default)]
    pub commits: Vec<String>,
}

/// A commit on the release branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitEvent {
    pub hash: String,
    pub authored_at: DateTime<Utc>,
    pub message: String,
}

impl CommitEvent {
    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }

    /// Abbreviated hash for display.
    pub fn short_hash(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.hash.len());
        &self.hash[..end]
    }
}

/// Identity of an event, used for deduplication and cross-referencing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventId {
    PullRequest(u64),
    Commit(String),
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PullRequest(number) => write!(f, "#{}", number),
            Self::Commit(hash) => write!(f, "{}", hash),
        }
    }
}

/// One unit of history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    PullRequest(PullRequestEvent),
    Commit(CommitEvent),
}

impl Event {
    pub fn date(&self) -> DateTime<Utc> {
        match self {
            Self::PullRequest(pr) => pr.merged_at,
            Self::Commit(commit) => commit.authored_at,
        }
    }

    /// Labels on the event; bare commits have none at all.
    pub fn labels(&self) -> Option<&[String]> {
        match self {
            Self::PullRequest(pr) => Some(&pr.labels),
            Self::Commit(_) => None,
        }
    }

    pub fn id(&self) -> EventId {
        match self {
            Self::PullRequest(pr) => EventId::PullRequest(pr.number),
            Self::Commit(commit) => EventId::Commit(commit.hash.clone()),
        }
    }

    /// Pull request number, if this event is a pull request.
    pub fn pull_request_number(&self) -> Option<u64> {
        match self {
            Self::PullRequest(pr) => Some(pr.number),
            Self::Commit(_) => None,
        }
    }

    /// One-line human description.
    pub fn title(&self) -> &str {
        match self {
            Self::PullRequest(pr) => pr.title.trim(),
            Self::Commit(commit) => commit.summary(),
        }
    }
}
