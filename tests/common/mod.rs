//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use labelver::error::GitHubError;
use labelver::github::HistorySource;
use labelver::timeline::{CommitEvent, PullRequestEvent};

/// Noon UTC on the given day.
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn pr(number: u64, merged_at: DateTime<Utc>, labels: &[&str]) -> PullRequestEvent {
    PullRequestEvent {
        number,
        title: format!("Change {}", number),
        merged_at,
        labels: labels.iter().map(|l| l.to_string()).collect(),
        commits: Vec::new(),
    }
}

pub fn commit(hash: &str, authored_at: DateTime<Utc>, message: &str) -> CommitEvent {
    CommitEvent {
        hash: hash.to_string(),
        authored_at,
        message: message.to_string(),
    }
}

/// In-memory history source.
#[derive(Default)]
pub struct FakeSource {
    pub pull_requests: Vec<PullRequestEvent>,
    pub pr_commits: HashMap<u64, Vec<String>>,
    pub commits: Vec<CommitEvent>,
    /// Labels returned by the label endpoint when they differ from search results.
    pub current_labels: HashMap<u64, Vec<String>>,
    pub added_labels: Mutex<Vec<(u64, String)>>,
    pub search_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pr(mut self, pr: PullRequestEvent, commits: &[&str]) -> Self {
        self.pr_commits
            .insert(pr.number, commits.iter().map(|c| c.to_string()).collect());
        self.pull_requests.push(pr);
        self
    }

    pub fn with_commit(mut self, commit: CommitEvent) -> Self {
        self.commits.push(commit);
        self
    }

    pub fn with_current_labels(mut self, number: u64, labels: &[&str]) -> Self {
        self.current_labels
            .insert(number, labels.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn added_labels(&self) -> Vec<(u64, String)> {
        self.added_labels.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistorySource for FakeSource {
    async fn search_merged_pull_requests(&self) -> Result<Vec<PullRequestEvent>, GitHubError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pull_requests.clone())
    }

    async fn commits_for_pull_request(&self, number: u64) -> Result<Vec<String>, GitHubError> {
        Ok(self.pr_commits.get(&number).cloned().unwrap_or_default())
    }

    async fn all_commits(&self) -> Result<Vec<CommitEvent>, GitHubError> {
        Ok(self.commits.clone())
    }

    async fn labels_for_pull_request(&self, number: u64) -> Result<Vec<String>, GitHubError> {
        let mut labels = match self.current_labels.get(&number) {
            Some(labels) => labels.clone(),
            None => self
                .pull_requests
                .iter()
                .find(|pr| pr.number == number)
                .map(|pr| pr.labels.clone())
                .ok_or_else(|| GitHubError::RepositoryNotFound {
                    owner: "acme".to_string(),
                    repo: "widgets".to_string(),
                })?,
        };

        // Labels added during the test show up on later reads.
        labels.extend(
            self.added_labels()
                .into_iter()
                .filter(|(pr, _)| *pr == number)
                .map(|(_, label)| label),
        );
        Ok(labels)
    }

    async fn add_label_to_pull_request(
        &self,
        number: u64,
        label: &str,
    ) -> Result<(), GitHubError> {
        self.added_labels
            .lock()
            .unwrap()
            .push((number, label.to_string()));
        Ok(())
    }
}

/// Create a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}
