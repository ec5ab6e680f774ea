//! History source: GitHub API operations using octocrab.

pub mod auth;
pub mod client;
pub mod remote;
pub mod retry;
pub mod source;

pub use auth::get_github_token;
pub use client::GitHubSource;
pub use remote::{RepoSlug, parse_github_remote};
#[cfg(test)]
pub use source::MockHistorySource;
pub use source::HistorySource;
