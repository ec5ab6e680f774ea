//! labelver - label-driven semantic versioning and changelogs for GitHub repositories.
//!
//! # Overview
//!
//! labelver reads merged pull requests and their labels, turns each label into
//! a version increment, and keeps a day-grouped CHANGELOG.md in step with the
//! version stored in the project manifest.

pub mod changelog;
pub mod config;
pub mod error;
pub mod github;
pub mod label;
pub mod release;
pub mod timeline;
pub mod version;

// Re-export commonly used types
pub use config::Config;
pub use error::{ChangelogError, ConfigError, GitHubError, LabelError, ReleaseError, VersionError};
pub use label::{IncrementDirective, LabelRules};
pub use release::{IncrementOutcome, Orchestrator};
pub use timeline::{CommitEvent, Event, PullRequestEvent, Timeline};
