//! Error types for labelver modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the history source (GitHub API operations).
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error(
        "GitHub authentication failed: no valid auth found. Run 'gh auth login' or set GITHUB_TOKEN environment variable"
    )]
    AuthenticationFailed,

    #[error("GitHub request failed ({operation}): {source}")]
    RequestFailed {
        operation: String,
        #[source]
        source: Box<octocrab::Error>,
    },

    #[error("Rate limited by GitHub API while {operation}")]
    RateLimited { operation: String },

    #[error("Repository not found: {owner}/{repo}")]
    RepositoryNotFound { owner: String, repo: String },

    #[error("Failed to parse repository URL")]
    InvalidRepositoryUrl,

    #[error("Gave up {operation} after {pages} full pages; history would be incomplete")]
    PaginationLimit { operation: String, pages: u32 },

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<GitHubError>),
}

impl GitHubError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RequestFailed { .. } | Self::RateLimited { .. })
    }
}

/// Errors from changelog operations.
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("No existing changelog to merge into")]
    NoExistingChangelog,

    #[error("Failed to read changelog: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write changelog: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to create backup: {0}")]
    BackupFailed(#[source] std::io::Error),
}

/// Errors from version operations.
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Failed to parse version '{0}': {1}")]
    ParseFailed(String, #[source] semver::Error),

    #[error("Invalid increment directive '{0}' (expected major, minor, patch, none or released)")]
    InvalidDirective(String),
}

/// Errors from label validation.
#[derive(Error, Debug)]
pub enum LabelError {
    #[error("Pull request #{pr} has no recognized version label (expected one of: {expected})")]
    MissingLabel { pr: u64, expected: String },
}

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {reason}", path.display())]
    ParseFailed { path: PathBuf, reason: String },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Errors from the release pipeline.
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Label(#[from] LabelError),

    #[error("{program} not found in PATH")]
    ProgramNotFound { program: String },

    #[error("Command `{command}` failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("Failed to update version file {}: {reason}", path.display())]
    ManifestFailed { path: PathBuf, reason: String },

    #[error("No version field found in {}", .0.display())]
    NoManifestVersion(PathBuf),

    #[error("Failed to snapshot {} before release: {source}", path.display())]
    SnapshotFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
