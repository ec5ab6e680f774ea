//! Repository coordinates from git remote URLs.

use crate::error::GitHubError;

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl std::str::FromStr for RepoSlug {
    type Err = GitHubError;

    /// Parse `owner/name`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_owner_repo_path(s.trim())
    }
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Extract owner and repo from a git remote URL.
pub fn parse_github_remote(url: &str) -> Result<RepoSlug, GitHubError> {
    let url = url.trim();

    // SSH: git@github.com:owner/repo.git
    if let Some(path) = url.strip_prefix("git@github.com:") {
        return parse_owner_repo_path(path);
    }

    // HTTPS: https://github.com/owner/repo.git
    if let Some(path) = url.split("github.com/").nth(1) {
        return parse_owner_repo_path(path);
    }

    Err(GitHubError::InvalidRepositoryUrl)
}

fn parse_owner_repo_path(path: &str) -> Result<RepoSlug, GitHubError> {
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut parts = path.split('/');

    match (parts.next(), parts.next()) {
        (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => Ok(RepoSlug {
            owner: owner.to_string(),
            name: name.to_string(),
        }),
        _ => Err(GitHubError::InvalidRepositoryUrl),
    }
}
