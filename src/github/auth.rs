//! GitHub authentication detection.
//!
//! Auth order:
//! 1. `gh auth token` (gh CLI)
//! 2. GITHUB_TOKEN env var
//! 3. GH_TOKEN env var

use std::env;
use std::process::Command;

use tracing::debug;

use crate::error::GitHubError;

/// Get a GitHub token using the first auth source that yields one.
pub fn get_github_token() -> Result<String, GitHubError> {
    if let Some(token) = get_token_from_gh_cli() {
        debug!("Using GitHub token from gh CLI");
        return Ok(token);
    }

    token_from_env().ok_or(GitHubError::AuthenticationFailed)
}

/// Token from GITHUB_TOKEN, then GH_TOKEN. Empty values are ignored.
pub fn token_from_env() -> Option<String> {
    ["GITHUB_TOKEN", "GH_TOKEN"].iter().find_map(|name| {
        env::var(name)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .inspect(|_| debug!(source = name, "Using GitHub token from environment"))
    })
}

fn get_token_from_gh_cli() -> Option<String> {
    which::which("gh").ok()?;

    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    if !output.status.success() {
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}
