//! VCS and package-manager side effects: checkout, commit, tag, push, publish.
//!
//! Commands shell out through a [`CommandExecutor`], inheriting the user's
//! existing git config, SSH agent, and credential store.

use std::path::PathBuf;
use std::process::Command;

use semver::Version;
use tracing::{debug, info, warn};

use crate::error::ReleaseError;

/// Runs an external program and returns its stdout lines.
///
/// This abstraction allows mocking subprocesses in tests.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> Result<Vec<String>, ReleaseError>;
}

/// Executor backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellExecutor;

impl CommandExecutor for ShellExecutor {
    fn run(&self, program: &str, args: &[String]) -> Result<Vec<String>, ReleaseError> {
        let command = display_command(program, args);

        which::which(program).map_err(|_| ReleaseError::ProgramNotFound {
            program: program.to_string(),
        })?;

        debug!(command = %command, "Running");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| ReleaseError::CommandFailed {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReleaseError::CommandFailed {
                command,
                reason: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }
}

fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

fn to_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

/// Git operations for one release, against a remote and branch.
pub struct GitActions<'a, E: CommandExecutor + ?Sized> {
    executor: &'a E,
    remote: &'a str,
    branch: &'a str,
}

impl<'a, E: CommandExecutor + ?Sized> GitActions<'a, E> {
    pub fn new(executor: &'a E, remote: &'a str, branch: &'a str) -> Self {
        Self {
            executor,
            remote,
            branch,
        }
    }

    fn git(&self, args: &[&str]) -> Result<Vec<String>, ReleaseError> {
        self.executor.run("git", &to_args(args))
    }

    /// URL of the configured remote.
    pub fn remote_url(&self) -> Result<String, ReleaseError> {
        let lines = self.git(&["remote", "get-url", self.remote])?;
        lines
            .into_iter()
            .next()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ReleaseError::CommandFailed {
                command: format!("git remote get-url {}", self.remote),
                reason: "empty output".to_string(),
            })
    }

    /// Switch to the release branch and bring it up to date.
    pub fn checkout(&self) -> Result<(), ReleaseError> {
        self.git(&["checkout", self.branch])?;
        self.git(&["pull", "--ff-only", self.remote, self.branch])?;
        Ok(())
    }

    /// Stage files, create the release commit and an annotated tag.
    ///
    /// Returns the tag name.
    pub fn commit_and_tag(
        &self,
        version: &Version,
        files: &[PathBuf],
    ) -> Result<String, ReleaseError> {
        let tag_name = format!("v{}", version);

        let mut add_args = vec!["add".to_string(), "--".to_string()];
        add_args.extend(files.iter().map(|p| p.display().to_string()));
        self.executor.run("git", &add_args)?;

        let message = format!("chore(release): {}", tag_name);
        self.git(&["commit", "-m", &message])?;

        // Annotated so --follow-tags pushes it
        let tag_message = format!("Release {}", tag_name);
        if let Err(e) = self.git(&["tag", "-a", &tag_name, "-m", &tag_message]) {
            if let Err(reset_err) = self.git(&["reset", "--soft", "HEAD~1"]) {
                warn!(error = %reset_err, "Could not undo release commit");
            }
            return Err(e);
        }

        info!(tag = %tag_name, "Created release commit and tag");
        Ok(tag_name)
    }

    /// Remove files from the index, keeping working-tree content.
    pub fn unstage(&self, files: &[PathBuf]) -> Result<(), ReleaseError> {
        let mut args = vec!["reset".to_string(), "--quiet".to_string(), "--".to_string()];
        args.extend(files.iter().map(|p| p.display().to_string()));
        self.executor.run("git", &args)?;
        Ok(())
    }

    pub fn push(&self) -> Result<(), ReleaseError> {
        self.git(&["push", self.remote, self.branch, "--follow-tags"])?;
        Ok(())
    }

    /// Undo a release that failed to push: delete the tag, soft-reset the commit.
    pub fn rollback(&self, tag_name: &str) -> Result<(), ReleaseError> {
        self.git(&["tag", "-d", tag_name])?;
        self.git(&["reset", "--soft", "HEAD~1"])?;
        Ok(())
    }

    /// Run the configured publish command, e.g. `cargo publish`.
    pub fn publish(&self, command: &str) -> Result<(), ReleaseError> {
        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            return Ok(());
        };
        let args: Vec<String> = parts.map(str::to_string).collect();
        self.executor.run(program, &args)?;
        info!(command, "Published package");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;

    #[test]
    fn test_shell_executor_runs_git() {
        let lines = ShellExecutor.run("git", &to_args(&["--version"])).unwrap();
        assert!(lines[0].starts_with("git version"));
    }

    #[test]
    fn test_shell_executor_reports_failure() {
        let result = ShellExecutor.run("git", &to_args(&["not-a-real-command"]));
        assert!(matches!(result, Err(ReleaseError::CommandFailed { .. })));
    }

    #[test]
    fn test_shell_executor_missing_program() {
        let result = ShellExecutor.run("definitely-not-installed-labelver", &[]);
        assert!(matches!(result, Err(ReleaseError::ProgramNotFound { .. })));
    }

    #[test]
    fn test_commit_and_tag_command_sequence() {
        let mut executor = MockCommandExecutor::new();
        let mut seq = Sequence::new();

        for expected in [
            to_args(&["add", "--", "Cargo.toml", "CHANGELOG.md"]),
            to_args(&["commit", "-m", "chore(release): v1.2.0"]),
            to_args(&["tag", "-a", "v1.2.0", "-m", "Release v1.2.0"]),
        ] {
            executor
                .expect_run()
                .withf(move |program, args| program == "git" && args == expected.as_slice())
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(Vec::new()));
        }

        let git = GitActions::new(&executor, "origin", "main");
        let tag = git
            .commit_and_tag(
                &Version::new(1, 2, 0),
                &[PathBuf::from("Cargo.toml"), PathBuf::from("CHANGELOG.md")],
            )
            .unwrap();

        assert_eq!(tag, "v1.2.0");
    }

    #[test]
    fn test_failed_tag_undoes_commit() {
        let mut executor = MockCommandExecutor::new();
        executor
            .expect_run()
            .withf(|_, args| args.first().map(String::as_str) == Some("tag"))
            .times(1)
            .returning(|_, _| {
                Err(ReleaseError::CommandFailed {
                    command: "git tag".to_string(),
                    reason: "already exists".to_string(),
                })
            });
        executor
            .expect_run()
            .withf(|_, args| args == to_args(&["reset", "--soft", "HEAD~1"]).as_slice())
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        executor.expect_run().returning(|_, _| Ok(Vec::new()));

        let result = GitActions::new(&executor, "origin", "main")
            .commit_and_tag(&Version::new(1, 0, 0), &[PathBuf::from("Cargo.toml")]);

        assert!(matches!(result, Err(ReleaseError::CommandFailed { .. })));
    }

    #[test]
    fn test_publish_splits_command() {
        let mut executor = MockCommandExecutor::new();
        executor
            .expect_run()
            .withf(|program, args| {
                program == "npm" && args == to_args(&["publish", "--access", "public"]).as_slice()
            })
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        GitActions::new(&executor, "origin", "main")
            .publish("npm publish --access public")
            .unwrap();
    }

    #[test]
    fn test_remote_url_takes_first_line() {
        let mut executor = MockCommandExecutor::new();
        executor
            .expect_run()
            .returning(|_, _| Ok(vec!["git@github.com:acme/widgets.git".to_string()]));

        let url = GitActions::new(&executor, "origin", "main").remote_url().unwrap();
        assert_eq!(url, "git@github.com:acme/widgets.git");
    }
}
