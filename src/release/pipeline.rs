//! Release pipelines: apply orchestrator decisions to the working tree.
//!
//! `run_increment` releases the latest change; `run_refresh` rewrites the
//! changelog and manifest from the full history. With `dry_run` neither
//! touches files, git, or the history source's labels.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::changelog::{read_changelog, write_changelog};
use crate::config::Config;
use crate::error::ReleaseError;
use crate::github::HistorySource;
use crate::label::IncrementDirective;

use super::executor::{CommandExecutor, GitActions};
use super::manifest::{read_manifest_version, write_manifest_version};
use super::orchestrator::{Gate, IncrementOutcome, Orchestrator, RefreshOutcome, ReleasePlan};

/// Flags shared by both pipelines.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub dry_run: bool,
    /// Calendar day used for the changelog day-section.
    pub today: NaiveDate,
}

/// Release the most recent change, if it calls for one.
pub async fn run_increment<S, E>(
    source: &S,
    executor: &E,
    config: &Config,
    options: PipelineOptions,
) -> Result<IncrementOutcome, ReleaseError>
where
    S: HistorySource + ?Sized,
    E: CommandExecutor + ?Sized,
{
    let git = GitActions::new(executor, &config.remote, &config.branch);
    let orchestrator = Orchestrator::new(source, config);

    if !options.dry_run {
        git.checkout()?;
    }

    let current = read_manifest_version(&config.manifest)?;
    let outcome = orchestrator.increment(&current).await?;

    let plan = match &outcome {
        IncrementOutcome::NothingToRelease { gate, change } => {
            let reason = match gate {
                Gate::Released => "latest change is already released",
                Gate::Internal => "latest change is internal",
                Gate::NoHistory => "no merged pull requests or commits",
            };
            match change {
                Some(change) => println!("Nothing to release ({}: {})", reason, change.event.id()),
                None => println!("Nothing to release ({})", reason),
            }
            return Ok(outcome);
        }
        IncrementOutcome::Release(plan) => plan,
    };

    println!(
        "Version: {} -> {} ({} from {})",
        plan.current,
        plan.next,
        plan.change.directive,
        plan.change.event.id()
    );

    if options.dry_run {
        println!("Dry run complete. No changes made.");
        return Ok(outcome);
    }

    let snapshot = Snapshot::capture(&[config.manifest.as_path(), config.changelog.as_path()])?;

    let staged = stage_release(&git, &orchestrator, config, plan, options.today);
    let (tag_name, files_to_stage) = match staged {
        Ok(staged) => staged,
        Err(e) => {
            error!(error = %e, "Release commit failed, restoring files");
            let files = [config.manifest.clone(), config.changelog.clone()];
            if let Err(unstage_err) = git.unstage(&files) {
                warn!(error = %unstage_err, "Could not unstage release files");
            }
            snapshot.restore();
            return Err(e);
        }
    };
    debug!(files = files_to_stage.len(), "Committed release files");

    if let Err(e) = git.push() {
        error!(error = %e, "Push failed, rolling back");
        if let Err(rollback_err) = git.rollback(&tag_name) {
            error!(error = %rollback_err, tag = %tag_name, "Rollback failed");
        }
        return Err(e);
    }
    println!("  [DONE] Pushed to {}/{}", config.remote, config.branch);

    // The tag is public now; a labeling failure must not fail the release.
    if let Err(e) = orchestrator.mark_released(plan).await {
        let label = config.labels.label_for(IncrementDirective::Released);
        warn!(error = %e, "Could not mark the change as released");
        println!(
            "  [WARN] Add the '{}' label to {} by hand, or the next run releases it again",
            label,
            plan.change.event.id()
        );
    }

    if let Some(command) = &config.publish_command {
        git.publish(command)?;
        println!("  [DONE] Published with `{}`", command);
    }

    info!(tag = %tag_name, "Release complete");
    println!();
    println!("Release {} shipped!", tag_name);
    Ok(outcome)
}

/// Write the manifest and changelog, then commit and tag them.
///
/// Returns the tag name and the staged files.
fn stage_release<S, E>(
    git: &GitActions<'_, E>,
    orchestrator: &Orchestrator<'_, S>,
    config: &Config,
    plan: &ReleasePlan,
    today: NaiveDate,
) -> Result<(String, Vec<PathBuf>), ReleaseError>
where
    S: HistorySource + ?Sized,
    E: CommandExecutor + ?Sized,
{
    write_manifest_version(&config.manifest, &plan.next)?;
    println!("  [DONE] Updated {}", config.manifest.display());

    let mut files_to_stage = vec![config.manifest.clone()];

    let existing = read_changelog(&config.changelog);
    if let Some(lines) = orchestrator.changelog_update(existing, plan, today)? {
        write_changelog(&config.changelog, &lines)?;
        files_to_stage.push(config.changelog.clone());
        println!("  [DONE] Updated {}", config.changelog.display());
    } else {
        println!("  [SKIP] No changelog at {}", config.changelog.display());
    }

    let tag_name = git.commit_and_tag(&plan.next, &files_to_stage)?;
    println!("  [DONE] Created tag: {}", tag_name);
    Ok((tag_name, files_to_stage))
}

/// Original content of files a release rewrites; `None` if absent.
struct Snapshot(Vec<(PathBuf, Option<Vec<u8>>)>);

impl Snapshot {
    fn capture(paths: &[&Path]) -> Result<Self, ReleaseError> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let content = match std::fs::read(path) {
                Ok(bytes) => Some(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                Err(source) => {
                    return Err(ReleaseError::SnapshotFailed {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            };
            files.push((path.to_path_buf(), content));
        }
        Ok(Self(files))
    }

    /// Put every file back. Failures are logged, not returned.
    fn restore(self) {
        for (path, content) in self.0 {
            let result = match content {
                Some(bytes) => std::fs::write(&path, bytes),
                None if path.exists() => std::fs::remove_file(&path),
                None => Ok(()),
            };
            if let Err(e) = result {
                error!(path = %path.display(), error = %e, "Could not restore file");
            }
        }
    }
}

/// Recompute version and changelog from the whole history.
pub async fn run_refresh<S>(
    source: &S,
    config: &Config,
    options: PipelineOptions,
) -> Result<RefreshOutcome, ReleaseError>
where
    S: HistorySource + ?Sized,
{
    let outcome = Orchestrator::new(source, config).refresh().await?;

    println!(
        "Replayed {} events from {}: version {}",
        outcome.events, config.start_version, outcome.version
    );

    if options.dry_run {
        for line in &outcome.changelog {
            println!("{}", line);
        }
        return Ok(outcome);
    }

    write_changelog(&config.changelog, &outcome.changelog)?;
    println!("  [DONE] Wrote {}", config.changelog.display());

    write_manifest_version(&config.manifest, &outcome.version)?;
    println!("  [DONE] Updated {}", config.manifest.display());

    Ok(outcome)
}
