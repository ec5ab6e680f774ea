//! Release gating and version computation.
//!
//! `increment` looks only at the latest change and applies a single bump to
//! the stored version. `refresh` replays the full timeline from the configured
//! start version. The two are deliberately separate paths.

use chrono::NaiveDate;
use semver::Version;
use tracing::{debug, info, warn};

use crate::changelog::{
    ChangelogRenderer, DefaultEntryFormatter, EntryFormatter, NewEntry, merge,
};
use crate::config::Config;
use crate::error::{ChangelogError, GitHubError, ReleaseError};
use crate::github::HistorySource;
use crate::label::IncrementDirective;
use crate::timeline::{Event, TimelineBuilder, is_release_artifact};
use crate::version::{bump, reduce};

/// The most recent change and the directive it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestChange {
    pub event: Event,
    pub directive: IncrementDirective,
}

/// Why a release did not proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// The latest change is already released.
    Released,
    /// The latest change is internal (or unlabeled under a strict config).
    Internal,
    /// The repository has no merged pull requests or qualifying commits.
    NoHistory,
}

/// A release that should go ahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePlan {
    pub change: LatestChange,
    pub current: Version,
    pub next: Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncrementOutcome {
    NothingToRelease {
        gate: Gate,
        change: Option<LatestChange>,
    },
    Release(ReleasePlan),
}

/// Result of a full-history replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub version: Version,
    pub changelog: Vec<String>,
    pub events: usize,
}

/// Sequences classification, arithmetic and changelog updates against a
/// history source.
pub struct Orchestrator<'a, S: HistorySource + ?Sized> {
    source: &'a S,
    config: &'a Config,
    formatter: &'a dyn EntryFormatter,
    timeline: TimelineBuilder<'a, S>,
}

impl<'a, S: HistorySource + ?Sized> Orchestrator<'a, S> {
    pub fn new(source: &'a S, config: &'a Config) -> Self {
        Self {
            source,
            config,
            formatter: &DefaultEntryFormatter,
            timeline: TimelineBuilder::new(source),
        }
    }

    pub fn with_formatter(mut self, formatter: &'a dyn EntryFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// The most recently merged PR, or the latest qualifying commit if the
    /// repository has no merged PRs.
    pub async fn latest_change(&self) -> Result<Option<LatestChange>, GitHubError> {
        let pull_requests = self.source.search_merged_pull_requests().await?;

        if let Some(mut pr) = pull_requests.into_iter().max_by_key(|pr| pr.merged_at) {
            pr.labels = self.source.labels_for_pull_request(pr.number).await?;

            let rules = &self.config.labels;
            let directive = if rules.is_released(&pr.labels) {
                IncrementDirective::Released
            } else if let Some(directive) = rules.classify(&pr.labels) {
                directive
            } else {
                let fallback = self.config.fallback_directive();
                warn!(
                    pr = pr.number,
                    fallback = %fallback,
                    "Latest pull request has no recognized version label"
                );
                fallback
            };

            return Ok(Some(LatestChange {
                event: Event::PullRequest(pr),
                directive,
            }));
        }

        debug!("No merged pull requests, falling back to the latest commit");
        let latest_commit = self
            .source
            .all_commits()
            .await?
            .into_iter()
            .filter(|commit| !is_release_artifact(&commit.message))
            .max_by_key(|commit| commit.authored_at);

        Ok(latest_commit.map(|commit| LatestChange {
            event: Event::Commit(commit),
            directive: self.config.fallback_directive(),
        }))
    }

    /// Decide whether to release and compute the next version from `current`.
    pub async fn increment(&self, current: &Version) -> Result<IncrementOutcome, GitHubError> {
        let Some(change) = self.latest_change().await? else {
            info!("No history found, nothing to release");
            return Ok(IncrementOutcome::NothingToRelease {
                gate: Gate::NoHistory,
                change: None,
            });
        };

        let gate = match change.directive {
            IncrementDirective::Released => Some(Gate::Released),
            IncrementDirective::None => Some(Gate::Internal),
            _ => None,
        };

        if let Some(gate) = gate {
            info!(change = %change.event.id(), ?gate, "Nothing to release");
            return Ok(IncrementOutcome::NothingToRelease {
                gate,
                change: Some(change),
            });
        }

        let next = bump(change.directive, current);
        info!(
            change = %change.event.id(),
            directive = %change.directive,
            "Version {} -> {}",
            current,
            next
        );

        Ok(IncrementOutcome::Release(ReleasePlan {
            change,
            current: current.clone(),
            next,
        }))
    }

    /// Recompute the version and the full changelog from all history.
    pub async fn refresh(&self) -> Result<RefreshOutcome, GitHubError> {
        let timeline = self.timeline.build().await?;
        let fallback = self.config.fallback_directive();
        let start = &self.config.start_version;

        let version = reduce(timeline, start, &self.config.labels, fallback);
        let changelog = ChangelogRenderer::new(&self.config.labels, fallback, self.formatter)
            .render(timeline, start);

        info!(events = timeline.len(), version = %version, "Replayed history");
        Ok(RefreshOutcome {
            version,
            changelog,
            events: timeline.len(),
        })
    }

    /// Merge the released change into an existing changelog document.
    ///
    /// A missing changelog is not fatal: it is logged and `None` is returned
    /// so the release can continue without it.
    pub fn changelog_update(
        &self,
        existing: Result<Vec<String>, ChangelogError>,
        plan: &ReleasePlan,
        today: NaiveDate,
    ) -> Result<Option<Vec<String>>, ChangelogError> {
        let existing = match existing {
            Ok(lines) => lines,
            Err(ChangelogError::NoExistingChangelog) => {
                warn!(
                    path = %self.config.changelog.display(),
                    "No existing changelog, skipping changelog update"
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let entry = NewEntry {
            version: &plan.next,
            event: &plan.change.event,
            directive: plan.change.directive,
        };

        match merge(&existing, entry, today, self.formatter) {
            Ok(lines) => Ok(Some(lines)),
            Err(ChangelogError::NoExistingChangelog) => {
                warn!(
                    path = %self.config.changelog.display(),
                    "Changelog is shorter than its header, skipping changelog update"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Attach the released label to the PR that triggered the release.
    pub async fn mark_released(&self, plan: &ReleasePlan) -> Result<(), GitHubError> {
        let Some(number) = plan.change.event.pull_request_number() else {
            debug!("Released change is a bare commit, no label to add");
            return Ok(());
        };

        let label = self.config.labels.label_for(IncrementDirective::Released);
        self.source.add_label_to_pull_request(number, label).await?;
        info!(pr = number, label, "Marked pull request as released");
        Ok(())
    }

    /// Strict label check for a single PR: fails if no label is recognized.
    pub async fn check(&self, number: u64) -> Result<IncrementDirective, ReleaseError> {
        let labels = self.source.labels_for_pull_request(number).await?;
        let directive = self.config.labels.require(number, &labels)?;
        info!(pr = number, directive = %directive, "Pull request label is valid");
        Ok(directive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::MockHistorySource;
    use crate::timeline::{CommitEvent, PullRequestEvent};
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;

    fn pr(number: u64, day: u32) -> PullRequestEvent {
        PullRequestEvent {
            number,
            title: format!("PR {}", number),
            merged_at: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
            labels: Vec::new(),
            commits: Vec::new(),
        }
    }

    fn commit(hash: &str, day: u32, message: &str) -> CommitEvent {
        CommitEvent {
            hash: hash.to_string(),
            authored_at: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
            message: message.to_string(),
        }
    }

    fn source_with_latest_labels(labels: &'static [&'static str]) -> MockHistorySource {
        let mut source = MockHistorySource::new();
        source
            .expect_search_merged_pull_requests()
            .returning(|| Ok(vec![pr(1, 1), pr(3, 3), pr(2, 2)]));
        source
            .expect_labels_for_pull_request()
            .with(eq(3))
            .returning(move |_| Ok(labels.iter().map(|l| l.to_string()).collect()));
        source
    }

    #[tokio::test]
    async fn test_released_label_is_a_no_op() {
        let source = source_with_latest_labels(&["Released"]);
        let config = Config::default();

        let outcome = Orchestrator::new(&source, &config)
            .increment(&Version::new(1, 0, 0))
            .await
            .unwrap();

        let IncrementOutcome::NothingToRelease { gate, change } = outcome else {
            panic!("expected no release");
        };
        assert_eq!(gate, Gate::Released);
        assert_eq!(change.unwrap().directive, IncrementDirective::Released);
    }

    #[tokio::test]
    async fn test_released_marker_gates_despite_version_label() {
        let source = source_with_latest_labels(&["Version: Minor (api)", "Released"]);
        let config = Config::default();

        let outcome = Orchestrator::new(&source, &config)
            .increment(&Version::new(1, 1, 0))
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            IncrementOutcome::NothingToRelease {
                gate: Gate::Released,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_increment_bumps_current_once() {
        let source = source_with_latest_labels(&["Version: Major"]);
        let config = Config::default();
        let orchestrator = Orchestrator::new(&source, &config);

        let outcome = orchestrator.increment(&Version::new(3, 4, 5)).await.unwrap();
        let IncrementOutcome::Release(plan) = outcome else {
            panic!("expected a release");
        };
        assert_eq!(plan.current, Version::new(3, 4, 5));
        assert_eq!(plan.next, Version::new(4, 0, 0));
        assert_eq!(plan.change.event.pull_request_number(), Some(3));
    }

    #[tokio::test]
    async fn test_unlabeled_latest_pr_respects_abort_setting() {
        let source = source_with_latest_labels(&["documentation"]);

        let lenient = Config::default();
        let outcome = Orchestrator::new(&source, &lenient)
            .increment(&Version::new(1, 0, 0))
            .await
            .unwrap();
        assert!(matches!(outcome, IncrementOutcome::Release(ref plan) if plan.next == Version::new(1, 0, 1)));

        let strict = Config {
            abort_on_missing_label: true,
            ..Config::default()
        };
        let outcome = Orchestrator::new(&source, &strict)
            .increment(&Version::new(1, 0, 0))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            IncrementOutcome::NothingToRelease {
                gate: Gate::Internal,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_no_prs_falls_back_to_latest_commit() {
        let mut source = MockHistorySource::new();
        source
            .expect_search_merged_pull_requests()
            .returning(|| Ok(Vec::new()));
        source.expect_all_commits().returning(|| {
            Ok(vec![
                commit("aaa", 1, "Initial"),
                commit("bbb", 2, "Tidy up"),
                commit("ccc", 3, "chore(release): v0.0.2"),
            ])
        });
        source.expect_labels_for_pull_request().never();

        let config = Config::default();
        let change = Orchestrator::new(&source, &config)
            .latest_change()
            .await
            .unwrap()
            .unwrap();

        assert_eq!(change.event.id().to_string(), "bbb");
        assert_eq!(change.directive, IncrementDirective::Patch);
    }

    #[tokio::test]
    async fn test_empty_repository_has_nothing_to_release() {
        let mut source = MockHistorySource::new();
        source
            .expect_search_merged_pull_requests()
            .returning(|| Ok(Vec::new()));
        source.expect_all_commits().returning(|| Ok(Vec::new()));

        let config = Config::default();
        let outcome = Orchestrator::new(&source, &config)
            .increment(&Version::new(0, 1, 0))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            IncrementOutcome::NothingToRelease {
                gate: Gate::NoHistory,
                change: None,
            }
        );
    }

    #[tokio::test]
    async fn test_mark_released_labels_the_pr() {
        let mut source = source_with_latest_labels(&["Version: Patch"]);
        source
            .expect_add_label_to_pull_request()
            .withf(|number, label| *number == 3 && label == "Released")
            .times(1)
            .returning(|_, _| Ok(()));

        let config = Config::default();
        let orchestrator = Orchestrator::new(&source, &config);
        let IncrementOutcome::Release(plan) =
            orchestrator.increment(&Version::new(1, 0, 0)).await.unwrap()
        else {
            panic!("expected a release");
        };

        orchestrator.mark_released(&plan).await.unwrap();
    }

    #[tokio::test]
    async fn test_check_fails_without_label() {
        let mut source = MockHistorySource::new();
        source
            .expect_labels_for_pull_request()
            .returning(|_| Ok(vec!["bug".to_string()]));

        let config = Config::default();
        let result = Orchestrator::new(&source, &config).check(5).await;

        assert!(matches!(result, Err(ReleaseError::Label(_))));
    }

    #[test]
    fn test_missing_changelog_is_skipped() {
        let source = MockHistorySource::new();
        let config = Config::default();
        let orchestrator = Orchestrator::new(&source, &config);
        let plan = ReleasePlan {
            change: LatestChange {
                event: Event::PullRequest(pr(1, 1)),
                directive: IncrementDirective::Patch,
            },
            current: Version::new(1, 0, 0),
            next: Version::new(1, 0, 1),
        };

        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let update = orchestrator
            .changelog_update(Err(ChangelogError::NoExistingChangelog), &plan, today)
            .unwrap();
        assert!(update.is_none());
    }

    struct TerseFormatter;

    impl EntryFormatter for TerseFormatter {
        fn format_entry(
            &self,
            version: &Version,
            _event: &Event,
            _directive: IncrementDirective,
        ) -> String {
            format!("* {}", version)
        }
    }

    #[test]
    fn test_custom_formatter_shapes_new_entry() {
        let source = MockHistorySource::new();
        let config = Config::default();
        let orchestrator = Orchestrator::new(&source, &config).with_formatter(&TerseFormatter);
        let plan = ReleasePlan {
            change: LatestChange {
                event: Event::PullRequest(pr(1, 1)),
                directive: IncrementDirective::Minor,
            },
            current: Version::new(1, 0, 0),
            next: Version::new(1, 1, 0),
        };
        let header: Vec<String> = crate::changelog::CHANGELOG_HEADER
            .iter()
            .map(|l| l.to_string())
            .collect();

        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let lines = orchestrator
            .changelog_update(Ok(header), &plan, today)
            .unwrap()
            .unwrap();

        assert_eq!(lines[5], "## 2024-01-01 (version 1.1.0)");
        assert_eq!(lines[7], "* 1.1.0");
    }
}
