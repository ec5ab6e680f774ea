//! Fold a timeline into a cumulative version.

use semver::Version;

use crate::label::{IncrementDirective, LabelRules};
use crate::timeline::{Event, Timeline};

use super::bump::bump;

/// One event's effect on the version during a replay.
#[derive(Debug, Clone)]
pub struct VersionStep<'a> {
    pub event: &'a Event,
    pub directive: IncrementDirective,
    /// Version after applying `directive`.
    pub version: Version,
}

/// Replay the timeline oldest-first, recording the version after each event.
///
/// `Released` never halts the replay; it folds as `None` so history after an
/// already-shipped event is still counted.
pub fn replay<'a>(
    timeline: &'a Timeline,
    start: &Version,
    rules: &LabelRules,
    fallback: IncrementDirective,
) -> Vec<VersionStep<'a>> {
    let mut version = start.clone();

    timeline
        .iter()
        .map(|event| {
            let directive = rules.classify_or(event.labels(), fallback);
            version = bump(directive, &version);
            VersionStep {
                event,
                directive,
                version: version.clone(),
            }
        })
        .collect()
}

/// Compute the current version from the full timeline.
pub fn reduce(
    timeline: &Timeline,
    start: &Version,
    rules: &LabelRules,
    fallback: IncrementDirective,
) -> Version {
    replay(timeline, start, rules, fallback)
        .pop()
        .map(|step| step.version)
        .unwrap_or_else(|| start.clone())
}
