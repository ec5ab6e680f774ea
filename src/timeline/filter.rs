//! Detection of commits that are release artifacts rather than history.

use std::sync::OnceLock;

use regex_lite::Regex;

/// Merge commits created by the hosting service when a PR is merged.
const MERGE_MARKERS: [&str; 2] = ["Merge pull request #", "Merge branch "];

/// CI-skip markers, matched anywhere in the message.
const CI_SKIP_MARKERS: [&str; 2] = ["[skip ci]", "[ci skip]"];

fn release_marker() -> &'static Regex {
    static RELEASE: OnceLock<Regex> = OnceLock::new();
    // Matches the release commit this tool creates, in any case.
    RELEASE.get_or_init(|| {
        Regex::new(r"(?i)^\s*chore\(release\)\s*:").expect("release marker pattern is valid")
    })
}

/// Whether a commit message marks an automated merge, release or CI-skip commit.
pub fn is_release_artifact(message: &str) -> bool {
    MERGE_MARKERS
        .iter()
        .any(|marker| message.starts_with(marker))
        || release_marker().is_match(message)
        || CI_SKIP_MARKERS.iter().any(|marker| message.contains(marker))
}
