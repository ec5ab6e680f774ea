//! Semver arithmetic for a single increment directive.

use semver::Version;

use crate::error::VersionError;
use crate::label::IncrementDirective;

/// Apply one directive to a version.
///
/// - `Major` = `(major+1, 0, 0)`
/// - `Minor` = `(major, minor+1, 0)`
/// - `Patch` = `(major, minor, patch+1)`
/// - `None` and `Released` leave the version unchanged
///
/// Pre-release and build metadata are dropped on an actual increment.
pub fn bump(directive: IncrementDirective, current: &Version) -> Version {
    match directive {
        IncrementDirective::Major => Version::new(current.major + 1, 0, 0),
        IncrementDirective::Minor => Version::new(current.major, current.minor + 1, 0),
        IncrementDirective::Patch => Version::new(current.major, current.minor, current.patch + 1),
        // Released is a gate, not arithmetic.
        IncrementDirective::None | IncrementDirective::Released => current.clone(),
    }
}

/// Parse a stored version string such as `1.2.3` or `v1.2.3`.
pub fn parse_version(raw: &str) -> Result<Version, VersionError> {
    let trimmed = raw.trim();
    let without_prefix = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(without_prefix).map_err(|e| VersionError::ParseFailed(raw.to_string(), e))
}
