//! Version increment directives derived from labels.

use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// The version-increment class carried by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncrementDirective {
    Major,
    Minor,
    Patch,
    /// Internal change: recorded, but the version stays put.
    None,
    /// Already shipped. Halts the release gate; folds as `None`.
    Released,
}

impl IncrementDirective {
    /// Fixed classification precedence, highest first.
    pub const PRECEDENCE: [IncrementDirective; 5] = [
        Self::Major,
        Self::Minor,
        Self::Patch,
        Self::None,
        Self::Released,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::None => "internal",
            Self::Released => "released",
        }
    }

    /// Whether applying this directive changes the version.
    pub fn is_increment(&self) -> bool {
        matches!(self, Self::Major | Self::Minor | Self::Patch)
    }
}

impl std::fmt::Display for IncrementDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IncrementDirective {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            "none" | "internal" => Ok(Self::None),
            "released" => Ok(Self::Released),
            _ => Err(VersionError::InvalidDirective(s.to_string())),
        }
    }
}
