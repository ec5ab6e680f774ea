//! Release configuration from `labelver.toml` and the environment.

use std::path::{Path, PathBuf};

use semver::Version;
use toml_edit::{DocumentMut, Item};
use tracing::debug;

use crate::error::ConfigError;
use crate::label::{IncrementDirective, LabelRules, classifier};
use crate::version::parse_version;

/// Default config file name, looked up in the repository root.
pub const CONFIG_FILE: &str = "labelver.toml";

/// Environment override for [`Config::abort_on_missing_label`].
pub const ABORT_ON_MISSING_LABEL_ENV: &str = "LABELVER_ABORT_ON_MISSING_LABEL";

/// Complete configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub labels: LabelRules,
    /// Seed version for full-history replay.
    pub start_version: Version,
    /// Unlabeled events become `None` instead of `Patch`.
    pub abort_on_missing_label: bool,
    pub changelog: PathBuf,
    pub manifest: PathBuf,
    pub branch: String,
    pub remote: String,
    /// Run after the release is pushed, e.g. `cargo publish`.
    pub publish_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            labels: LabelRules::default(),
            start_version: Version::new(0, 0, 0),
            abort_on_missing_label: false,
            changelog: PathBuf::from("CHANGELOG.md"),
            manifest: PathBuf::from("Cargo.toml"),
            branch: "main".to_string(),
            remote: "origin".to_string(),
            publish_command: None,
        }
    }
}

impl Config {
    /// Directive for events without a recognized label.
    pub fn fallback_directive(&self) -> IncrementDirective {
        if self.abort_on_missing_label {
            IncrementDirective::None
        } else {
            IncrementDirective::Patch
        }
    }

    /// Load from a file (defaults if it does not exist), then apply the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
            debug!(path = %path.display(), "Loaded config file");
            Self::from_toml(path, &content)?
        } else {
            Self::default()
        };

        config.apply_env()?;
        Ok(config)
    }

    /// Parse config content. Every key is optional.
    pub fn from_toml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let doc = content
            .parse::<DocumentMut>()
            .map_err(|e| ConfigError::ParseFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let defaults = Self::default();
        let labels = doc.get("labels");
        let label = |key: &str, default: &str| -> Result<String, ConfigError> {
            Ok(string_value(labels.and_then(|t| t.get(key)), &format!("labels.{}", key))?
                .unwrap_or_else(|| default.to_string()))
        };

        let start_version = match string_value(doc.get("start_version"), "start_version")? {
            Some(raw) => parse_version(&raw).map_err(|e| ConfigError::InvalidValue {
                key: "start_version".to_string(),
                reason: e.to_string(),
            })?,
            None => defaults.start_version,
        };

        Ok(Self {
            labels: LabelRules::new(
                label("major", classifier::DEFAULT_MAJOR_LABEL)?,
                label("minor", classifier::DEFAULT_MINOR_LABEL)?,
                label("patch", classifier::DEFAULT_PATCH_LABEL)?,
                label("internal", classifier::DEFAULT_INTERNAL_LABEL)?,
                label("released", classifier::DEFAULT_RELEASED_LABEL)?,
            ),
            start_version,
            abort_on_missing_label: bool_value(
                doc.get("abort_on_missing_label"),
                "abort_on_missing_label",
            )?
            .unwrap_or(defaults.abort_on_missing_label),
            changelog: string_value(doc.get("changelog"), "changelog")?
                .map(PathBuf::from)
                .unwrap_or(defaults.changelog),
            manifest: string_value(doc.get("manifest"), "manifest")?
                .map(PathBuf::from)
                .unwrap_or(defaults.manifest),
            branch: string_value(doc.get("branch"), "branch")?.unwrap_or(defaults.branch),
            remote: string_value(doc.get("remote"), "remote")?.unwrap_or(defaults.remote),
            publish_command: string_value(doc.get("publish_command"), "publish_command")?
                .filter(|cmd| !cmd.trim().is_empty()),
        })
    }

    /// Apply environment overrides.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(raw) = std::env::var(ABORT_ON_MISSING_LABEL_ENV) {
            self.abort_on_missing_label = parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: ABORT_ON_MISSING_LABEL_ENV.to_string(),
                reason: format!("expected true or false, got '{}'", raw),
            })?;
        }
        Ok(())
    }
}

fn string_value(item: Option<&Item>, key: &str) -> Result<Option<String>, ConfigError> {
    match item {
        None => Ok(None),
        Some(item) => item
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| ConfigError::InvalidValue {
                key: key.to_string(),
                reason: "expected a string".to_string(),
            }),
    }
}

fn bool_value(item: Option<&Item>, key: &str) -> Result<Option<bool>, ConfigError> {
    match item {
        None => Ok(None),
        Some(item) => item
            .as_bool()
            .map(Some)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: key.to_string(),
                reason: "expected true or false".to_string(),
            }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" | "" => Some(false),
        _ => None,
    }
}
