//! The manifest file that stores the current version.
//!
//! Supports Cargo.toml (`[package]` or `[workspace.package]`) and package.json.

use std::path::Path;

use semver::Version;
use toml_edit::{DocumentMut, value};

use crate::error::ReleaseError;
use crate::version::parse_version;

/// The kind of version file, decided by file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    CargoToml,
    PackageJson,
}

impl ManifestKind {
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::PackageJson,
            _ => Self::CargoToml,
        }
    }
}

/// Read the current version from a manifest.
pub fn read_manifest_version(path: &Path) -> Result<Version, ReleaseError> {
    let content = read_file(path)?;

    let raw = match ManifestKind::detect(path) {
        ManifestKind::CargoToml => {
            let doc = parse_toml(path, &content)?;
            toml_version_table(&doc)
                .and_then(|table| table.get("version"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        }
        ManifestKind::PackageJson => {
            let json = parse_json(path, &content)?;
            json.get("version")
                .and_then(|v| v.as_str())
                .map(str::to_string)
        }
    };

    let raw = raw.ok_or_else(|| ReleaseError::NoManifestVersion(path.to_path_buf()))?;
    Ok(parse_version(&raw)?)
}

/// Overwrite the version in a manifest, preserving the rest of the file.
pub fn write_manifest_version(path: &Path, version: &Version) -> Result<(), ReleaseError> {
    let content = read_file(path)?;

    let output = match ManifestKind::detect(path) {
        ManifestKind::CargoToml => {
            let mut doc = parse_toml(path, &content)?;
            let section = if doc.get("package").is_some() {
                &mut doc["package"]
            } else if doc
                .get("workspace")
                .and_then(|w| w.get("package"))
                .is_some()
            {
                &mut doc["workspace"]["package"]
            } else {
                return Err(ReleaseError::NoManifestVersion(path.to_path_buf()));
            };
            section["version"] = value(version.to_string());
            doc.to_string()
        }
        ManifestKind::PackageJson => {
            let mut json = parse_json(path, &content)?;
            json["version"] = serde_json::Value::String(version.to_string());
            let mut pretty =
                serde_json::to_string_pretty(&json).map_err(|e| manifest_error(path, e))?;
            pretty.push('\n');
            pretty
        }
    };

    std::fs::write(path, output).map_err(|e| manifest_error(path, e))
}

fn toml_version_table(doc: &DocumentMut) -> Option<&toml_edit::Item> {
    doc.get("package")
        .or_else(|| doc.get("workspace").and_then(|w| w.get("package")))
}

fn read_file(path: &Path) -> Result<String, ReleaseError> {
    std::fs::read_to_string(path).map_err(|e| manifest_error(path, e))
}

fn parse_toml(path: &Path, content: &str) -> Result<DocumentMut, ReleaseError> {
    content
        .parse::<DocumentMut>()
        .map_err(|e| manifest_error(path, e))
}

fn parse_json(path: &Path, content: &str) -> Result<serde_json::Value, ReleaseError> {
    serde_json::from_str(content).map_err(|e| manifest_error(path, e))
}

fn manifest_error(path: &Path, reason: impl std::fmt::Display) -> ReleaseError {
    ReleaseError::ManifestFailed {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
