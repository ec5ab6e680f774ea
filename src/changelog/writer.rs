//! Read and write changelog files.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ChangelogError;

/// Read a changelog into lines.
///
/// A missing or empty file is [`ChangelogError::NoExistingChangelog`].
pub fn read_changelog(path: &Path) -> Result<Vec<String>, ChangelogError> {
    if !path.exists() {
        return Err(ChangelogError::NoExistingChangelog);
    }

    let content = std::fs::read_to_string(path).map_err(ChangelogError::ReadFailed)?;
    if content.trim().is_empty() {
        return Err(ChangelogError::NoExistingChangelog);
    }

    Ok(content.lines().map(str::to_string).collect())
}

/// Write changelog lines to a file.
///
/// - Backs up an existing file to `<filename>.md.bak` (e.g., `CHANGELOG.md.bak`)
/// - Writes through a temp file in the same directory and renames it into place
pub fn write_changelog(path: &Path, lines: &[String]) -> Result<(), ChangelogError> {
    if path.exists() {
        let backup_path = path.with_extension("md.bak");
        std::fs::copy(path, &backup_path).map_err(ChangelogError::BackupFailed)?;
        debug!(backup = %backup_path.display(), "Backed up changelog");
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(ChangelogError::WriteFailed)?;
    file.write_all(render_document(lines).as_bytes())
        .map_err(ChangelogError::WriteFailed)?;
    file.persist(path)
        .map_err(|e| ChangelogError::WriteFailed(e.error))?;

    Ok(())
}

/// Join lines into file content with a trailing newline.
pub fn render_document(lines: &[String]) -> String {
    let mut content = lines.join("\n");
    content.push('\n');
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_no_existing_changelog() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_changelog(&dir.path().join("CHANGELOG.md"));
        assert!(matches!(result, Err(ChangelogError::NoExistingChangelog)));
    }

    #[test]
    fn test_empty_file_is_no_existing_changelog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        std::fs::write(&path, "\n\n").unwrap();
        assert!(matches!(read_changelog(&path), Err(ChangelogError::NoExistingChangelog)));
    }

    #[test]
    fn test_write_then_read_preserves_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        let lines: Vec<String> = ["# Changelog", "", "text", "", "", "## 2024-01-01 (version 1.0.0)"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        write_changelog(&path, &lines).unwrap();
        assert_eq!(read_changelog(&path).unwrap(), lines);
    }

    #[test]
    fn test_write_creates_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        std::fs::write(&path, "old content\n").unwrap();

        write_changelog(&path, &["new content".to_string()]).unwrap();

        let backup = std::fs::read_to_string(dir.path().join("CHANGELOG.md.bak")).unwrap();
        assert_eq!(backup, "old content\n");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new content\n");
    }
}
