//! Changelog line formats: header block, day headings and entry lines.

use chrono::NaiveDate;
use semver::Version;

use crate::label::IncrementDirective;
use crate::timeline::Event;

/// Fixed header block. Always exactly [`HEADER_LINES`] lines.
pub const CHANGELOG_HEADER: [&str; HEADER_LINES] = [
    "# Changelog",
    "",
    "All notable changes to this project, computed from merged pull requests and commits.",
    "Days are listed newest first; the top heading carries the current version.",
    "",
];

pub const HEADER_LINES: usize = 5;

const HEADING_PREFIX: &str = "## ";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Day heading, e.g. `## 2024-01-02 (version 1.1.1)`.
///
/// The date always occupies characters 3..13.
pub fn day_heading(day: NaiveDate, version: &Version) -> String {
    format!("{}{} (version {})", HEADING_PREFIX, day.format(DATE_FORMAT), version)
}

/// Date embedded in a day heading, if the line is one.
pub fn heading_date(line: &str) -> Option<NaiveDate> {
    if !line.starts_with(HEADING_PREFIX) {
        return None;
    }
    let date = line.get(HEADING_PREFIX.len()..HEADING_PREFIX.len() + 10)?;
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

/// Produces the text of a single changelog entry line.
pub trait EntryFormatter {
    fn format_entry(&self, version: &Version, event: &Event, directive: IncrementDirective)
    -> String;
}

/// `- 1.2.0 (minor) Add search (#12)` / `- 1.2.1 (patch) Fix typo (a1b2c3d)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEntryFormatter;

impl EntryFormatter for DefaultEntryFormatter {
    fn format_entry(
        &self,
        version: &Version,
        event: &Event,
        directive: IncrementDirective,
    ) -> String {
        let reference = match event {
            Event::PullRequest(pr) => format!("#{}", pr.number),
            Event::Commit(commit) => commit.short_hash().to_string(),
        };
        format!("- {} ({}) {} ({})", version, directive, event.title(), reference)
    }
}
