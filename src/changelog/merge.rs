//! Splice a single new entry into an existing changelog.
//!
//! This works on fixed line offsets: it assumes the 5-line header and the
//! day-heading layout that [`ChangelogRenderer`](super::ChangelogRenderer)
//! produces. Hand-edited documents with a different shape are not supported.

use chrono::NaiveDate;
use semver::Version;

use crate::error::ChangelogError;
use crate::label::IncrementDirective;
use crate::timeline::Event;

use super::format::{EntryFormatter, HEADER_LINES, day_heading, heading_date};

/// The entry being released.
#[derive(Debug, Clone, Copy)]
pub struct NewEntry<'a> {
    pub version: &'a Version,
    pub event: &'a Event,
    pub directive: IncrementDirective,
}

/// Merge `entry` into `existing`, opening a section for `today` if needed.
///
/// If the top day heading is already dated `today`, the entry joins that
/// section and the heading is rewritten with the new version. Otherwise a new
/// section is opened above the previous one, which is kept verbatim.
pub fn merge(
    existing: &[String],
    entry: NewEntry<'_>,
    today: NaiveDate,
    formatter: &dyn EntryFormatter,
) -> Result<Vec<String>, ChangelogError> {
    if existing.len() < HEADER_LINES {
        return Err(ChangelogError::NoExistingChangelog);
    }

    let mut merged = Vec::with_capacity(existing.len() + 4);
    merged.extend_from_slice(&existing[..HEADER_LINES]);
    merged.push(day_heading(today, entry.version));
    merged.push(String::new());
    merged.push(formatter.format_entry(entry.version, entry.event, entry.directive));

    let top_heading = existing.get(HEADER_LINES);
    let same_day = top_heading.and_then(|line| heading_date(line)) == Some(today);

    if same_day {
        // Skip the old heading and its blank line; keep today's entries.
        merged.extend(existing.iter().skip(HEADER_LINES + 2).cloned());
    } else if top_heading.is_some() {
        merged.push(String::new());
        merged.extend_from_slice(&existing[HEADER_LINES..]);
    }

    Ok(merged)
}
