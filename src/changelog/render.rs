//! Render the full changelog from a timeline.

use semver::Version;

use crate::label::{IncrementDirective, LabelRules};
use crate::timeline::Timeline;
use crate::version::replay;

use super::format::{CHANGELOG_HEADER, EntryFormatter, day_heading};

/// Turns a timeline into changelog lines, grouped by day, newest first.
pub struct ChangelogRenderer<'a> {
    rules: &'a LabelRules,
    fallback: IncrementDirective,
    formatter: &'a dyn EntryFormatter,
}

impl<'a> ChangelogRenderer<'a> {
    pub fn new(
        rules: &'a LabelRules,
        fallback: IncrementDirective,
        formatter: &'a dyn EntryFormatter,
    ) -> Self {
        Self {
            rules,
            fallback,
            formatter,
        }
    }

    /// Render the document.
    ///
    /// Lines are built oldest-first, with each day's heading emitted after that
    /// day's entries and the header emitted last, then the whole list is
    /// reversed. The top day heading carries the final version.
    pub fn render(&self, timeline: &Timeline, start: &Version) -> Vec<String> {
        let steps = replay(timeline, start, self.rules, self.fallback);
        let mut lines = Vec::with_capacity(steps.len() * 2 + CHANGELOG_HEADER.len());

        let mut open_day = None;
        let mut version = start.clone();

        for step in &steps {
            let day = step.event.date().date_naive();

            if let Some(previous) = open_day
                && previous != day
            {
                lines.push(String::new());
                lines.push(day_heading(previous, &version));
                lines.push(String::new());
            }

            lines.push(
                self.formatter
                    .format_entry(&step.version, step.event, step.directive),
            );
            open_day = Some(day);
            version = step.version.clone();
        }

        // Current version section, dated with the last event's day.
        if let Some(last_day) = open_day {
            lines.push(String::new());
            lines.push(day_heading(last_day, &version));
        }

        lines.extend(CHANGELOG_HEADER.iter().rev().map(|line| line.to_string()));
        lines.reverse();
        lines
    }
}
