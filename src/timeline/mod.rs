//! Chronological replay of release-relevant history.

pub mod builder;
pub mod event;
pub mod filter;

pub use builder::{TimelineBuilder, assemble};
pub use event::{CommitEvent, Event, EventId, PullRequestEvent};
pub use filter::is_release_artifact;

/// Events ordered by date, oldest first, with no duplicated PR or commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    events: Vec<Event>,
}

impl Timeline {
    /// Order events by date, oldest first.
    ///
    /// The sort is stable: events with equal timestamps keep their input order.
    pub fn from_events(mut events: Vec<Event>) -> Self {
        events.sort_by_key(Event::date);
        Self { events }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Most recent event.
    pub fn latest(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
