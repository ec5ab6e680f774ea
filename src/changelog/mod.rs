//! Changelog rendering, merging and file I/O.

pub mod format;
pub mod merge;
pub mod render;
pub mod writer;

pub use format::{CHANGELOG_HEADER, DefaultEntryFormatter, EntryFormatter, HEADER_LINES};
pub use merge::{NewEntry, merge};
pub use render::ChangelogRenderer;
pub use writer::{read_changelog, write_changelog};
