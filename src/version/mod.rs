//! Version arithmetic and full-history reduction.

pub mod bump;
pub mod reduce;

pub use bump::{bump, parse_version};
pub use reduce::{VersionStep, reduce, replay};
