//! Release orchestration and its side effects.
//!
//! The [`Orchestrator`] makes decisions against a history source; the
//! pipelines apply them through git and the manifest file.

pub mod executor;
pub mod manifest;
pub mod orchestrator;
pub mod pipeline;

pub use executor::{CommandExecutor, GitActions, ShellExecutor};
pub use manifest::{ManifestKind, read_manifest_version, write_manifest_version};
pub use orchestrator::{
    Gate, IncrementOutcome, LatestChange, Orchestrator, RefreshOutcome, ReleasePlan,
};
pub use pipeline::{PipelineOptions, run_increment, run_refresh};
