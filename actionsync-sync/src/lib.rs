//! # actionsync-sync
//!
//! Change detection and synchronization of generated action artifacts.
//!
//! [`generate`] renders and atomically writes the artifacts, then a
//! [`Dispatcher`] diffs them against HEAD through a [`Runner`] and either
//! commits and pushes ([`Synchronizer`]), posts a review comment
//! ([`Reporter`]) or does nothing, depending on the CI trigger.

pub mod dispatch;
pub mod error;
pub mod git;
pub mod pipeline;
pub mod push;
pub mod report;
pub mod stage;
pub mod writer;

#[cfg(test)]
mod fakes;

pub use dispatch::{DispatchConfig, Dispatcher};
pub use error::SyncError;
pub use git::{Git, Runner};
pub use pipeline::{generate, Generated};
pub use push::{PushReport, Synchronizer, DEFAULT_MAX_PUSH_ATTEMPTS};
pub use report::{GithubReporter, ReportError, Reporter};
pub use stage::{aggregate_diff, stage_and_diff, DiffReport, FileDiff, IndexEntry, StagedPath};
pub use writer::{atomic_write, WriteResult};
