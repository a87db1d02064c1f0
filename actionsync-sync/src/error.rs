//! Error types for actionsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use actionsync_core::ConfigError;
use actionsync_renderer::RenderError;

use crate::report::ReportError;

/// All errors that can arise from generation and synchronization.
///
/// Git step failures box the underlying process error so the message keeps
/// the failing subcommand and exit status.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The git child process could not be started.
    #[error("failed to start `git {command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The git child process exited non-zero.
    #[error("`git {command}` exited with {}", exit_label(.code))]
    Command { command: String, code: Option<i32> },

    /// Reading the child's stdout failed mid-stream.
    #[error("failed to read output of `git {command}`: {source}")]
    Output {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git add for {path}: {source}")]
    Stage {
        path: PathBuf,
        #[source]
        source: Box<SyncError>,
    },

    #[error("git diff for {path}: {source}")]
    Diff {
        path: PathBuf,
        #[source]
        source: Box<SyncError>,
    },

    #[error("git reset: {0}")]
    Reset(#[source] Box<SyncError>),

    #[error("git add: {0}")]
    Add(#[source] Box<SyncError>),

    /// Includes the "nothing to commit" case.
    #[error("git commit: {0}")]
    Commit(#[source] Box<SyncError>),

    #[error("git pull rebase: {0}")]
    Rebase(#[source] Box<SyncError>),

    #[error("push failed {attempts} times: {source}")]
    PushExhausted {
        attempts: u32,
        #[source]
        source: Box<SyncError>,
    },

    #[error("git config: {0}")]
    Identity(#[source] Box<SyncError>),

    #[error("CI context has no branch to push to")]
    MissingBranch,

    #[error("report error: {0}")]
    Report(#[from] ReportError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_string(),
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
