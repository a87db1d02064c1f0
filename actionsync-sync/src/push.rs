//! Commit-push synchronizer.
//!
//! ## `commit_and_push`: one atomic publish attempt
//!
//! 1. `git reset`: start from an empty index whatever the caller left behind.
//! 2. `git add -- <paths>`.
//! 3. `git commit -m <message>`: nothing staged is a fatal commit error.
//! 4. Push-retry state machine:
//!
//! ```text
//!   Attempting(n) --push ok--------------------------> Succeeded
//!   Attempting(n) --push rejected, n == max----------> Exhausted
//!   Attempting(n) --push rejected, n <  max----------> ConflictRecovery(n)
//!   ConflictRecovery(n) --pull --rebase ok-----------> Attempting(n + 1)
//!   ConflictRecovery(n) --pull --rebase failed-------> fatal, no further push
//! ```
//!
//! Steps 1 to 3 abort before anything reaches the remote.

use std::path::Path;

use tracing::{info, warn};

use crate::error::SyncError;
use crate::git::Runner;

/// Default number of push attempts, rebases in between included.
pub const DEFAULT_MAX_PUSH_ATTEMPTS: u32 = 3;

/// States of the push-retry loop.
#[derive(Debug)]
pub enum PushState {
    Attempting { attempt: u32 },
    ConflictRecovery { attempt: u32 },
    Succeeded { attempts: u32 },
    Exhausted { attempts: u32, last_error: SyncError },
}

/// What a successful publish took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushReport {
    pub pushes: u32,
    pub rebases: u32,
}

/// Commits paths and pushes `HEAD:<branch>` to a single remote.
pub struct Synchronizer<'a> {
    runner: &'a dyn Runner,
    remote: String,
    branch: String,
    max_attempts: u32,
}

impl<'a> Synchronizer<'a> {
    pub fn new(runner: &'a dyn Runner, remote: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            runner,
            remote: remote.into(),
            branch: branch.into(),
            max_attempts: DEFAULT_MAX_PUSH_ATTEMPTS,
        }
    }

    /// Total push attempts before giving up; clamped to at least one.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Commit exactly `paths` with `message`, then push with rebase retries.
    pub fn commit_and_push<P: AsRef<Path>>(
        &self,
        paths: &[P],
        message: &str,
    ) -> Result<PushReport, SyncError> {
        if self.branch.is_empty() {
            return Err(SyncError::MissingBranch);
        }

        self.runner
            .run("reset", &["--quiet"])
            .map_err(|e| SyncError::Reset(Box::new(e)))?;

        let owned: Vec<String> = paths
            .iter()
            .map(|p| p.as_ref().to_string_lossy().into_owned())
            .collect();
        let mut add_args = vec!["--"];
        add_args.extend(owned.iter().map(String::as_str));
        self.runner
            .run("add", &add_args)
            .map_err(|e| SyncError::Add(Box::new(e)))?;

        self.runner
            .run("commit", &["-m", message])
            .map_err(|e| SyncError::Commit(Box::new(e)))?;

        self.push_with_retry()
    }

    fn push_with_retry(&self) -> Result<PushReport, SyncError> {
        let refspec = format!("HEAD:{}", self.branch);
        let mut rebases = 0;
        let mut state = PushState::Attempting { attempt: 1 };

        loop {
            state = match state {
                PushState::Attempting { attempt } => {
                    info!(attempt, max = self.max_attempts, branch = %self.branch, "pushing");
                    match self.runner.run("push", &[self.remote.as_str(), refspec.as_str()]) {
                        Ok(()) => PushState::Succeeded { attempts: attempt },
                        Err(err) if attempt >= self.max_attempts => PushState::Exhausted {
                            attempts: attempt,
                            last_error: err,
                        },
                        Err(err) => {
                            warn!(attempt, error = %err, "push failed, rebasing and trying again");
                            PushState::ConflictRecovery { attempt }
                        }
                    }
                }
                PushState::ConflictRecovery { attempt } => {
                    self.runner
                        .run(
                            "pull",
                            &["--rebase", "--autostash", self.remote.as_str(), self.branch.as_str()],
                        )
                        .map_err(|e| SyncError::Rebase(Box::new(e)))?;
                    rebases += 1;
                    PushState::Attempting {
                        attempt: attempt + 1,
                    }
                }
                PushState::Succeeded { attempts } => {
                    info!(attempts, rebases, "push succeeded");
                    return Ok(PushReport {
                        pushes: attempts,
                        rebases,
                    });
                }
                PushState::Exhausted {
                    attempts,
                    last_error,
                } => {
                    warn!(attempts, "push retry limit exceeded");
                    return Err(SyncError::PushExhausted {
                        attempts,
                        source: Box::new(last_error),
                    });
                }
            };
        }
    }
}
