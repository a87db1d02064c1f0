//! Mode dispatcher: decides what to do with the generated artifacts.
//!
//! | trigger       | in CI | action                                   |
//! |---------------|-------|------------------------------------------|
//! | any           | any   | no drift -> `NoChange`                   |
//! | push          | yes   | commit and push -> `Pushed`              |
//! | push          | no    | log and skip -> `NoChange`               |
//! | pull request  | any   | post review comment -> `Reported`        |
//! | other         | any   | log unsupported -> `NoChange`            |

use tracing::{info, warn};

use actionsync_core::{CandidateSet, CiContext, Identity, SyncOutcome, SyncSettings, TriggerKind};

use crate::error::SyncError;
use crate::git::Runner;
use crate::push::Synchronizer;
use crate::report::Reporter;
use crate::stage::{aggregate_diff, DiffReport};

/// Everything the dispatcher needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    pub identity: Identity,
    pub commit_message: String,
    pub remote: String,
    pub max_push_attempts: u32,
    /// API token for the review comment; `None` skips posting.
    pub credential: Option<String>,
}

impl DispatchConfig {
    pub fn from_settings(settings: &SyncSettings, credential: Option<String>) -> Self {
        Self {
            identity: settings.identity(),
            commit_message: settings.commit_message.clone(),
            remote: settings.remote.clone(),
            max_push_attempts: settings.max_push_attempts,
            credential: credential.filter(|c| !c.is_empty()),
        }
    }
}

pub struct Dispatcher<'a> {
    runner: &'a dyn Runner,
    ci: &'a dyn CiContext,
    reporter: &'a dyn Reporter,
    config: DispatchConfig,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        runner: &'a dyn Runner,
        ci: &'a dyn CiContext,
        reporter: &'a dyn Reporter,
        config: DispatchConfig,
    ) -> Self {
        Self {
            runner,
            ci,
            reporter,
            config,
        }
    }

    /// Diff `candidates` against HEAD and act on the drift per trigger.
    pub fn run(&self, candidates: &CandidateSet) -> Result<SyncOutcome, SyncError> {
        let report = aggregate_diff(self.runner, candidates)?;
        if report.is_empty() {
            info!("no changes in generated artifacts");
            return Ok(SyncOutcome::NoChange);
        }
        info!(files = report.files.len(), "generated artifacts differ from HEAD:\n{report}");

        self.configure_identity()?;

        match self.ci.trigger_kind() {
            TriggerKind::Push if self.ci.in_ci() => self.push(candidates),
            TriggerKind::Push => {
                info!("not running in CI, skipping commit stage");
                Ok(SyncOutcome::NoChange)
            }
            TriggerKind::PullRequest => self.report(&report),
            TriggerKind::Other(event) => {
                warn!(event = %event, "unsupported trigger, nothing to do");
                Ok(SyncOutcome::NoChange)
            }
        }
    }

    fn configure_identity(&self) -> Result<(), SyncError> {
        let Identity { name, email } = &self.config.identity;
        self.runner
            .run("config", &["user.name", name.as_str()])
            .map_err(|e| SyncError::Identity(Box::new(e)))?;
        self.runner
            .run("config", &["user.email", email.as_str()])
            .map_err(|e| SyncError::Identity(Box::new(e)))
    }

    fn push(&self, candidates: &CandidateSet) -> Result<SyncOutcome, SyncError> {
        let report = Synchronizer::new(self.runner, self.config.remote.as_str(), self.ci.branch())
            .max_attempts(self.config.max_push_attempts)
            .commit_and_push(candidates.paths(), &self.config.commit_message)?;
        info!(pushes = report.pushes, rebases = report.rebases, "pushed generated artifacts");
        Ok(SyncOutcome::Pushed)
    }

    fn report(&self, report: &DiffReport) -> Result<SyncOutcome, SyncError> {
        let label = &self.config.identity.name;
        let Some(credential) = self.config.credential.as_deref() else {
            info!("no API token configured, skipping review comment; set github-token to enable it");
            return Ok(SyncOutcome::Reported { posted: false });
        };
        let body = format!(
            "**{label}** will apply the following changes after this pull request is merged.\n\n{report}"
        );
        self.reporter.post_comment(credential, label, &body)?;
        Ok(SyncOutcome::Reported { posted: true })
    }
}
