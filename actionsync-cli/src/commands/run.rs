//! `actionsync run`: generate, then commit and push, report, or skip
//! according to the CI trigger.

use anyhow::{Context, Result};
use clap::Args;

use actionsync_core::EnvCiContext;
use actionsync_sync::{DispatchConfig, Dispatcher, Git, GithubReporter};

use super::generate::print_results;
use super::ManifestArgs;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Committer email; overrides `sync.email` in the manifest.
    #[arg(long, env = "INPUT_EMAIL")]
    pub email: Option<String>,

    /// Token used to post the review comment on pull requests.
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let manifest = self.manifest.load()?;
        let generated = self.manifest.generate(&manifest)?;
        print_results(&manifest.name, &generated);

        let ci = EnvCiContext::from_env().context("failed to read CI environment")?;
        tracing::info!(trigger = %ci.event_name, branch = %ci.branch, in_ci = ci.in_ci, "dispatching");

        let mut settings = manifest.sync.clone();
        if let Some(email) = self.email.filter(|e| !e.is_empty()) {
            settings.email = email;
        }
        let credential = resolve_token(self.github_token, std::env::var("GITHUB_TOKEN").ok());
        let config = DispatchConfig::from_settings(&settings, credential);

        let git = Git::new(&self.manifest.root);
        let reporter = GithubReporter::from_context(&ci);
        match Dispatcher::new(&git, &ci, &reporter, config).run(&generated.candidates) {
            Ok(outcome) => {
                println!("outcome: {outcome}");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "synchronization failed");
                Err(err).context("synchronization failed")
            }
        }
    }
}

/// First non-empty token: the flag or `INPUT_GITHUB_TOKEN`, then `GITHUB_TOKEN`.
fn resolve_token(input: Option<String>, fallback: Option<String>) -> Option<String> {
    input
        .filter(|t| !t.is_empty())
        .or_else(|| fallback.filter(|t| !t.is_empty()))
}
