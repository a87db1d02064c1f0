pub mod diff;
pub mod generate;
pub mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use actionsync_core::{config, config::Overrides, Manifest};
use actionsync_sync::{pipeline, Generated};

/// Flags shared by every command that renders artifacts.
#[derive(Args, Debug, Clone)]
pub struct ManifestArgs {
    /// Repository root; artifacts are written and diffed here.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Manifest file (default: `<root>/actionsync.yaml`).
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Override the action name.
    #[arg(long, env = "INPUT_NAME")]
    pub name: Option<String>,

    /// Override the action description.
    #[arg(long, env = "INPUT_DESC")]
    pub desc: Option<String>,

    /// Override the branding icon.
    #[arg(long, env = "INPUT_ICON")]
    pub icon: Option<String>,

    /// Override the branding color.
    #[arg(long, env = "INPUT_COLOR")]
    pub color: Option<String>,

    /// Directory with a user `Dockerfile.tera` overriding the built-in one.
    #[arg(long)]
    pub templates: Option<PathBuf>,
}

impl ManifestArgs {
    pub fn load(&self) -> Result<Manifest> {
        let path = self
            .manifest
            .clone()
            .unwrap_or_else(|| config::manifest_path_at(&self.root));
        let manifest = config::load_from(&path)
            .with_context(|| format!("failed to load manifest {}", path.display()))?;
        Overrides {
            name: self.name.clone(),
            description: self.desc.clone(),
            icon: self.icon.clone(),
            color: self.color.clone(),
        }
        .apply(manifest)
        .context("invalid manifest overrides")
    }

    pub fn generate(&self, manifest: &Manifest) -> Result<Generated> {
        pipeline::generate(&self.root, manifest, self.templates.as_deref())
            .context("failed to generate action artifacts")
    }
}
