//! `actionsync diff`: show the staged diff of every generated artifact.
//!
//! Each artifact is staged and unstaged again, so the index is left as it was.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use actionsync_sync::{aggregate_diff, DiffReport, Git};

use super::ManifestArgs;

#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let manifest = self.manifest.load()?;
        let generated = self.manifest.generate(&manifest)?;

        let git = Git::new(&self.manifest.root);
        let report = aggregate_diff(&git, &generated.candidates).context("failed to diff artifacts")?;

        if report.is_empty() {
            println!("No differences for '{}'.", manifest.name);
            return Ok(());
        }
        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &DiffReport) {
    for file in &report.files {
        println!("{}", format!("Path `{}`:", file.path.display()).bold());
        for line in file.diff.lines() {
            if line.starts_with("@@") {
                println!("{}", line.cyan());
            } else if line.starts_with('+') {
                println!("{}", line.green());
            } else if line.starts_with('-') {
                println!("{}", line.red());
            } else {
                println!("{line}");
            }
        }
        println!();
    }
}
