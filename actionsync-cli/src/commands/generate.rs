//! `actionsync generate`: render and write the action artifacts.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use actionsync_sync::{Generated, WriteResult};

use super::ManifestArgs;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,
}

impl GenerateArgs {
    pub fn run(self) -> Result<()> {
        let manifest = self.manifest.load()?;
        let generated = self.manifest.generate(&manifest)?;
        print_results(&manifest.name, &generated);
        Ok(())
    }
}

pub(crate) fn print_results(name: &str, generated: &Generated) {
    let written = generated.written();
    println!(
        "{} '{name}' generated ({written} written, {} unchanged)",
        "✓".green().bold(),
        generated.writes.len() - written
    );
    for w in &generated.writes {
        match w {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::Unchanged { path } => println!("  ·  {}", path.display()),
        }
    }
}
