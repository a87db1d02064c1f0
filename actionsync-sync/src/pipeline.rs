//! Generation entrypoint shared by the `generate`, `diff` and `run` commands.

use std::path::Path;

use actionsync_core::{CandidateSet, Manifest};
use actionsync_renderer::{Renderer, TemplateContext};

use crate::error::SyncError;
use crate::writer::{atomic_write, WriteResult};

/// What one generation pass produced.
#[derive(Debug)]
pub struct Generated {
    pub writes: Vec<WriteResult>,
    /// Every artifact path, relative to the root, whether rewritten or not.
    pub candidates: CandidateSet,
}

impl Generated {
    pub fn written(&self) -> usize {
        self.writes
            .iter()
            .filter(|w| matches!(w, WriteResult::Written { .. }))
            .count()
    }
}

/// Render every artifact for `manifest` and write it under `root`.
///
/// Unchanged artifacts are still candidates: the committed copy may differ
/// from the working tree even when this pass wrote nothing.
pub fn generate(
    root: &Path,
    manifest: &Manifest,
    templates: Option<&Path>,
) -> Result<Generated, SyncError> {
    let renderer = Renderer::new(templates)?;
    let ctx = TemplateContext::from_manifest(manifest, root);

    let mut writes = Vec::new();
    let mut candidates = Vec::new();
    for (relative, content) in renderer.render_all(&ctx)? {
        writes.push(atomic_write(&root.join(&relative), &content)?);
        candidates.push(relative);
    }

    Ok(Generated {
        writes,
        candidates: CandidateSet::new(candidates),
    })
}
