//! Rendering engine: [`ArtifactKind`] enum and [`Renderer`].
//!
//! # Path mapping
//!
//! | Artifact   | Output path  | Source                              |
//! |------------|--------------|-------------------------------------|
//! | Action     | `action.yml` | YAML serialisation of the metadata  |
//! | Dockerfile | `Dockerfile` | `dockerfile.tera` (user-overridable)|

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::Tera;

use actionsync_core::types::{ActionInput, Branding};

use crate::context::TemplateContext;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[("dockerfile.tera", include_str!("templates/Dockerfile.tera"))];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    let mut templates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((normalize_template_name(rel), contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(normalize_template_name(Path::new(name)), (*content).to_string());
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// ArtifactKind
// ---------------------------------------------------------------------------

/// Every generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Action,
    Dockerfile,
}

impl ArtifactKind {
    /// All artifact variants in a stable order.
    pub fn all() -> &'static [ArtifactKind] {
        &[ArtifactKind::Action, ArtifactKind::Dockerfile]
    }

    /// Output path relative to the repository root.
    pub fn output_path(&self) -> PathBuf {
        match self {
            ArtifactKind::Action => PathBuf::from("action.yml"),
            ArtifactKind::Dockerfile => PathBuf::from("Dockerfile"),
        }
    }
}

// ---------------------------------------------------------------------------
// action.yml metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ActionMetadata<'a> {
    name: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    inputs: &'a BTreeMap<String, ActionInput>,
    runs: Runs,
    #[serde(skip_serializing_if = "Branding::is_empty")]
    branding: &'a Branding,
}

#[derive(Debug, Serialize)]
struct Runs {
    using: &'static str,
    image: &'static str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    env: BTreeMap<String, String>,
}

fn render_action(ctx: &TemplateContext) -> Result<String, RenderError> {
    let env = ctx
        .env
        .iter()
        .map(|(name, var)| (name.clone(), var.default.clone().unwrap_or_default()))
        .collect();
    let metadata = ActionMetadata {
        name: &ctx.name,
        description: &ctx.description,
        inputs: &ctx.inputs,
        runs: Runs {
            using: "docker",
            image: "Dockerfile",
            env,
        },
        branding: &ctx.branding,
    };
    Ok(serde_yaml::to_string(&metadata)?)
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renders every [`ArtifactKind`]. Create once with [`Renderer::new`] and reuse.
///
/// `user_template_dir` may contain `.tera` files that override embedded
/// defaults. Template names are normalised to lowercase relative paths.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(Renderer {
            tera: build_tera(user_template_dir)?,
        })
    }

    /// Render one artifact. Returns `(relative_output_path, content)`.
    pub fn render(
        &self,
        ctx: &TemplateContext,
        kind: ArtifactKind,
    ) -> Result<(PathBuf, String), RenderError> {
        let content = match kind {
            ArtifactKind::Action => render_action(ctx)?,
            ArtifactKind::Dockerfile => {
                self.tera.render("dockerfile.tera", &ctx.to_tera_context()?)?
            }
        };
        Ok((kind.output_path(), content))
    }

    /// Render all artifacts in [`ArtifactKind::all`] order.
    pub fn render_all(&self, ctx: &TemplateContext) -> Result<Vec<(PathBuf, String)>, RenderError> {
        ArtifactKind::all()
            .iter()
            .map(|kind| self.render(ctx, *kind))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
