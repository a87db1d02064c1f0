//! Template context: serializable rendering payload built from a [`Manifest`].

use std::collections::BTreeMap;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use actionsync_core::types::{ActionInput, Branding, EnvVar, Manifest};

use crate::error::RenderError;

/// Rendering payload shared by every artifact kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateContext {
    pub name: String,
    pub description: String,
    /// Directory of the program entry file, relative to the repository root
    /// and always prefixed with `./`.
    pub dir: String,
    pub inputs: BTreeMap<String, ActionInput>,
    pub env: BTreeMap<String, EnvVar>,
    pub branding: Branding,
    pub docker: DockerCtx,
    pub meta: MetaCtx,
}

/// Base images for the two Dockerfile stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerCtx {
    pub build_image: String,
    pub runtime_image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaCtx {
    pub actionsync_version: String,
}

impl TemplateContext {
    /// Build a [`TemplateContext`] for a manifest living under `root`.
    pub fn from_manifest(manifest: &Manifest, root: &Path) -> Self {
        TemplateContext {
            name: manifest.name.clone(),
            description: manifest.description.clone(),
            dir: relative_dir(&manifest.main, root),
            inputs: manifest.inputs.clone(),
            env: manifest.env.clone(),
            branding: manifest.branding.clone(),
            docker: DockerCtx {
                build_image: manifest.docker.build_image.clone(),
                runtime_image: manifest.docker.runtime_image.clone(),
            },
            meta: MetaCtx {
                actionsync_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

/// Containing directory of `main`, relative to `root`, in `./a/b` form.
///
/// Purely lexical: `main` may be relative to `root` or absolute under it.
/// The root itself maps to `./`.
pub fn relative_dir(main: &Path, root: &Path) -> String {
    let absolute = if main.is_absolute() {
        main.to_path_buf()
    } else {
        root.join(main)
    };
    let parent = absolute.parent().unwrap_or(root);
    let relative = parent.strip_prefix(root).unwrap_or(parent);

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();
    format!("./{}", parts.join("/"))
}
