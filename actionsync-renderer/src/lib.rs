//! # actionsync-renderer
//!
//! Renders the canonical action artifacts (`action.yml`, `Dockerfile`) from an
//! actionsync manifest.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use actionsync_core::config;
//! use actionsync_renderer::{ArtifactKind, Renderer, TemplateContext};
//!
//! fn render_all(root: &Path) {
//!     let manifest = config::load_at(root).expect("manifest");
//!     let ctx = TemplateContext::from_manifest(&manifest, root);
//!     let renderer = Renderer::new(None).expect("renderer");
//!     for kind in ArtifactKind::all() {
//!         let (path, content) = renderer.render(&ctx, *kind).expect("render");
//!         println!("{}: {} bytes", path.display(), content.len());
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::TemplateContext;
pub use engine::{ArtifactKind, Renderer};
pub use error::RenderError;
