//! `actionsync.yaml` manifest loading.
//!
//! # Storage layout
//!
//! ```text
//! <repo root>/
//!   actionsync.yaml   (manifest, committed alongside the action sources)
//!   action.yml        (generated)
//!   Dockerfile        (generated)
//! ```
//!
//! # API pattern
//!
//! - `load_at(root)`: resolves `<root>/actionsync.yaml`
//! - `load_from(path)`: explicit manifest path (CLI `--manifest`)

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, ConfigError};
use crate::types::Manifest;

/// Default manifest file name.
pub const MANIFEST_FILE: &str = "actionsync.yaml";

/// Colors accepted by the GitHub Marketplace for `branding.color`.
pub const BRANDING_COLORS: &[&str] = &[
    "white",
    "yellow",
    "blue",
    "green",
    "orange",
    "red",
    "purple",
    "gray-dark",
];

/// `<root>/actionsync.yaml`: pure, no I/O.
pub fn manifest_path_at(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

/// Load and validate the manifest under `root`.
pub fn load_at(root: &Path) -> Result<Manifest, ConfigError> {
    load_from(&manifest_path_at(root))
}

/// Load and validate the manifest at an explicit path.
pub fn load_from(path: &Path) -> Result<Manifest, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(err) => return Err(io_err(path, err)),
    };
    let manifest: Manifest = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&manifest)?;
    Ok(manifest)
}

/// Reject manifests the generator cannot render.
pub fn validate(manifest: &Manifest) -> Result<(), ConfigError> {
    if manifest.name.trim().is_empty() {
        return Err(ConfigError::Invalid("`name` must not be empty".to_string()));
    }
    if manifest.main.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("`main` must not be empty".to_string()));
    }
    if let Some(color) = manifest.branding.color.as_deref() {
        if !BRANDING_COLORS.contains(&color) {
            return Err(ConfigError::Invalid(format!(
                "unknown branding color '{color}'; expected one of: {}",
                BRANDING_COLORS.join(", ")
            )));
        }
    }
    if manifest.sync.max_push_attempts == 0 {
        return Err(ConfigError::Invalid(
            "`sync.max_push_attempts` must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Command-line overrides applied on top of the manifest.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl Overrides {
    /// Apply non-empty overrides and re-validate.
    pub fn apply(self, mut manifest: Manifest) -> Result<Manifest, ConfigError> {
        if let Some(name) = self.name.filter(|s| !s.is_empty()) {
            manifest.name = name;
        }
        if let Some(desc) = self.description.filter(|s| !s.is_empty()) {
            manifest.description = desc;
        }
        if let Some(icon) = self.icon.filter(|s| !s.is_empty()) {
            manifest.branding.icon = Some(icon);
        }
        if let Some(color) = self.color.filter(|s| !s.is_empty()) {
            manifest.branding.color = Some(color);
        }
        validate(&manifest)?;
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINIMAL: &str = "name: lint\nmain: cmd/lint/main.go\n";

    #[test]
    fn missing_manifest_is_not_found() {
        let root = TempDir::new().unwrap();
        let err = load_at(root.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn minimal_manifest_loads_with_defaults() {
        let root = TempDir::new().unwrap();
        std::fs::write(manifest_path_at(root.path()), MINIMAL).unwrap();
        let manifest = load_at(root.path()).expect("load");
        assert_eq!(manifest.name, "lint");
        assert!(manifest.inputs.is_empty());
        assert!(manifest.branding.is_empty());
        assert_eq!(manifest.sync.commit_message, "Update action files");
    }

    #[test]
    fn overrides_replace_only_non_empty_values() {
        let manifest: Manifest = serde_yaml::from_str(MINIMAL).unwrap();
        let out = Overrides {
            name: Some(String::new()),
            description: Some("Runs the linter".into()),
            icon: Some("check".into()),
            color: None,
        }
        .apply(manifest)
        .expect("apply");
        assert_eq!(out.name, "lint");
        assert_eq!(out.description, "Runs the linter");
        assert_eq!(out.branding.icon.as_deref(), Some("check"));
        assert!(out.branding.color.is_none());
    }

    #[test]
    fn zero_push_attempts_rejected() {
        let mut manifest: Manifest = serde_yaml::from_str(MINIMAL).unwrap();
        manifest.sync.max_push_attempts = 0;
        assert!(matches!(validate(&manifest), Err(ConfigError::Invalid(_))));
    }
}
