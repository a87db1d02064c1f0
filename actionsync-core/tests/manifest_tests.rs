use std::fs;
use std::path::PathBuf;

use actionsync_core::{
    config::{self, Overrides},
    ConfigError,
};
use tempfile::TempDir;

const FULL: &str = r#"
name: goreadme
description: Updates readme from Go doc
main: ./cmd/goreadme/main.go
inputs:
  github-token:
    description: Github token for PR comments
  email:
    description: Email for commit message
    default: bot@example.com
    required: true
env:
  DEBUG:
    description: Enable debug logs
branding:
  icon: book-open
  color: blue
sync:
  name: goreadme
  email: bot@example.com
  commit_message: Update readme
  max_push_attempts: 5
"#;

fn write_manifest(content: &str) -> TempDir {
    let root = TempDir::new().expect("root");
    fs::write(config::manifest_path_at(root.path()), content).expect("write manifest");
    root
}

#[test]
fn full_manifest_loads_every_section() {
    let root = write_manifest(FULL);
    let manifest = config::load_at(root.path()).expect("load");

    assert_eq!(manifest.name, "goreadme");
    assert_eq!(manifest.main, PathBuf::from("./cmd/goreadme/main.go"));
    assert_eq!(manifest.inputs.len(), 2);
    let email = &manifest.inputs["email"];
    assert_eq!(email.default.as_deref(), Some("bot@example.com"));
    assert!(email.required);
    assert!(manifest.env.contains_key("DEBUG"));
    assert_eq!(manifest.branding.color.as_deref(), Some("blue"));
    assert_eq!(manifest.sync.max_push_attempts, 5);
    assert_eq!(manifest.sync.remote, "origin", "unset remote falls back to default");
}

#[test]
fn malformed_yaml_reports_path() {
    let root = write_manifest("name: [unterminated\n");
    let err = config::load_at(root.path()).expect_err("parse should fail");
    match err {
        ConfigError::Parse { path, .. } => {
            assert!(path.ends_with(config::MANIFEST_FILE));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn unknown_branding_color_rejected() {
    let root = write_manifest("name: x\nmain: main.go\nbranding:\n  color: pink\n");
    let err = config::load_at(root.path()).expect_err("invalid color");
    assert!(err.to_string().contains("pink"));
}

#[test]
fn color_override_is_validated() {
    let root = write_manifest(FULL);
    let manifest = config::load_at(root.path()).expect("load");
    let err = Overrides {
        color: Some("magenta".into()),
        ..Overrides::default()
    }
    .apply(manifest)
    .expect_err("override must be validated");
    assert!(matches!(err, ConfigError::Invalid(_)));
}
