//! Domain types for actionsync.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Manifest types are serializable/deserializable via serde + serde_yaml.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The category of CI event that triggered this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerKind {
    /// A direct push to a branch.
    Push,
    /// A pull request event (including `pull_request_target`).
    PullRequest,
    /// Any other event; carries the raw event name for logging.
    Other(String),
}

impl TriggerKind {
    /// Map a GitHub Actions event name onto a trigger kind.
    pub fn from_event_name(name: &str) -> Self {
        match name {
            "push" => TriggerKind::Push,
            "pull_request" | "pull_request_target" => TriggerKind::PullRequest,
            other => TriggerKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::Push => write!(f, "push"),
            TriggerKind::PullRequest => write!(f, "pull-request"),
            TriggerKind::Other(name) if name.is_empty() => write!(f, "unknown"),
            TriggerKind::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Terminal result of one synchronization run.
///
/// A failed run is the `Err` arm of the dispatcher's `Result`, so it has no
/// variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Committed artifacts already match, or the context forbids writing.
    NoChange,
    /// The drift was committed and pushed to the remote branch.
    Pushed,
    /// The drift was reported for review. `posted` is false when no
    /// credential was configured and the comment was skipped.
    Reported { posted: bool },
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::NoChange => write!(f, "no-change"),
            SyncOutcome::Pushed => write!(f, "pushed"),
            SyncOutcome::Reported { posted: true } => write!(f, "reported"),
            SyncOutcome::Reported { posted: false } => write!(f, "reported (skipped)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Candidate artifacts
// ---------------------------------------------------------------------------

/// Ordered set of relative paths the generator just wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet(Vec<PathBuf>);

impl CandidateSet {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self(paths)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<PathBuf> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Committer identity configured before any write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// A single `with:` input of the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ActionInput {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
}

/// An environment variable the action reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EnvVar {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// Marketplace branding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Branding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Branding {
    pub fn is_empty(&self) -> bool {
        self.icon.is_none() && self.color.is_none()
    }
}

/// Settings for the commit/push/report stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Committer name, also used as the review comment label.
    pub name: String,
    pub email: String,
    pub commit_message: String,
    /// Total push attempts before giving up.
    pub max_push_attempts: u32,
    pub remote: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            name: "actionsync".to_string(),
            email: "actionsync@users.noreply.github.com".to_string(),
            commit_message: "Update action files".to_string(),
            max_push_attempts: 3,
            remote: "origin".to_string(),
        }
    }
}

impl SyncSettings {
    pub fn identity(&self) -> Identity {
        Identity {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Images used by the generated Dockerfile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerSettings {
    pub build_image: String,
    pub runtime_image: String,
}

impl Default for DockerSettings {
    fn default() -> Self {
        Self {
            build_image: "golang:1.22-alpine".to_string(),
            runtime_image: "alpine:3.19".to_string(),
        }
    }
}

/// Root of `actionsync.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Program entry file; its directory is what the Dockerfile builds.
    pub main: PathBuf,
    #[serde(default)]
    pub inputs: BTreeMap<String, ActionInput>,
    #[serde(default)]
    pub env: BTreeMap<String, EnvVar>,
    #[serde(default)]
    pub branding: Branding,
    #[serde(default)]
    pub docker: DockerSettings,
    #[serde(default)]
    pub sync: SyncSettings,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_kind_display() {
        assert_eq!(TriggerKind::Push.to_string(), "push");
        assert_eq!(TriggerKind::PullRequest.to_string(), "pull-request");
        assert_eq!(TriggerKind::Other("schedule".into()).to_string(), "schedule");
        assert_eq!(TriggerKind::Other(String::new()).to_string(), "unknown");
    }

    #[test]
    fn outcome_display() {
        assert_eq!(SyncOutcome::Pushed.to_string(), "pushed");
        assert_eq!(
            SyncOutcome::Reported { posted: false }.to_string(),
            "reported (skipped)"
        );
    }

    #[test]
    fn candidate_set_preserves_order() {
        let set: CandidateSet = ["action.yml", "Dockerfile"]
            .into_iter()
            .map(PathBuf::from)
            .collect();
        let names: Vec<_> = set.iter().map(|p| p.display().to_string()).collect();
        assert_eq!(names, vec!["action.yml", "Dockerfile"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn sync_settings_fill_missing_fields_with_defaults() {
        let settings: SyncSettings =
            serde_yaml::from_str("email: bot@example.com\n").expect("parse");
        assert_eq!(settings.email, "bot@example.com");
        assert_eq!(settings.max_push_attempts, 3);
        assert_eq!(settings.remote, "origin");
        assert_eq!(settings.identity().name, "actionsync");
    }
}
