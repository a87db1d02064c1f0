//! CI context: which branch, which trigger, whether we run inside CI at all.
//!
//! The engine only ever reads these facts through [`CiContext`]. The shipped
//! reader, [`EnvCiContext`], understands GitHub Actions variables and is built
//! from any key lookup so tests never touch the process environment.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{io_err, ConfigError};
use crate::types::TriggerKind;

/// Default GitHub REST endpoint when `GITHUB_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Read-only CI facts consumed by the dispatcher.
pub trait CiContext {
    /// Branch the run belongs to (push target or pull-request head).
    fn branch(&self) -> &str;
    fn trigger_kind(&self) -> TriggerKind;
    fn in_ci(&self) -> bool;
}

/// GitHub Actions environment snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvCiContext {
    pub in_ci: bool,
    pub event_name: String,
    pub branch: String,
    /// `owner/name`, from `GITHUB_REPOSITORY`.
    pub repository: Option<String>,
    pub api_url: String,
    /// Pull-request number, from the event payload.
    pub pr_number: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(default)]
    number: Option<u64>,
    #[serde(default)]
    pull_request: Option<PullRequestPayload>,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
}

impl EnvCiContext {
    /// Snapshot the current process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary lookup (e.g. a `HashMap` in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let in_ci = get("CI").is_some_and(|v| v.eq_ignore_ascii_case("true"));
        let event_name = get("GITHUB_EVENT_NAME").unwrap_or_default();
        let trigger = TriggerKind::from_event_name(&event_name);

        let branch = match (&trigger, get("GITHUB_HEAD_REF")) {
            (TriggerKind::PullRequest, Some(head)) => head,
            _ => get("GITHUB_REF")
                .map(|r| r.strip_prefix("refs/heads/").unwrap_or(&r).to_string())
                .unwrap_or_default(),
        };

        // Only pull-request runs need the payload.
        let pr_number = match (&trigger, get("GITHUB_EVENT_PATH")) {
            (TriggerKind::PullRequest, Some(path)) => read_pr_number(PathBuf::from(path))?,
            _ => None,
        };

        Ok(Self {
            in_ci,
            event_name,
            branch,
            repository: get("GITHUB_REPOSITORY"),
            api_url: get("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            pr_number,
        })
    }
}

fn read_pr_number(path: PathBuf) -> Result<Option<u64>, ConfigError> {
    let raw = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let payload: EventPayload =
        serde_json::from_str(&raw).map_err(|source| ConfigError::Event { path, source })?;
    Ok(payload.pull_request.map(|pr| pr.number).or(payload.number))
}

impl CiContext for EnvCiContext {
    fn branch(&self) -> &str {
        &self.branch
    }

    fn trigger_kind(&self) -> TriggerKind {
        TriggerKind::from_event_name(&self.event_name)
    }

    fn in_ci(&self) -> bool {
        self.in_ci
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn ctx(pairs: &[(&str, &str)]) -> EnvCiContext {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvCiContext::from_lookup(|k| env.get(k).cloned()).expect("ctx")
    }

    #[rstest]
    #[case("push", TriggerKind::Push)]
    #[case("pull_request", TriggerKind::PullRequest)]
    #[case("pull_request_target", TriggerKind::PullRequest)]
    #[case("schedule", TriggerKind::Other("schedule".into()))]
    fn event_name_maps_to_trigger(#[case] event: &str, #[case] expected: TriggerKind) {
        let c = ctx(&[("GITHUB_EVENT_NAME", event)]);
        assert_eq!(c.trigger_kind(), expected);
    }

    #[test]
    fn push_branch_strips_heads_prefix() {
        let c = ctx(&[
            ("CI", "true"),
            ("GITHUB_EVENT_NAME", "push"),
            ("GITHUB_REF", "refs/heads/main"),
            ("GITHUB_HEAD_REF", "ignored"),
        ]);
        assert!(c.in_ci());
        assert_eq!(c.branch(), "main");
    }

    #[test]
    fn pull_request_branch_uses_head_ref() {
        let c = ctx(&[
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_REF", "refs/pull/7/merge"),
            ("GITHUB_HEAD_REF", "feature/x"),
        ]);
        assert_eq!(c.branch(), "feature/x");
        assert!(!c.in_ci());
    }

    #[test]
    fn empty_environment_defaults() {
        let c = ctx(&[]);
        assert!(!c.in_ci);
        assert_eq!(c.branch, "");
        assert_eq!(c.api_url, DEFAULT_API_URL);
        assert_eq!(c.trigger_kind(), TriggerKind::Other(String::new()));
    }

    #[test]
    fn pr_number_read_from_event_payload() {
        let dir = TempDir::new().unwrap();
        let event = dir.path().join("event.json");
        std::fs::write(&event, r#"{"action":"opened","pull_request":{"number":42}}"#).unwrap();
        let event_path = event.display().to_string();
        let c = ctx(&[
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_EVENT_PATH", &event_path),
        ]);
        assert_eq!(c.pr_number, Some(42));
    }

    #[test]
    fn malformed_event_payload_is_an_error_on_pull_request() {
        let dir = TempDir::new().unwrap();
        let event = dir.path().join("event.json");
        std::fs::write(&event, "not json").unwrap();
        let event_path = event.display().to_string();
        let env: HashMap<&str, String> = [
            ("GITHUB_EVENT_NAME", "pull_request".to_string()),
            ("GITHUB_EVENT_PATH", event_path),
        ]
        .into_iter()
        .collect();
        let err = EnvCiContext::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::Event { .. }));
    }

    #[rstest]
    #[case("not json")]
    #[case("")]
    fn push_ignores_unusable_event_payload(#[case] payload: &str) {
        let dir = TempDir::new().unwrap();
        let event = dir.path().join("event.json");
        std::fs::write(&event, payload).unwrap();
        let event_path = event.display().to_string();
        let c = ctx(&[
            ("GITHUB_EVENT_NAME", "push"),
            ("GITHUB_REF", "refs/heads/main"),
            ("GITHUB_EVENT_PATH", &event_path),
        ]);
        assert_eq!(c.pr_number, None);
        assert_eq!(c.branch(), "main");
    }

    #[test]
    fn push_ignores_missing_event_file() {
        let c = ctx(&[
            ("GITHUB_EVENT_NAME", "push"),
            ("GITHUB_EVENT_PATH", "/definitely/not/an/event.json"),
        ]);
        assert_eq!(c.pr_number, None);
    }
}
