//! Review reporter: posts the pending diff as a pull-request comment.
//!
//! The identity label is embedded as a hidden HTML marker so a later run
//! updates its own comment in place instead of stacking duplicates.

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use actionsync_core::EnvCiContext;

/// Errors from posting a review comment.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Transport failure or non-2xx status from the API.
    #[error("GitHub API request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    /// The response body could not be decoded.
    #[error("failed to decode GitHub API response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The CI context lacks what the API call needs.
    #[error("cannot post review comment: {0} is unknown")]
    MissingContext(&'static str),
}

/// Posts a human-readable comment for review.
pub trait Reporter {
    fn post_comment(&self, credential: &str, label: &str, body: &str) -> Result<(), ReportError>;
}

/// Hidden marker identifying comments written under `label`.
pub fn marker(label: &str) -> String {
    format!("<!-- actionsync:{label} -->")
}

/// Comment body with the marker prepended.
pub fn with_marker(label: &str, body: &str) -> String {
    format!("{}\n{body}", marker(label))
}

#[derive(Debug, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
}

/// Id of the first comment carrying `label`'s marker.
pub fn find_existing(comments: &[IssueComment], label: &str) -> Option<u64> {
    let marker = marker(label);
    comments
        .iter()
        .find(|c| c.body.as_deref().is_some_and(|b| b.contains(&marker)))
        .map(|c| c.id)
}

/// GitHub REST implementation of [`Reporter`].
pub struct GithubReporter {
    agent: ureq::Agent,
    api_url: String,
    repository: Option<String>,
    pr_number: Option<u64>,
}

impl GithubReporter {
    pub fn new(
        api_url: impl Into<String>,
        repository: Option<String>,
        pr_number: Option<u64>,
    ) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .user_agent(concat!("actionsync/", env!("CARGO_PKG_VERSION")))
                .build(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            repository,
            pr_number,
        }
    }

    pub fn from_context(ctx: &EnvCiContext) -> Self {
        Self::new(ctx.api_url.clone(), ctx.repository.clone(), ctx.pr_number)
    }

    fn repository(&self) -> Result<&str, ReportError> {
        self.repository
            .as_deref()
            .ok_or(ReportError::MissingContext("repository"))
    }

    fn comments_url(&self) -> Result<String, ReportError> {
        let repo = self.repository()?;
        let number = self
            .pr_number
            .ok_or(ReportError::MissingContext("pull request number"))?;
        Ok(format!("{}/repos/{repo}/issues/{number}/comments", self.api_url))
    }

    fn request(&self, method: &str, url: &str, credential: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &format!("Bearer {credential}"))
            .set("Accept", "application/vnd.github+json")
    }

    /// Every comment on the pull request, following `Link: rel="next"`.
    fn list_comments(&self, url: &str, credential: &str) -> Result<Vec<IssueComment>, ReportError> {
        let mut comments = Vec::new();
        let mut next = Some(format!("{url}?per_page=100"));
        while let Some(page_url) = next {
            let response = self
                .request("GET", &page_url, credential)
                .call()
                .map_err(|e| http_err(&page_url, e))?;
            next = response.header("link").and_then(next_page_url);
            let page: Vec<IssueComment> =
                response.into_json().map_err(|source| ReportError::Decode {
                    url: page_url.clone(),
                    source,
                })?;
            debug!(url = %page_url, count = page.len(), "listed review comments");
            comments.extend(page);
        }
        Ok(comments)
    }
}

/// Target of the `rel="next"` entry of a `Link` header.
pub fn next_page_url(link: &str) -> Option<String> {
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';').map(str::trim);
        let target = parts.next()?.strip_prefix('<')?.strip_suffix('>')?;
        parts
            .any(|param| param == "rel=\"next\"")
            .then(|| target.to_string())
    })
}

impl Reporter for GithubReporter {
    fn post_comment(&self, credential: &str, label: &str, body: &str) -> Result<(), ReportError> {
        let url = self.comments_url()?;
        let payload = json!({ "body": with_marker(label, body) });

        let existing = find_existing(&self.list_comments(&url, credential)?, label);
        match existing {
            Some(id) => {
                let comment_url = format!(
                    "{}/repos/{}/issues/comments/{id}",
                    self.api_url,
                    self.repository()?
                );
                debug!(id, "updating existing review comment");
                self.request("PATCH", &comment_url, credential)
                    .send_json(payload)
                    .map_err(|e| http_err(&comment_url, e))?;
                info!(id, "updated review comment");
            }
            None => {
                self.request("POST", &url, credential)
                    .send_json(payload)
                    .map_err(|e| http_err(&url, e))?;
                info!("posted review comment");
            }
        }
        Ok(())
    }
}

fn http_err(url: &str, source: ureq::Error) -> ReportError {
    ReportError::Http {
        url: url.to_string(),
        source: Box::new(source),
    }
}
