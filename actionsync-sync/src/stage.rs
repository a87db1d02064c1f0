//! Staging & diff engine.
//!
//! `git diff` only reports reliably on staged content for both modified and
//! newly created files, so each candidate is staged, diffed against HEAD and
//! then put back. [`StagedPath`] owns the restore step: it records the
//! path's index entry before staging and restores it when dropped, on every
//! exit path.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use actionsync_core::CandidateSet;

use crate::error::SyncError;
use crate::git::Runner;

/// Header lines git emits between `diff --git` and the first hunk.
const PREAMBLE_PREFIXES: &[&str] = &[
    "diff --git ",
    "index ",
    "new file mode ",
    "deleted file mode ",
    "old mode ",
    "new mode ",
    "similarity index ",
    "dissimilarity index ",
    "rename from ",
    "rename to ",
    "copy from ",
    "copy to ",
    "--- ",
    "+++ ",
];

/// Index entry of a path before it was staged: `<mode> <object>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub mode: String,
    pub object: String,
}

impl IndexEntry {
    /// Stage-0 entry from `git ls-files --stage` output, if any.
    pub fn parse(ls_files: &str) -> Option<Self> {
        ls_files.lines().find_map(|line| {
            let (meta, _path) = line.split_once('\t')?;
            let mut fields = meta.split_whitespace();
            let mode = fields.next()?;
            let object = fields.next()?;
            (fields.next()? == "0").then(|| IndexEntry {
                mode: mode.to_string(),
                object: object.to_string(),
            })
        })
    }
}

/// Scoped guard: the path's index entry is restored when this value goes
/// out of scope. A path absent from the index before is unstaged again.
pub struct StagedPath<'a> {
    runner: &'a dyn Runner,
    path: &'a Path,
    previous: Option<IndexEntry>,
}

impl<'a> StagedPath<'a> {
    /// Record the current index entry. Nothing is staged until
    /// [`StagedPath::add`].
    pub fn acquire(runner: &'a dyn Runner, path: &'a Path) -> Result<Self, SyncError> {
        let path_arg = path.to_string_lossy();
        let listing = runner
            .capture("ls-files", &["--stage", "--", &path_arg])
            .map_err(|source| SyncError::Stage {
                path: path.to_path_buf(),
                source: Box::new(source),
            })?;
        Ok(Self {
            runner,
            path,
            previous: IndexEntry::parse(&listing),
        })
    }

    /// `git add -- <path>`; works for untracked files too.
    pub fn add(&self) -> Result<(), SyncError> {
        let path = self.path.to_string_lossy();
        self.runner
            .run("add", &["--", &path])
            .map_err(|source| SyncError::Stage {
                path: self.path.to_path_buf(),
                source: Box::new(source),
            })
    }
}

impl Drop for StagedPath<'_> {
    fn drop(&mut self) {
        let path = self.path.to_string_lossy();
        let restored = match &self.previous {
            Some(entry) => {
                let info = format!("{},{},{}", entry.mode, entry.object, path);
                self.runner.run("update-index", &["--cacheinfo", &info])
            }
            None => self.runner.run("reset", &["--quiet", "--", &path]),
        };
        if let Err(err) = restored {
            warn!(path = %self.path.display(), error = %err, "failed to restore index entry");
        }
    }
}

/// Stage `path`, diff it against HEAD and restore its index entry.
///
/// Returns the hunk content only (see [`strip_preamble`]); an empty string
/// means the on-disk content matches HEAD.
pub fn stage_and_diff(runner: &dyn Runner, path: &Path) -> Result<String, SyncError> {
    let staged = StagedPath::acquire(runner, path)?;
    staged.add()?;

    let path_arg = path.to_string_lossy();
    let raw = runner
        .capture("diff", &["--staged", "--no-color", "--", &path_arg])
        .map_err(|source| SyncError::Diff {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
    drop(staged);

    let diff = strip_preamble(&raw);
    debug!(path = %path.display(), changed = !diff.is_empty(), "computed staged diff");
    Ok(diff)
}

/// Drop the `diff --git` / extended header / `---` / `+++` lines that precede
/// the first hunk. For a new file this is exactly the first five lines.
pub fn strip_preamble(raw: &str) -> String {
    let mut lines = raw.lines().peekable();
    while lines
        .peek()
        .is_some_and(|line| PREAMBLE_PREFIXES.iter().any(|p| line.starts_with(p)))
    {
        lines.next();
    }
    lines.collect::<Vec<_>>().join("\n")
}

/// A single path's non-empty staged diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub diff: String,
}

/// Aggregate of every candidate that drifted from HEAD, in candidate order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    pub files: Vec<FileDiff>,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Markdown rendering used both for the log and the review comment.
impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for file in &self.files {
            write!(
                f,
                "Path `{}`:\n\n```diff\n{}\n```\n\n",
                file.path.display(),
                file.diff
            )?;
        }
        Ok(())
    }
}

/// Compute the staged diff for every candidate; any failure aborts.
pub fn aggregate_diff(runner: &dyn Runner, candidates: &CandidateSet) -> Result<DiffReport, SyncError> {
    let mut report = DiffReport::default();
    for path in candidates.iter() {
        let diff = stage_and_diff(runner, path)?;
        if !diff.is_empty() {
            report.files.push(FileDiff {
                path: path.to_path_buf(),
                diff,
            });
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::ScriptedRunner;

    const NEW_FILE: &str = "diff --git a/action.yml b/action.yml\n\
new file mode 100644\n\
index 0000000..e69de29\n\
--- /dev/null\n\
+++ b/action.yml\n\
@@ -0,0 +1,2 @@\n\
+name: lint\n\
+description: ''";

    const MODIFIED: &str = "diff --git a/Dockerfile b/Dockerfile\n\
index 1111111..2222222 100644\n\
--- a/Dockerfile\n\
+++ b/Dockerfile\n\
@@ -1 +1 @@\n\
-FROM golang:1.21-alpine\n\
+FROM golang:1.22-alpine";

    #[test]
    fn new_file_preamble_is_first_five_lines() {
        let body = strip_preamble(NEW_FILE);
        let expected: Vec<&str> = NEW_FILE.lines().skip(5).collect();
        assert_eq!(body, expected.join("\n"));
    }

    #[test]
    fn modified_file_keeps_hunk_header() {
        let body = strip_preamble(MODIFIED);
        assert!(body.starts_with("@@ -1 +1 @@"));
        assert!(!body.contains("+++ b/Dockerfile"));
    }

    #[test]
    fn removed_lines_starting_with_dashes_survive() {
        let raw = "diff --git a/x b/x\nindex 1..2 100644\n--- a/x\n+++ b/x\n@@ -1 +1 @@\n--- old\n+++ new";
        assert_eq!(strip_preamble(raw), "@@ -1 +1 @@\n--- old\n+++ new");
    }

    #[test]
    fn empty_diff_stays_empty() {
        assert_eq!(strip_preamble(""), "");
    }

    #[test]
    fn diff_failure_still_resets_path() {
        let runner = ScriptedRunner::new();
        runner.fail("diff");
        let err = stage_and_diff(&runner, Path::new("action.yml")).expect_err("diff fails");
        assert!(matches!(err, SyncError::Diff { .. }));
        assert_eq!(
            runner.calls(),
            vec![
                "ls-files --stage -- action.yml",
                "add -- action.yml",
                "diff --staged --no-color -- action.yml",
                "reset --quiet -- action.yml",
            ]
        );
    }

    #[test]
    fn previously_indexed_path_is_restored_not_reset() {
        let runner = ScriptedRunner::new();
        runner.reply(
            "ls-files",
            "100644 3b18e512dba79e4c8300dd08aeb37f8e728b8dad 0\taction.yml",
        );
        runner.reply("diff", MODIFIED);
        stage_and_diff(&runner, Path::new("action.yml")).expect("diff ok");
        assert_eq!(runner.count("reset"), 0);
        assert_eq!(
            runner.calls().last().map(String::as_str),
            Some("update-index --cacheinfo 100644,3b18e512dba79e4c8300dd08aeb37f8e728b8dad,action.yml")
        );
    }

    #[test]
    fn listing_failure_stages_nothing() {
        let runner = ScriptedRunner::new();
        runner.fail("ls-files");
        let err = stage_and_diff(&runner, Path::new("action.yml")).expect_err("ls-files fails");
        assert!(matches!(err, SyncError::Stage { .. }));
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn index_entry_parses_stage_zero_only() {
        let entry = IndexEntry::parse("100755 abc123 0\tbin/run").expect("entry");
        assert_eq!(entry.mode, "100755");
        assert_eq!(entry.object, "abc123");
        assert_eq!(IndexEntry::parse(""), None);
        assert_eq!(
            IndexEntry::parse("100644 aaa 1\tx\n100644 bbb 2\tx\n100644 ccc 3\tx"),
            None
        );
    }

    #[test]
    fn add_failure_names_path_and_resets() {
        let runner = ScriptedRunner::new();
        runner.fail("add");
        let err = stage_and_diff(&runner, Path::new("Dockerfile")).expect_err("add fails");
        assert!(err.to_string().starts_with("git add for Dockerfile"));
        assert_eq!(runner.count("diff"), 0);
        assert_eq!(runner.count("reset"), 1);
    }

    #[test]
    fn reset_failure_does_not_mask_result() {
        let runner = ScriptedRunner::new();
        runner.reply("diff", MODIFIED);
        runner.fail("reset");
        let diff = stage_and_diff(&runner, Path::new("Dockerfile")).expect("diff ok");
        assert!(diff.starts_with("@@"));
    }

    #[test]
    fn aggregate_labels_only_changed_paths() {
        let runner = ScriptedRunner::new();
        runner.reply("diff", "");
        runner.reply("diff", MODIFIED);
        let candidates: CandidateSet = ["action.yml", "Dockerfile"]
            .into_iter()
            .map(PathBuf::from)
            .collect();
        let report = aggregate_diff(&runner, &candidates).expect("aggregate");
        assert_eq!(report.files.len(), 1);
        let text = report.to_string();
        assert!(text.starts_with("Path `Dockerfile`:\n\n```diff\n@@ -1 +1 @@"));
        assert!(!text.contains("action.yml"));
    }
}
