//! Process runner: the only place that spawns `git`.
//!
//! Every call runs against the ambient checkout in `workdir`. Standard error
//! is inherited so git's own diagnostics reach the CI log; standard output is
//! either forwarded ([`Runner::run`]), captured ([`Runner::capture`]) or read
//! lazily line by line ([`Git::lines`]).

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use tracing::debug;

use crate::error::SyncError;

/// Executes git subcommands. Implemented by [`Git`]; tests script it.
pub trait Runner {
    /// Run with stdout forwarded to this process's stdout.
    fn run(&self, subcommand: &str, args: &[&str]) -> Result<(), SyncError>;

    /// Run and return stdout, one `\n` between lines, no trailing newline.
    fn capture(&self, subcommand: &str, args: &[&str]) -> Result<String, SyncError>;
}

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Spawn and return stdout as a lazily consumed line sequence.
    ///
    /// The exit status is checked once stdout is exhausted; a non-zero exit
    /// is yielded as the final item. Dropping the iterator early kills the
    /// child.
    pub fn lines(&self, subcommand: &str, args: &[&str]) -> Result<GitLines, SyncError> {
        let command = display_command(subcommand, args);
        debug!(command = %command, "running git");
        let mut child = self
            .command(subcommand, args)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| SyncError::Spawn {
                command: command.clone(),
                source,
            })?;
        let stdout = child.stdout.take().ok_or_else(|| SyncError::Output {
            command: command.clone(),
            source: std::io::Error::other("stdout was not piped"),
        })?;
        Ok(GitLines {
            child,
            reader: BufReader::new(stdout),
            command,
            finished: false,
        })
    }

    fn command(&self, subcommand: &str, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg(subcommand)
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit());
        cmd
    }
}

impl Runner for Git {
    fn run(&self, subcommand: &str, args: &[&str]) -> Result<(), SyncError> {
        let command = display_command(subcommand, args);
        debug!(command = %command, "running git");
        let status = self
            .command(subcommand, args)
            .stdout(Stdio::inherit())
            .status()
            .map_err(|source| SyncError::Spawn {
                command: command.clone(),
                source,
            })?;
        if !status.success() {
            return Err(SyncError::Command {
                command,
                code: status.code(),
            });
        }
        Ok(())
    }

    fn capture(&self, subcommand: &str, args: &[&str]) -> Result<String, SyncError> {
        let lines = self
            .lines(subcommand, args)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }
}

/// Line iterator over a running git child's stdout.
pub struct GitLines {
    child: Child,
    reader: BufReader<ChildStdout>,
    command: String,
    finished: bool,
}

impl GitLines {
    fn finish(&mut self) -> Option<Result<String, SyncError>> {
        self.finished = true;
        match self.child.wait() {
            Ok(status) if status.success() => None,
            Ok(status) => Some(Err(SyncError::Command {
                command: self.command.clone(),
                code: status.code(),
            })),
            Err(source) => Some(Err(SyncError::Output {
                command: self.command.clone(),
                source,
            })),
        }
    }
}

impl Iterator for GitLines {
    type Item = Result<String, SyncError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => self.finish(),
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                // Diffs of non-UTF-8 files must not abort the run.
                Some(Ok(String::from_utf8_lossy(&buf).into_owned()))
            }
            Err(source) => {
                self.finished = true;
                let _ = self.child.kill();
                let _ = self.child.wait();
                Some(Err(SyncError::Output {
                    command: self.command.clone(),
                    source,
                }))
            }
        }
    }
}

impl Drop for GitLines {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

fn display_command(subcommand: &str, args: &[&str]) -> String {
    if args.is_empty() {
        subcommand.to_string()
    } else {
        format!("{subcommand} {}", args.join(" "))
    }
}
