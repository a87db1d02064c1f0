//! Scripted [`Runner`] for unit tests: records every call, replays queued
//! replies per subcommand, and succeeds with empty output once a queue runs dry.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use crate::error::SyncError;
use crate::git::Runner;

enum Reply {
    Output(String),
    Fail,
}

#[derive(Default)]
pub(crate) struct ScriptedRunner {
    calls: RefCell<Vec<String>>,
    replies: RefCell<HashMap<String, VecDeque<Reply>>>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply with the given stdout.
    pub(crate) fn reply(&self, subcommand: &str, stdout: &str) {
        self.queue(subcommand, Reply::Output(stdout.to_string()));
    }

    /// Queue a non-zero exit.
    pub(crate) fn fail(&self, subcommand: &str) {
        self.queue(subcommand, Reply::Fail);
    }

    pub(crate) fn fail_times(&self, subcommand: &str, times: usize) {
        for _ in 0..times {
            self.fail(subcommand);
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub(crate) fn count(&self, subcommand: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.split(' ').next() == Some(subcommand))
            .count()
    }

    fn queue(&self, subcommand: &str, reply: Reply) {
        self.replies
            .borrow_mut()
            .entry(subcommand.to_string())
            .or_default()
            .push_back(reply);
    }

    fn next(&self, subcommand: &str, args: &[&str]) -> Result<String, SyncError> {
        let command = if args.is_empty() {
            subcommand.to_string()
        } else {
            format!("{subcommand} {}", args.join(" "))
        };
        self.calls.borrow_mut().push(command.clone());
        let reply = self
            .replies
            .borrow_mut()
            .get_mut(subcommand)
            .and_then(VecDeque::pop_front);
        match reply {
            Some(Reply::Fail) => Err(SyncError::Command {
                command,
                code: Some(1),
            }),
            Some(Reply::Output(out)) => Ok(out),
            None => Ok(String::new()),
        }
    }
}

impl Runner for ScriptedRunner {
    fn run(&self, subcommand: &str, args: &[&str]) -> Result<(), SyncError> {
        self.next(subcommand, args).map(|_| ())
    }

    fn capture(&self, subcommand: &str, args: &[&str]) -> Result<String, SyncError> {
        self.next(subcommand, args)
    }
}
