use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use anyhow::bail;

use crate::command_runner::{CommandOutput, CommandRunner};

/// Answers each command with the next scripted reply and keeps a transcript
/// of `program args...` lines.
pub(crate) struct ScriptedGit {
    replies: RefCell<VecDeque<CommandOutput>>,
    transcript: RefCell<Vec<(String, Option<PathBuf>)>>,
}

impl ScriptedGit {
    pub(crate) fn replying(replies: Vec<CommandOutput>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            transcript: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn command_lines(&self) -> Vec<String> {
        self.transcript
            .borrow()
            .iter()
            .map(|(line, _)| line.clone())
            .collect()
    }

    pub(crate) fn cwd_of(&self, index: usize) -> Option<PathBuf> {
        self.transcript.borrow()[index].1.clone()
    }
}

impl CommandRunner for ScriptedGit {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> anyhow::Result<CommandOutput> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.transcript
            .borrow_mut()
            .push((line.clone(), cwd.map(Path::to_path_buf)));

        match self.replies.borrow_mut().pop_front() {
            Some(reply) => Ok(reply),
            None => bail!("no scripted reply for `{line}`"),
        }
    }
}

pub(crate) fn reply(stdout: &str, stderr: &str, status_code: i32) -> CommandOutput {
    CommandOutput {
        status_code,
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}
