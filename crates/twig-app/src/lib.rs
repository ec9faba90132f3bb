mod delete;
mod dispatcher;
mod inspect;
mod merge;
mod runtime;
pub mod workflow;

use anyhow::{Context, Result, anyhow};
use twig_core::command_runner::CommandRunner;
use twig_core::config::{TwigConfig, load_config_or_default, resolve_config_path};

pub use delete::{DeleteError, DeleteResult};
pub use dispatcher::{BranchDispatcher, OperationResult, PendingOperation, SystemBranchDispatcher};
pub use inspect::{DeleteBranchRequest, InspectError, InspectRequest};
pub use merge::{MergeError, MergeResult};
pub use workflow::{
    BusyOperation, ConfirmOutcome, DeleteBranchWorkflow, DeletionHost, PollOutcome,
    PresentationMode, Termination, WorkflowError, WorkflowPhase, presentation_mode,
};

pub struct App<'a> {
    pub runner: &'a dyn CommandRunner,
}

impl<'a> App<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    pub fn ensure_config_ready(&self) -> Result<TwigConfig> {
        let config_path = resolve_config_path().context("failed to resolve config path")?;

        load_config_or_default(&config_path).map_err(|error| {
            anyhow!(
                "invalid config at {}: {error}\nFix the config and retry. See README.md for the config format.",
                config_path.display()
            )
        })
    }
}
