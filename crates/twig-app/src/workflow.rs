//! Branch deletion workflow controller.
//!
//! The controller owns the user's choices for one deletion attempt and decides
//! which collaborator operation runs next. Hosts feed it user intents
//! (`confirm`, `dismiss`, `set_include_remote`, `skip_merge`) and drain
//! settled operations with `poll` on every tick.

use thiserror::Error;
use twig_core::branch::{AheadBehind, Repository};

use crate::delete::DeleteResult;
use crate::dispatcher::{BranchDispatcher, OperationResult, PendingOperation};
use crate::inspect::DeleteBranchRequest;
use crate::merge::MergeResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationMode {
    /// The branch has commits that would be lost; offer to merge first.
    UnmergedWarning,
    /// Nothing would be lost; ask for plain confirmation.
    DirectConfirm,
}

pub fn presentation_mode(ahead_behind: Option<AheadBehind>) -> PresentationMode {
    match ahead_behind {
        Some(counts) if counts.ahead > 0 => PresentationMode::UnmergedWarning,
        _ => PresentationMode::DirectConfirm,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyOperation {
    Merging,
    Deleting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Deleted,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    Idle,
    Confirming(PresentationMode),
    Busy(BusyOperation),
    Terminated(Termination),
}

/// Callbacks the workflow reports into.
pub trait DeletionHost {
    fn on_deleted(&mut self, repository: &Repository);
    fn on_dismissed(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Dispatched(BusyOperation),
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing is in flight.
    Idle,
    Running,
    /// The merge finished and the direct-delete confirmation is showing.
    Merged(MergeResult),
    Deleted(DeleteResult),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("failed to merge branch '{branch}': {message}")]
    MergeFailed { branch: String, message: String },
    #[error("failed to delete branch '{branch}': {message}")]
    DeleteFailed { branch: String, message: String },
}

#[derive(Debug)]
enum InFlight {
    Merge(PendingOperation<MergeResult>),
    Delete(PendingOperation<DeleteResult>),
}

#[derive(Debug)]
pub struct DeleteBranchWorkflow {
    request: DeleteBranchRequest,
    phase: WorkflowPhase,
    include_remote_branch: bool,
    is_busy: bool,
    in_flight: Option<InFlight>,
}

impl DeleteBranchWorkflow {
    pub fn new(request: DeleteBranchRequest) -> Self {
        Self {
            request,
            phase: WorkflowPhase::Idle,
            include_remote_branch: false,
            is_busy: false,
            in_flight: None,
        }
    }

    /// Creates the workflow and moves it straight to its confirmation view.
    pub fn start(request: DeleteBranchRequest) -> Self {
        let mut workflow = Self::new(request);
        workflow.begin();
        workflow
    }

    pub fn begin(&mut self) -> WorkflowPhase {
        if self.phase == WorkflowPhase::Idle {
            self.phase = WorkflowPhase::Confirming(self.request.presentation_mode());
        }
        self.phase
    }

    pub fn request(&self) -> &DeleteBranchRequest {
        &self.request
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    /// The confirmation view currently presented, if any.
    pub fn mode(&self) -> Option<PresentationMode> {
        match self.phase {
            WorkflowPhase::Confirming(mode) => Some(mode),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.phase, WorkflowPhase::Terminated(_))
    }

    pub fn remote_deletion_eligible(&self) -> bool {
        self.request.remote_deletion_eligible()
    }

    pub fn include_remote_branch(&self) -> bool {
        self.include_remote_branch && self.remote_deletion_eligible()
    }

    pub fn set_include_remote(&mut self, value: bool) {
        if !self.remote_deletion_eligible() || self.mode().is_none() {
            return;
        }
        self.include_remote_branch = value;
    }

    pub fn toggle_include_remote(&mut self) {
        self.set_include_remote(!self.include_remote_branch);
    }

    /// Leaves the unmerged warning for the direct-delete confirmation
    /// without merging.
    pub fn skip_merge(&mut self) -> bool {
        if self.phase != WorkflowPhase::Confirming(PresentationMode::UnmergedWarning) {
            return false;
        }
        self.phase = WorkflowPhase::Confirming(PresentationMode::DirectConfirm);
        true
    }

    /// Acts on the primary button of the current confirmation view.
    pub fn confirm(&mut self, dispatcher: &dyn BranchDispatcher) -> ConfirmOutcome {
        if self.is_busy {
            return ConfirmOutcome::Ignored;
        }

        let request = &self.request;
        match self.phase {
            WorkflowPhase::Confirming(PresentationMode::DirectConfirm) => {
                let include_remote = self.include_remote_branch();
                let pending = dispatcher.delete_local_branch(
                    &request.repository,
                    &request.branch,
                    include_remote,
                );
                self.enter_busy(BusyOperation::Deleting, InFlight::Delete(pending))
            }
            WorkflowPhase::Confirming(PresentationMode::UnmergedWarning) => {
                let pending = dispatcher.merge_branch(
                    &request.repository,
                    &request.branch,
                    request.merge_status,
                );
                self.enter_busy(BusyOperation::Merging, InFlight::Merge(pending))
            }
            WorkflowPhase::Idle | WorkflowPhase::Busy(_) | WorkflowPhase::Terminated(_) => {
                ConfirmOutcome::Ignored
            }
        }
    }

    fn enter_busy(&mut self, operation: BusyOperation, in_flight: InFlight) -> ConfirmOutcome {
        self.is_busy = true;
        self.phase = WorkflowPhase::Busy(operation);
        self.in_flight = Some(in_flight);
        ConfirmOutcome::Dispatched(operation)
    }

    /// Cancels from a confirmation view. Ignored while an operation runs.
    pub fn dismiss(&mut self, host: &mut dyn DeletionHost) -> bool {
        if self.mode().is_none() {
            return false;
        }

        self.phase = WorkflowPhase::Terminated(Termination::Cancelled);
        host.on_dismissed();
        true
    }

    /// Applies the in-flight operation's result if it has settled.
    pub fn poll(&mut self, host: &mut dyn DeletionHost) -> Result<PollOutcome, WorkflowError> {
        let settled = match &self.in_flight {
            None => return Ok(PollOutcome::Idle),
            Some(InFlight::Merge(pending)) => pending.try_settle().map(Settled::Merge),
            Some(InFlight::Delete(pending)) => pending.try_settle().map(Settled::Delete),
        };

        match settled {
            Some(settled) => self.settle(settled, host),
            None => Ok(PollOutcome::Running),
        }
    }

    /// Blocks until the in-flight operation settles.
    pub fn wait(&mut self, host: &mut dyn DeletionHost) -> Result<PollOutcome, WorkflowError> {
        let settled = match &self.in_flight {
            None => return Ok(PollOutcome::Idle),
            Some(InFlight::Merge(pending)) => Settled::Merge(pending.wait()),
            Some(InFlight::Delete(pending)) => Settled::Delete(pending.wait()),
        };

        self.settle(settled, host)
    }

    fn settle(
        &mut self,
        settled: Settled,
        host: &mut dyn DeletionHost,
    ) -> Result<PollOutcome, WorkflowError> {
        self.in_flight = None;
        self.is_busy = false;
        let branch = self.request.branch.name.clone();

        match settled {
            Settled::Merge(Ok(result)) => {
                self.phase = WorkflowPhase::Confirming(PresentationMode::DirectConfirm);
                Ok(PollOutcome::Merged(result))
            }
            Settled::Merge(Err(message)) => {
                self.phase = WorkflowPhase::Confirming(PresentationMode::UnmergedWarning);
                Err(WorkflowError::MergeFailed { branch, message })
            }
            Settled::Delete(Ok(result)) => {
                self.phase = WorkflowPhase::Terminated(Termination::Deleted);
                host.on_deleted(&self.request.repository);
                host.on_dismissed();
                Ok(PollOutcome::Deleted(result))
            }
            Settled::Delete(Err(message)) => {
                self.phase = WorkflowPhase::Confirming(PresentationMode::DirectConfirm);
                Err(WorkflowError::DeleteFailed { branch, message })
            }
        }
    }
}

enum Settled {
    Merge(OperationResult<MergeResult>),
    Delete(OperationResult<DeleteResult>),
}
