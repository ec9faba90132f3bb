use std::sync::mpsc::{self, Receiver, TryRecvError};

use twig_core::branch::{BranchRef, MergeStatus, Repository};
use twig_core::command_runner::SystemCommandRunner;

use crate::App;
use crate::delete::DeleteResult;
use crate::merge::MergeResult;

/// Result of a collaborator operation as delivered to the UI thread. Errors
/// are flattened to their display chain so they can cross threads.
pub type OperationResult<T> = Result<T, String>;

/// Handle to a collaborator operation that settles at some later point.
#[derive(Debug)]
pub struct PendingOperation<T> {
    receiver: Receiver<OperationResult<T>>,
}

impl<T: Send + 'static> PendingOperation<T> {
    pub fn spawn<F>(work: F) -> Self
    where
        F: FnOnce() -> OperationResult<T> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = sender.send(work());
        });
        Self { receiver }
    }
}

impl<T> PendingOperation<T> {
    pub fn from_receiver(receiver: Receiver<OperationResult<T>>) -> Self {
        Self { receiver }
    }

    pub fn settled(result: OperationResult<T>) -> Self {
        let (sender, receiver) = mpsc::channel();
        let _ = sender.send(result);
        Self { receiver }
    }

    /// Non-blocking check; `None` while the operation is still running.
    pub fn try_settle(&self) -> Option<OperationResult<T>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(worker_vanished())),
        }
    }

    pub fn wait(&self) -> OperationResult<T> {
        self.receiver.recv().unwrap_or_else(|_| Err(worker_vanished()))
    }
}

fn worker_vanished() -> String {
    "operation ended without reporting a result".to_string()
}

/// The two version-control operations the deletion workflow depends on.
pub trait BranchDispatcher {
    fn delete_local_branch(
        &self,
        repository: &Repository,
        branch: &BranchRef,
        include_remote: bool,
    ) -> PendingOperation<DeleteResult>;

    fn merge_branch(
        &self,
        repository: &Repository,
        branch: &BranchRef,
        merge_status: Option<MergeStatus>,
    ) -> PendingOperation<MergeResult>;
}

/// Runs each operation to completion before returning.
impl<'a> BranchDispatcher for App<'a> {
    fn delete_local_branch(
        &self,
        repository: &Repository,
        branch: &BranchRef,
        include_remote: bool,
    ) -> PendingOperation<DeleteResult> {
        PendingOperation::settled(
            App::delete_local_branch(self, repository, branch, include_remote)
                .map_err(|error| format!("{error:#}")),
        )
    }

    fn merge_branch(
        &self,
        repository: &Repository,
        branch: &BranchRef,
        merge_status: Option<MergeStatus>,
    ) -> PendingOperation<MergeResult> {
        PendingOperation::settled(
            App::merge_branch(self, repository, branch, merge_status)
                .map_err(|error| format!("{error:#}")),
        )
    }
}

/// Runs each operation on a worker thread against the system `git`.
#[derive(Debug, Default)]
pub struct SystemBranchDispatcher;

impl SystemBranchDispatcher {
    pub fn new() -> Self {
        Self
    }
}

impl BranchDispatcher for SystemBranchDispatcher {
    fn delete_local_branch(
        &self,
        repository: &Repository,
        branch: &BranchRef,
        include_remote: bool,
    ) -> PendingOperation<DeleteResult> {
        let repository = repository.clone();
        let branch = branch.clone();
        PendingOperation::spawn(move || {
            let runner = SystemCommandRunner::new();
            App::new(&runner)
                .delete_local_branch(&repository, &branch, include_remote)
                .map_err(|error| format!("{error:#}"))
        })
    }

    fn merge_branch(
        &self,
        repository: &Repository,
        branch: &BranchRef,
        merge_status: Option<MergeStatus>,
    ) -> PendingOperation<MergeResult> {
        let repository = repository.clone();
        let branch = branch.clone();
        PendingOperation::spawn(move || {
            let runner = SystemCommandRunner::new();
            App::new(&runner)
                .merge_branch(&repository, &branch, merge_status)
                .map_err(|error| format!("{error:#}"))
        })
    }
}
