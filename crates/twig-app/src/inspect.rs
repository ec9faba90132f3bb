use std::path::PathBuf;

use anyhow::{Context, Result};
use thiserror::Error;
use twig_core::branch::{AheadBehind, BranchRef, MergeStatus, Repository};

use crate::App;
use crate::runtime;
use crate::workflow::{PresentationMode, presentation_mode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectRequest {
    pub cwd: PathBuf,
    pub branch_name: String,
}

/// Everything the deletion workflow needs to know about a branch, captured
/// once when the user asks to delete it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteBranchRequest {
    pub repository: Repository,
    pub branch: BranchRef,
    pub ahead_behind: Option<AheadBehind>,
    pub merge_status: Option<MergeStatus>,
    pub exists_on_remote: bool,
}

impl DeleteBranchRequest {
    pub fn remote_deletion_eligible(&self) -> bool {
        self.branch.upstream_remote_name().is_some() && self.exists_on_remote
    }

    pub fn presentation_mode(&self) -> PresentationMode {
        presentation_mode(self.ahead_behind)
    }

    /// Number of commits that only exist on the branch, when there are any.
    pub fn unmerged_commits(&self) -> Option<usize> {
        self.ahead_behind
            .map(|counts| counts.ahead)
            .filter(|ahead| *ahead > 0)
    }
}

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("invalid branch name '{name}': {source}")]
    InvalidName {
        name: String,
        #[source]
        source: twig_core::names::NameError,
    },
    #[error("branch '{name}' does not exist")]
    UnknownBranch { name: String },
    #[error("branch '{name}' is checked out; switch to another branch before deleting it")]
    CheckedOutBranch { name: String },
}

impl<'a> App<'a> {
    pub fn inspect_branch(&self, request: InspectRequest) -> Result<DeleteBranchRequest> {
        let name = request.branch_name.trim().to_string();
        twig_core::names::validate_branch_name(&name).map_err(|source| {
            InspectError::InvalidName {
                name: name.clone(),
                source,
            }
        })?;

        let repo_root = runtime::resolve_repo_root(self, &request.cwd)?;

        let branch = twig_core::git::find_branch(&repo_root, &name, self.runner)
            .with_context(|| format!("failed to look up branch '{name}'"))?
            .ok_or_else(|| InspectError::UnknownBranch { name: name.clone() })?;

        let current = twig_core::git::current_branch(&repo_root, self.runner)
            .context("failed to resolve the checked-out branch")?;
        if current.as_deref() == Some(name.as_str()) {
            return Err(InspectError::CheckedOutBranch { name }.into());
        }

        // Counts and the merge preview are taken against the checked-out
        // branch, which is where a merge would land.
        let base = "HEAD";
        let ahead_behind = twig_core::git::ahead_behind(&repo_root, base, &name, self.runner)
            .with_context(|| format!("failed to compare '{name}' with '{base}'"))?;

        let exists_on_remote = match &branch.upstream {
            Some(upstream) => {
                twig_core::git::remote_branch_exists(&repo_root, upstream, self.runner)
                    .with_context(|| format!("failed to check remote branch '{upstream}'"))?
            }
            None => false,
        };

        let merge_status = if ahead_behind.is_some_and(|counts| counts.ahead > 0) {
            Some(
                twig_core::git::merge_status(&repo_root, base, &name, self.runner)
                    .with_context(|| format!("failed to compute merge status for '{name}'"))?,
            )
        } else {
            None
        };

        Ok(DeleteBranchRequest {
            repository: Repository::new(repo_root),
            branch,
            ahead_behind,
            merge_status,
            exists_on_remote,
        })
    }
}
