use anyhow::{Context, Result};
use thiserror::Error;
use twig_core::branch::{BranchRef, MergeStatus, Repository};

use crate::App;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub branch_name: String,
    /// Branch that received the merge; `None` on a detached HEAD.
    pub into: Option<String>,
}

#[derive(Debug, Error)]
pub enum MergeError {
    #[error(
        "merging '{branch}' would conflict in {conflicted_files} file(s); resolve the merge manually"
    )]
    WouldConflict {
        branch: String,
        conflicted_files: usize,
    },
}

impl<'a> App<'a> {
    pub fn merge_branch(
        &self,
        repository: &Repository,
        branch: &BranchRef,
        merge_status: Option<MergeStatus>,
    ) -> Result<MergeResult> {
        if let Some(MergeStatus::Conflicted { conflicted_files }) = merge_status {
            return Err(MergeError::WouldConflict {
                branch: branch.name.clone(),
                conflicted_files,
            }
            .into());
        }

        let repo_root = repository.root();
        let into = twig_core::git::current_branch(repo_root, self.runner)
            .context("failed to resolve the checked-out branch")?;

        twig_core::git::merge_branch(repo_root, &branch.name, self.runner)
            .with_context(|| format!("failed to merge branch '{}'", branch.name))?;

        Ok(MergeResult {
            branch_name: branch.name.clone(),
            into,
        })
    }
}
