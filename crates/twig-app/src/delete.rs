use anyhow::{Context, Result};
use thiserror::Error;
use twig_core::branch::{BranchRef, Repository};

use crate::App;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    pub branch_name: String,
    /// `remote/branch` of the remote copy that was deleted, if any.
    pub remote_branch: Option<String>,
}

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("branch '{branch}' has no upstream remote to delete")]
    NoUpstream { branch: String },
    #[error("local branch deletion failed after removing '{remote_branch}' from the remote: {message}")]
    LocalDeleteAfterRemote {
        remote_branch: String,
        message: String,
    },
}

impl<'a> App<'a> {
    /// Deletes the local branch and, when asked, its remote counterpart. The
    /// remote copy goes first so a push failure leaves everything in place,
    /// and a remote copy that is already gone is not pushed again.
    pub fn delete_local_branch(
        &self,
        repository: &Repository,
        branch: &BranchRef,
        include_remote: bool,
    ) -> Result<DeleteResult> {
        let repo_root = repository.root();
        let mut remote_branch = None;

        if include_remote {
            let upstream = branch
                .upstream
                .as_ref()
                .ok_or_else(|| DeleteError::NoUpstream {
                    branch: branch.name.clone(),
                })?;

            // A retry after a failed local delete finds the remote copy gone;
            // the tracking ref is dropped by the earlier successful push.
            let still_on_remote =
                twig_core::git::remote_branch_exists(repo_root, upstream, self.runner)
                    .with_context(|| format!("failed to check remote branch '{upstream}'"))?;
            if still_on_remote {
                twig_core::git::delete_remote_branch(repo_root, upstream, self.runner)
                    .with_context(|| format!("failed to delete remote branch '{upstream}'"))?;
            }
            remote_branch = Some(upstream.to_string());
        }

        if let Err(error) = twig_core::git::delete_local_branch(repo_root, &branch.name, self.runner)
        {
            return match remote_branch {
                Some(remote_branch) => Err(DeleteError::LocalDeleteAfterRemote {
                    remote_branch,
                    message: format!("{error:#}"),
                }
                .into()),
                None => Err(anyhow::Error::new(error)
                    .context(format!("failed to delete branch '{}'", branch.name))),
            };
        }

        Ok(DeleteResult {
            branch_name: branch.name.clone(),
            remote_branch,
        })
    }
}
