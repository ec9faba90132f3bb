use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::App;

pub(crate) fn resolve_repo_root(app: &App<'_>, cwd: &Path) -> Result<PathBuf> {
    twig_core::git::repo_root(cwd, app.runner).with_context(|| {
        format!(
            "failed to resolve git repository root from {}",
            cwd.display()
        )
    })
}

impl<'a> App<'a> {
    pub fn ensure_runtime_repo_ready(&self, cwd: &Path) -> Result<PathBuf> {
        let repo_root = resolve_repo_root(self, cwd)?;
        twig_core::git::ensure_has_commits(&repo_root, self.runner)
            .with_context(|| format!("repository at {} is not ready", repo_root.display()))?;
        Ok(repo_root)
    }
}
