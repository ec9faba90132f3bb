use std::fmt;
use std::path::{Path, PathBuf};

/// A repository the workflow operates on, identified by its working tree root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub root: PathBuf,
}

impl Repository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &str {
        self.root
            .file_name()
            .and_then(|value| value.to_str())
            .unwrap_or("repo")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRef {
    pub remote: String,
    pub branch: String,
}

impl fmt::Display for UpstreamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.remote, self.branch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    pub name: String,
    pub upstream: Option<UpstreamRef>,
}

impl BranchRef {
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            upstream: None,
        }
    }

    pub fn tracking(
        name: impl Into<String>,
        remote: impl Into<String>,
        remote_branch: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            upstream: Some(UpstreamRef {
                remote: remote.into(),
                branch: remote_branch.into(),
            }),
        }
    }

    pub fn upstream_remote_name(&self) -> Option<&str> {
        self.upstream
            .as_ref()
            .map(|upstream| upstream.remote.as_str())
            .filter(|remote| !remote.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AheadBehind {
    pub ahead: usize,
    pub behind: usize,
}

impl AheadBehind {
    pub fn new(ahead: usize, behind: usize) -> Self {
        Self { ahead, behind }
    }
}

/// Precomputed answer to "would merging this branch into the checked-out
/// branch succeed?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStatus {
    Clean,
    Conflicted { conflicted_files: usize },
    Invalid,
}

impl MergeStatus {
    pub fn label(&self) -> String {
        match self {
            Self::Clean => "clean".to_string(),
            Self::Conflicted { conflicted_files } => format!(
                "{conflicted_files} conflicted {}",
                plural(*conflicted_files, "file", "files")
            ),
            Self::Invalid => "cannot be computed".to_string(),
        }
    }
}

pub fn plural<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}
