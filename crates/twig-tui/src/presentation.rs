//! Dialog copy. Title casing follows the configured platform style; the
//! workflow itself never sees any of this.

use twig_app::MergeResult;
use twig_core::branch::plural;
use twig_core::config::PlatformStyle;

pub(crate) const MERGE_FIRST_PROMPT: &str = "Would you like to merge your changes first?";
pub(crate) const IRREVERSIBLE_NOTE: &str = "This action cannot be undone.";
pub(crate) const REMOTE_PROMPT: &str =
    "The branch also exists on the remote, do you wish to delete it there as well?";
pub(crate) const REMOTE_CHECKBOX_LABEL: &str = "Yes, delete this branch on the remote";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DialogCopy {
    style: PlatformStyle,
}

impl DialogCopy {
    pub(crate) fn new(style: PlatformStyle) -> Self {
        Self { style }
    }

    pub(crate) fn title(&self) -> &'static str {
        self.pick("Delete Branch", "Delete branch")
    }

    pub(crate) fn merge_and_delete(&self) -> &'static str {
        self.pick("Merge and Delete", "Merge and delete")
    }

    pub(crate) fn delete(&self) -> &'static str {
        "Delete"
    }

    pub(crate) fn decline_merge(&self) -> &'static str {
        "No"
    }

    pub(crate) fn cancel(&self) -> &'static str {
        "Cancel"
    }

    pub(crate) fn merging(&self) -> &'static str {
        self.pick("Merging Branch", "Merging branch")
    }

    pub(crate) fn deleting(&self) -> &'static str {
        self.pick("Deleting Branch", "Deleting branch")
    }

    fn pick(&self, capitalized: &'static str, lowercase: &'static str) -> &'static str {
        match self.style {
            PlatformStyle::Capitalized => capitalized,
            PlatformStyle::Lowercase => lowercase,
        }
    }
}

/// "unmerged commit" or "unmerged commits" for `count`.
pub(crate) fn unmerged_commits_phrase(count: usize) -> String {
    format!("unmerged {}", plural(count, "commit", "commits"))
}

pub(crate) fn merged_notice(result: &MergeResult) -> String {
    match result.into.as_deref() {
        Some(into) => format!("Merged '{}' into '{into}'.", result.branch_name),
        None => format!("Merged '{}'.", result.branch_name),
    }
}
