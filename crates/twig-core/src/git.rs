use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::branch::{AheadBehind, BranchRef, MergeStatus, UpstreamRef};
use crate::command_adapter;
use crate::command_runner::{CommandOutput, CommandRunner};

const FIELD_SEPARATOR: char = '\u{1f}';

#[derive(Debug, Error)]
pub enum GitError {
    #[error("git command failed: git {command} (exit {status}) {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },
    #[error("failed to execute git command: {0}")]
    Execute(String),
    #[error("failed to parse git output: {0}")]
    Parse(String),
    #[error("repository has no commits yet; create an initial commit first")]
    NoCommits,
    #[error("merging '{branch}' produced conflicts; the merge was aborted")]
    MergeConflict { branch: String },
}

pub fn repo_root(cwd: &Path, runner: &dyn CommandRunner) -> Result<PathBuf, GitError> {
    let output = run_git_checked(runner, &["rev-parse", "--show-toplevel"], Some(cwd))?;
    Ok(PathBuf::from(first_non_empty_stdout_line(
        &output,
        "git rev-parse returned empty repo root",
    )?))
}

pub fn ensure_has_commits(repo_root: &Path, runner: &dyn CommandRunner) -> Result<(), GitError> {
    let output = run_git(runner, &["rev-parse", "--verify", "HEAD"], Some(repo_root))?;

    if !output.succeeded() {
        return Err(GitError::NoCommits);
    }

    Ok(())
}

/// Returns the checked-out branch, or `None` on a detached HEAD.
pub fn current_branch(
    repo_root: &Path,
    runner: &dyn CommandRunner,
) -> Result<Option<String>, GitError> {
    let args = ["symbolic-ref", "--quiet", "--short", "HEAD"];
    let output = run_git(runner, &args, Some(repo_root))?;

    match output.status_code {
        0 => Ok(Some(first_non_empty_stdout_line(
            &output,
            "git symbolic-ref returned empty branch name",
        )?)),
        1 => Ok(None),
        status => Err(GitError::CommandFailed {
            command: args.join(" "),
            status,
            stderr: output.stderr.trim().to_string(),
        }),
    }
}

/// Looks up a local branch and its configured upstream.
pub fn find_branch(
    repo_root: &Path,
    branch_name: &str,
    runner: &dyn CommandRunner,
) -> Result<Option<BranchRef>, GitError> {
    let pattern = format!("refs/heads/{branch_name}");
    let output = run_git_checked(
        runner,
        &[
            "for-each-ref",
            "--format=%(refname)%1f%(upstream:remotename)%1f%(upstream:remoteref)",
            pattern.as_str(),
        ],
        Some(repo_root),
    )?;

    for line in output.stdout.lines() {
        let mut fields = line.split(FIELD_SEPARATOR);
        let refname = fields.next().unwrap_or_default();
        if refname != pattern {
            continue;
        }

        let remote = fields.next().unwrap_or_default().trim();
        let remote_ref = fields.next().unwrap_or_default().trim();
        return Ok(Some(BranchRef {
            name: branch_name.to_string(),
            upstream: parse_upstream(remote, remote_ref),
        }));
    }

    Ok(None)
}

fn parse_upstream(remote: &str, remote_ref: &str) -> Option<UpstreamRef> {
    // "." marks an upstream that is another local branch.
    if remote.is_empty() || remote == "." || remote_ref.is_empty() {
        return None;
    }

    let branch = remote_ref.strip_prefix("refs/heads/").unwrap_or(remote_ref);
    Some(UpstreamRef {
        remote: remote.to_string(),
        branch: branch.to_string(),
    })
}

/// Counts commits on `branch` missing from `base` (ahead) and the reverse
/// (behind). Returns `None` when git cannot compare the two revisions.
pub fn ahead_behind(
    repo_root: &Path,
    base: &str,
    branch: &str,
    runner: &dyn CommandRunner,
) -> Result<Option<AheadBehind>, GitError> {
    let range = format!("{base}...{branch}");
    let output = run_git(
        runner,
        &["rev-list", "--left-right", "--count", range.as_str()],
        Some(repo_root),
    )?;

    if !output.succeeded() {
        return Ok(None);
    }

    parse_left_right_counts(&output.stdout).map(Some)
}

fn parse_left_right_counts(raw: &str) -> Result<AheadBehind, GitError> {
    let mut counts = raw.split_whitespace().map(str::parse::<usize>);
    match (counts.next(), counts.next(), counts.next()) {
        (Some(Ok(behind)), Some(Ok(ahead)), None) => Ok(AheadBehind { ahead, behind }),
        _ => Err(GitError::Parse(format!(
            "expected two counts from git rev-list, got '{}'",
            raw.trim()
        ))),
    }
}

pub fn remote_branch_exists(
    repo_root: &Path,
    upstream: &UpstreamRef,
    runner: &dyn CommandRunner,
) -> Result<bool, GitError> {
    let tracking_ref = format!("refs/remotes/{}/{}", upstream.remote, upstream.branch);
    let args = ["show-ref", "--verify", "--quiet", tracking_ref.as_str()];
    let output = run_git(runner, &args, Some(repo_root))?;

    match output.status_code {
        0 => Ok(true),
        1 => Ok(false),
        status => Err(GitError::CommandFailed {
            command: args.join(" "),
            status,
            stderr: output.stderr.trim().to_string(),
        }),
    }
}

/// Computes whether `branch` merges cleanly into `base` without touching the
/// working tree.
pub fn merge_status(
    repo_root: &Path,
    base: &str,
    branch: &str,
    runner: &dyn CommandRunner,
) -> Result<MergeStatus, GitError> {
    let output = run_git(
        runner,
        &[
            "merge-tree",
            "--write-tree",
            "--name-only",
            "--no-messages",
            base,
            branch,
        ],
        Some(repo_root),
    )?;

    Ok(match output.status_code {
        0 => MergeStatus::Clean,
        1 => MergeStatus::Conflicted {
            conflicted_files: count_conflicted_files(&output.stdout),
        },
        _ => MergeStatus::Invalid,
    })
}

fn count_conflicted_files(raw: &str) -> usize {
    // First line is the written tree id; conflicted paths follow until a blank line.
    raw.lines()
        .skip(1)
        .map(str::trim)
        .take_while(|line| !line.is_empty())
        .collect::<BTreeSet<_>>()
        .len()
}

pub fn delete_local_branch(
    repo_root: &Path,
    branch_name: &str,
    runner: &dyn CommandRunner,
) -> Result<(), GitError> {
    let branch = non_empty_trimmed(branch_name, "branch name cannot be empty")?;

    run_git_checked(runner, &["branch", "-D", branch], Some(repo_root))?;
    Ok(())
}

pub fn delete_remote_branch(
    repo_root: &Path,
    upstream: &UpstreamRef,
    runner: &dyn CommandRunner,
) -> Result<(), GitError> {
    let remote = non_empty_trimmed(&upstream.remote, "remote name cannot be empty")?;
    let branch = non_empty_trimmed(&upstream.branch, "remote branch name cannot be empty")?;

    run_git_checked(
        runner,
        &["push", remote, "--delete", branch],
        Some(repo_root),
    )?;
    Ok(())
}

/// Merges `branch_name` into the checked-out branch. A conflicting merge is
/// aborted so the working tree is left as it was.
pub fn merge_branch(
    repo_root: &Path,
    branch_name: &str,
    runner: &dyn CommandRunner,
) -> Result<(), GitError> {
    let branch = non_empty_trimmed(branch_name, "branch name cannot be empty")?;

    let args = ["merge", "--no-edit", branch];
    let output = run_git(runner, &args, Some(repo_root))?;
    if output.succeeded() {
        return Ok(());
    }

    if merge_in_progress(repo_root, runner)? {
        run_git_checked(runner, &["merge", "--abort"], Some(repo_root))?;
        return Err(GitError::MergeConflict {
            branch: branch.to_string(),
        });
    }

    command_adapter::ensure_success(&args, output)
        .map(|_| ())
        .map_err(|failure| GitError::CommandFailed {
            command: failure.command,
            status: failure.status,
            stderr: failure.stderr,
        })
}

/// A merge stopped by conflicts leaves `MERGE_HEAD` behind; refusals such as
/// a dirty working tree do not.
fn merge_in_progress(repo_root: &Path, runner: &dyn CommandRunner) -> Result<bool, GitError> {
    let output = run_git(
        runner,
        &["rev-parse", "-q", "--verify", "MERGE_HEAD"],
        Some(repo_root),
    )?;
    Ok(output.succeeded())
}

fn non_empty_trimmed<'a>(value: &'a str, message: &str) -> Result<&'a str, GitError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GitError::Parse(message.to_string()));
    }

    Ok(trimmed)
}

fn first_non_empty_stdout_line(output: &CommandOutput, message: &str) -> Result<String, GitError> {
    output
        .stdout
        .lines()
        .next()
        .and_then(|line| {
            let trimmed = line.trim();
            (!trimmed.is_empty()).then_some(trimmed.to_string())
        })
        .ok_or_else(|| GitError::Parse(message.to_string()))
}

fn run_git_checked(
    runner: &dyn CommandRunner,
    args: &[&str],
    cwd: Option<&Path>,
) -> Result<CommandOutput, GitError> {
    let output = run_git(runner, args, cwd)?;
    command_adapter::ensure_success(args, output).map_err(|failure| GitError::CommandFailed {
        command: failure.command,
        status: failure.status,
        stderr: failure.stderr,
    })
}

fn run_git(
    runner: &dyn CommandRunner,
    args: &[&str],
    cwd: Option<&Path>,
) -> Result<CommandOutput, GitError> {
    command_adapter::run_program(runner, "git", args, cwd).map_err(GitError::Execute)
}

#[cfg(test)]
mod tests {
    use crate::test_support::{ScriptedGit, reply};
    use std::path::Path;

    use super::*;

    #[test]
    fn ensure_has_commits_returns_no_commits_error() {
        let runner = ScriptedGit::replying(vec![reply(
            "",
            "fatal: ambiguous argument 'HEAD': unknown revision",
            128,
        )]);

        let error = ensure_has_commits(Path::new("."), &runner).expect_err("should fail");
        assert!(matches!(error, GitError::NoCommits));
    }

    #[test]
    fn current_branch_reads_head_name_and_detached_head() {
        let runner = ScriptedGit::replying(vec![reply("main\n", "", 0), reply("", "", 1)]);

        assert_eq!(
            current_branch(Path::new("."), &runner).expect("branch"),
            Some("main".to_string())
        );
        assert_eq!(current_branch(Path::new("."), &runner).expect("detached"), None);
    }

    #[test]
    fn find_branch_parses_upstream_fields() {
        let runner = ScriptedGit::replying(vec![reply(
            "refs/heads/feature-y\u{1f}origin\u{1f}refs/heads/feature-y\n",
            "",
            0,
        )]);

        let branch = find_branch(Path::new("."), "feature-y", &runner)
            .expect("lookup")
            .expect("branch exists");

        assert_eq!(branch, BranchRef::tracking("feature-y", "origin", "feature-y"));
        assert_eq!(
            runner.command_lines(),
            ["git for-each-ref --format=%(refname)%1f%(upstream:remotename)%1f%(upstream:remoteref) refs/heads/feature-y"]
        );
    }

    #[test]
    fn find_branch_skips_nested_refs_and_reports_missing_branch() {
        let runner = ScriptedGit::replying(vec![reply(
            "refs/heads/feature/one\u{1f}\u{1f}\n",
            "",
            0,
        )]);

        let branch = find_branch(Path::new("."), "feature", &runner).expect("lookup");
        assert_eq!(branch, None);
    }

    #[test]
    fn find_branch_treats_local_upstream_as_untracked() {
        let runner = ScriptedGit::replying(vec![reply(
            "refs/heads/feature-z\u{1f}.\u{1f}refs/heads/main\n",
            "",
            0,
        )]);

        let branch = find_branch(Path::new("."), "feature-z", &runner)
            .expect("lookup")
            .expect("branch exists");
        assert_eq!(branch, BranchRef::local("feature-z"));
    }

    #[test]
    fn ahead_behind_maps_left_to_behind_and_right_to_ahead() {
        let runner = ScriptedGit::replying(vec![reply("2\t3\n", "", 0)]);

        let counts = ahead_behind(Path::new("."), "HEAD", "feature-x", &runner)
            .expect("counts")
            .expect("comparable");

        assert_eq!(counts, AheadBehind::new(3, 2));
        assert_eq!(
            runner.command_lines(),
            ["git rev-list --left-right --count HEAD...feature-x"]
        );
    }

    #[test]
    fn ahead_behind_is_unknown_when_git_cannot_compare() {
        let runner = ScriptedGit::replying(vec![reply("", "fatal: bad revision", 128)]);

        let counts = ahead_behind(Path::new("."), "HEAD", "feature-x", &runner).expect("counts");
        assert_eq!(counts, None);
    }

    #[test]
    fn ahead_behind_rejects_malformed_output() {
        let runner = ScriptedGit::replying(vec![reply("three\n", "", 0)]);

        let error =
            ahead_behind(Path::new("."), "HEAD", "feature-x", &runner).expect_err("parse error");
        assert!(matches!(error, GitError::Parse(_)));
    }

    #[test]
    fn remote_branch_exists_checks_tracking_ref() {
        let runner = ScriptedGit::replying(vec![reply("", "", 0), reply("", "", 1)]);
        let upstream = UpstreamRef {
            remote: "origin".to_string(),
            branch: "feature-y".to_string(),
        };

        assert!(remote_branch_exists(Path::new("."), &upstream, &runner).expect("exists"));
        assert!(!remote_branch_exists(Path::new("."), &upstream, &runner).expect("missing"));
        assert_eq!(
            runner.command_lines()[0],
            "git show-ref --verify --quiet refs/remotes/origin/feature-y"
        );
    }

    #[test]
    fn merge_status_counts_distinct_conflicted_paths() {
        let runner = ScriptedGit::replying(vec![
            reply("1111111\n", "", 0),
            reply("2222222\nsrc/a.rs\nsrc/a.rs\nsrc/b.rs\n", "", 1),
            reply("", "fatal: refusing to merge unrelated histories", 128),
        ]);

        assert_eq!(
            merge_status(Path::new("."), "HEAD", "feature-x", &runner).expect("clean"),
            MergeStatus::Clean
        );
        assert_eq!(
            merge_status(Path::new("."), "HEAD", "feature-x", &runner).expect("conflicted"),
            MergeStatus::Conflicted {
                conflicted_files: 2
            }
        );
        assert_eq!(
            merge_status(Path::new("."), "HEAD", "feature-x", &runner).expect("invalid"),
            MergeStatus::Invalid
        );
    }

    #[test]
    fn delete_local_branch_uses_capital_d() {
        let runner = ScriptedGit::replying(vec![reply("", "", 0)]);

        delete_local_branch(Path::new("/tmp/repo"), "feature-1", &runner).expect("deleted");

        assert_eq!(runner.command_lines(), ["git branch -D feature-1"]);
        assert_eq!(runner.cwd_of(0).as_deref(), Some(Path::new("/tmp/repo")));
    }

    #[test]
    fn delete_remote_branch_pushes_delete() {
        let runner = ScriptedGit::replying(vec![reply("", "", 0)]);
        let upstream = UpstreamRef {
            remote: "origin".to_string(),
            branch: "feature-y".to_string(),
        };

        delete_remote_branch(Path::new("."), &upstream, &runner).expect("deleted");
        assert_eq!(runner.command_lines(), ["git push origin --delete feature-y"]);
    }

    #[test]
    fn merge_branch_aborts_conflicting_merge() {
        let runner = ScriptedGit::replying(vec![
            reply(
                "CONFLICT (content): Merge conflict in a.txt\nAutomatic merge failed; fix conflicts and then commit the result.\n",
                "",
                1,
            ),
            reply("5d6e7f8a\n", "", 0),
            reply("", "", 0),
        ]);

        let error = merge_branch(Path::new("."), "feature-x", &runner).expect_err("conflict");

        assert!(matches!(error, GitError::MergeConflict { .. }));
        assert_eq!(
            runner.command_lines(),
            [
                "git merge --no-edit feature-x",
                "git rev-parse -q --verify MERGE_HEAD",
                "git merge --abort",
            ]
        );
    }

    #[test]
    fn merge_branch_aborts_conflict_reported_in_another_language() {
        let runner = ScriptedGit::replying(vec![
            reply(
                "KONFLIKT (Inhalt): Merge-Konflikt in a.txt\nAutomatischer Merge fehlgeschlagen.\n",
                "",
                1,
            ),
            reply("5d6e7f8a\n", "", 0),
            reply("", "", 0),
        ]);

        let error = merge_branch(Path::new("."), "feature-x", &runner).expect_err("conflict");

        assert!(matches!(error, GitError::MergeConflict { .. }));
        assert_eq!(runner.command_lines()[2], "git merge --abort");
    }

    #[test]
    fn merge_branch_reports_other_failures_without_abort() {
        let runner = ScriptedGit::replying(vec![
            reply(
                "",
                "error: Your local changes would be overwritten by merge.",
                2,
            ),
            reply("", "", 1),
        ]);

        let error = merge_branch(Path::new("."), "feature-x", &runner).expect_err("failure");

        assert!(matches!(error, GitError::CommandFailed { status: 2, .. }));
        assert_eq!(
            runner.command_lines(),
            [
                "git merge --no-edit feature-x",
                "git rev-parse -q --verify MERGE_HEAD",
            ]
        );
    }
}
