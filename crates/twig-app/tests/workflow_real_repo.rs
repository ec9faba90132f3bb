mod support;

use twig_app::{
    App, DeleteBranchWorkflow, DeletionHost, InspectRequest, PollOutcome, PresentationMode,
    SystemBranchDispatcher,
};
use twig_core::branch::{MergeStatus, Repository};
use twig_core::command_runner::SystemCommandRunner;

use support::{branch_exists, commit_file, init_repo, run_git};

#[derive(Default)]
struct Events(Vec<String>);

impl DeletionHost for Events {
    fn on_deleted(&mut self, repository: &Repository) {
        self.0.push(format!("deleted:{}", repository.name()));
    }

    fn on_dismissed(&mut self) {
        self.0.push("dismissed".to_string());
    }
}

fn inspect(app: &App<'_>, repo: &std::path::Path, branch: &str) -> twig_app::DeleteBranchRequest {
    app.inspect_branch(InspectRequest {
        cwd: repo.to_path_buf(),
        branch_name: branch.to_string(),
    })
    .expect("inspect")
}

#[test]
fn unmerged_branch_is_merged_then_deleted_in_real_repo() {
    let temp = tempfile::tempdir().expect("temp dir");
    let repo = init_repo(temp.path(), "desktop");
    run_git(&repo, &["checkout", "-b", "feature-x"]);
    commit_file(&repo, "feature.txt", "one\n", "feature one");
    commit_file(&repo, "feature.txt", "two\n", "feature two");
    run_git(&repo, &["checkout", "main"]);

    let runner = SystemCommandRunner::new();
    let app = App::new(&runner);
    let request = inspect(&app, &repo, "feature-x");

    assert_eq!(request.unmerged_commits(), Some(2));
    assert_eq!(request.merge_status, Some(MergeStatus::Clean));

    let dispatcher = SystemBranchDispatcher::new();
    let mut host = Events::default();
    let mut workflow = DeleteBranchWorkflow::start(request);
    assert_eq!(workflow.mode(), Some(PresentationMode::UnmergedWarning));

    workflow.confirm(&dispatcher);
    assert!(matches!(
        workflow.wait(&mut host).expect("merge"),
        PollOutcome::Merged(_)
    ));
    assert!(repo.join("feature.txt").exists());
    assert!(branch_exists(&repo, "feature-x"));

    workflow.confirm(&dispatcher);
    assert!(matches!(
        workflow.wait(&mut host).expect("delete"),
        PollOutcome::Deleted(_)
    ));
    assert!(!branch_exists(&repo, "feature-x"));
    assert_eq!(host.0, vec!["deleted:desktop", "dismissed"]);
}

#[test]
fn tracked_branch_is_deleted_locally_and_on_remote() {
    let temp = tempfile::tempdir().expect("temp dir");
    let remote = temp.path().join("origin.git");
    run_git(temp.path(), &["init", "--bare", "origin.git"]);

    let repo = init_repo(temp.path(), "desktop");
    let remote_path = remote.to_str().expect("path utf8");
    run_git(&repo, &["remote", "add", "origin", remote_path]);
    run_git(&repo, &["branch", "feature-y"]);
    run_git(&repo, &["push", "-u", "origin", "feature-y"]);

    let runner = SystemCommandRunner::new();
    let app = App::new(&runner);
    let request = inspect(&app, &repo, "feature-y");

    assert!(request.remote_deletion_eligible());
    assert_eq!(request.presentation_mode(), PresentationMode::DirectConfirm);

    let mut host = Events::default();
    let mut workflow = DeleteBranchWorkflow::start(request);
    workflow.set_include_remote(true);
    workflow.confirm(&app);

    match workflow.poll(&mut host).expect("delete") {
        PollOutcome::Deleted(result) => {
            assert_eq!(result.remote_branch.as_deref(), Some("origin/feature-y"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    assert!(!branch_exists(&repo, "feature-y"));
    assert!(!branch_exists(&remote, "feature-y"));
}

#[test]
fn conflicting_branch_reports_conflict_before_merging() {
    let temp = tempfile::tempdir().expect("temp dir");
    let repo = init_repo(temp.path(), "desktop");
    run_git(&repo, &["checkout", "-b", "feature-x"]);
    commit_file(&repo, "README.md", "feature\n", "feature edit");
    run_git(&repo, &["checkout", "main"]);
    commit_file(&repo, "README.md", "main\n", "main edit");

    let runner = SystemCommandRunner::new();
    let app = App::new(&runner);
    let request = inspect(&app, &repo, "feature-x");

    assert_eq!(
        request.merge_status,
        Some(MergeStatus::Conflicted {
            conflicted_files: 1
        })
    );

    let mut host = Events::default();
    let mut workflow = DeleteBranchWorkflow::start(request);
    workflow.confirm(&app);
    let error = workflow.poll(&mut host).expect_err("merge refused");

    assert!(error.to_string().contains("would conflict"));
    assert_eq!(workflow.mode(), Some(PresentationMode::UnmergedWarning));
    assert_eq!(
        std::fs::read_to_string(repo.join("README.md")).expect("readme"),
        "main\n"
    );
}

#[test]
fn retry_after_local_delete_failure_skips_removed_remote_copy() {
    let temp = tempfile::tempdir().expect("temp dir");
    let remote = temp.path().join("origin.git");
    run_git(temp.path(), &["init", "--bare", "origin.git"]);

    let repo = init_repo(temp.path(), "desktop");
    let remote_path = remote.to_str().expect("path utf8");
    run_git(&repo, &["remote", "add", "origin", remote_path]);
    run_git(&repo, &["branch", "feature-y"]);
    run_git(&repo, &["push", "-u", "origin", "feature-y"]);

    let runner = SystemCommandRunner::new();
    let app = App::new(&runner);
    let mut host = Events::default();
    let mut workflow = DeleteBranchWorkflow::start(inspect(&app, &repo, "feature-y"));
    workflow.set_include_remote(true);

    let lock = repo.join(".git/refs/heads/feature-y.lock");
    std::fs::write(&lock, "").expect("lock branch ref");

    workflow.confirm(&app);
    let error = workflow.poll(&mut host).expect_err("local delete blocked");
    assert!(error.to_string().contains("after removing 'origin/feature-y'"));
    assert!(!branch_exists(&remote, "feature-y"));
    assert!(branch_exists(&repo, "feature-y"));
    assert!(workflow.include_remote_branch());
    assert_eq!(workflow.mode(), Some(PresentationMode::DirectConfirm));

    std::fs::remove_file(&lock).expect("unlock branch ref");
    workflow.confirm(&app);
    match workflow.poll(&mut host).expect("retry deletes") {
        PollOutcome::Deleted(result) => {
            assert_eq!(result.remote_branch.as_deref(), Some("origin/feature-y"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(!branch_exists(&repo, "feature-y"));
    assert_eq!(host.0, vec!["deleted:desktop", "dismissed"]);
}

#[test]
fn branch_merged_into_checked_out_branch_needs_no_merge() {
    let temp = tempfile::tempdir().expect("temp dir");
    let repo = init_repo(temp.path(), "desktop");
    run_git(&repo, &["checkout", "-b", "feature-x"]);
    commit_file(&repo, "feature.txt", "one\n", "feature one");
    run_git(&repo, &["checkout", "main"]);
    run_git(&repo, &["checkout", "-b", "develop"]);
    run_git(&repo, &["merge", "--no-edit", "feature-x"]);

    let runner = SystemCommandRunner::new();
    let app = App::new(&runner);
    let request = inspect(&app, &repo, "feature-x");

    assert_eq!(request.unmerged_commits(), None);
    assert_eq!(request.merge_status, None);
    assert_eq!(request.presentation_mode(), PresentationMode::DirectConfirm);
}
