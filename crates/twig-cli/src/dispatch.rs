use std::path::Path;

use anyhow::{Result, bail};
use comfy_table::{Cell, ContentArrangement, Table};
use twig_app::{
    App, BranchDispatcher, DeleteBranchRequest, DeleteBranchWorkflow, DeleteResult, DeletionHost,
    InspectRequest, PollOutcome, PresentationMode, SystemBranchDispatcher,
};
use twig_core::branch::{Repository, plural};
use twig_core::config::TwigConfig;
use twig_tui::UiExit;

use crate::cli::{Cli, Command, DeleteArgs};
use crate::diagnostics::DiagnosticsSession;

pub fn run_with_deps(
    cli: Cli,
    app: &App<'_>,
    cwd: &Path,
    diagnostics: &DiagnosticsSession,
) -> Result<()> {
    match cli.command {
        Command::Inspect { branch } => run_inspect_command(app, cwd, &branch, diagnostics),
        Command::Delete(args) => run_delete_command(app, cwd, args, diagnostics),
    }
}

fn prepare_request(
    app: &App<'_>,
    cwd: &Path,
    branch: &str,
    diagnostics: &DiagnosticsSession,
) -> Result<(TwigConfig, DeleteBranchRequest)> {
    let config = app.ensure_config_ready()?;
    app.ensure_runtime_repo_ready(cwd)?;

    let request = app.inspect_branch(InspectRequest {
        cwd: cwd.to_path_buf(),
        branch_name: branch.to_string(),
    })?;
    diagnostics.record(format!("snapshot {request:?}"));
    diagnostics.record(format!("presentation mode {:?}", request.presentation_mode()));

    Ok((config, request))
}

fn run_inspect_command(
    app: &App<'_>,
    cwd: &Path,
    branch: &str,
    diagnostics: &DiagnosticsSession,
) -> Result<()> {
    let (_, request) = prepare_request(app, cwd, branch, diagnostics)?;
    println!("{}", snapshot_table(&request));
    Ok(())
}

fn run_delete_command(
    app: &App<'_>,
    cwd: &Path,
    args: DeleteArgs,
    diagnostics: &DiagnosticsSession,
) -> Result<()> {
    let (config, request) = prepare_request(app, cwd, &args.branch, diagnostics)?;

    if args.yes {
        let result = run_headless_delete(app, request, args.include_remote, diagnostics)?;
        println!("{}", deleted_message(&result));
        return Ok(());
    }

    let dispatcher = SystemBranchDispatcher::new();
    let record = |entry: &str| diagnostics.record(entry);
    match twig_tui::run_delete_branch(
        &dispatcher,
        request,
        config.dialog.platform_style,
        &record,
    )? {
        UiExit::Deleted(result) => println!("{}", deleted_message(&result)),
        UiExit::Canceled => println!("Delete canceled. No changes were made."),
    }

    Ok(())
}

struct HeadlessHost<'a> {
    diagnostics: &'a DiagnosticsSession,
}

impl DeletionHost for HeadlessHost<'_> {
    fn on_deleted(&mut self, repository: &Repository) {
        self.diagnostics
            .record(format!("branch deleted in {}", repository.root().display()));
    }

    fn on_dismissed(&mut self) {
        self.diagnostics.record("workflow closed");
    }
}

/// Confirms the direct-delete view without a terminal. Branches that would
/// lose commits are refused; merging needs the interactive dialog.
pub(crate) fn run_headless_delete(
    dispatcher: &dyn BranchDispatcher,
    request: DeleteBranchRequest,
    include_remote: bool,
    diagnostics: &DiagnosticsSession,
) -> Result<DeleteResult> {
    let mut workflow = DeleteBranchWorkflow::start(request);
    let branch = workflow.request().branch.name.clone();

    if workflow.mode() == Some(PresentationMode::UnmergedWarning) {
        let count = workflow.request().unmerged_commits().unwrap_or_default();
        bail!(
            "branch '{branch}' has {count} unmerged {}; run `twig delete {branch}` without --yes to merge it first",
            plural(count, "commit", "commits")
        );
    }

    if include_remote {
        if workflow.remote_deletion_eligible() {
            workflow.set_include_remote(true);
        } else {
            eprintln!("Note: '{branch}' has no copy on a remote; deleting the local branch only.");
        }
    }

    let operation = workflow.confirm(dispatcher);
    diagnostics.record(format!(
        "headless confirm {operation:?} (include remote: {})",
        workflow.include_remote_branch()
    ));

    let mut host = HeadlessHost { diagnostics };
    match workflow.wait(&mut host)? {
        PollOutcome::Deleted(result) => Ok(result),
        other => bail!("delete of '{branch}' did not complete: {other:?}"),
    }
}

fn deleted_message(result: &DeleteResult) -> String {
    match &result.remote_branch {
        Some(remote) => format!(
            "Deleted branch '{}' and its remote copy '{remote}'.",
            result.branch_name
        ),
        None => format!("Deleted branch '{}'.", result.branch_name),
    }
}

fn snapshot_table(request: &DeleteBranchRequest) -> Table {
    let upstream = request
        .branch
        .upstream
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "none".to_string());
    let (ahead, behind) = match request.ahead_behind {
        Some(counts) => (counts.ahead.to_string(), counts.behind.to_string()),
        None => ("unknown".to_string(), "unknown".to_string()),
    };
    let merge_status = request
        .merge_status
        .map(|status| status.label())
        .unwrap_or_else(|| "not needed".to_string());
    let confirmation = match request.presentation_mode() {
        PresentationMode::UnmergedWarning => "unmerged warning",
        PresentationMode::DirectConfirm => "direct confirm",
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);

    let rows = [
        ("Repository", request.repository.name().to_string()),
        ("Branch", request.branch.name.clone()),
        ("Upstream", upstream),
        ("On remote", yes_no(request.exists_on_remote).to_string()),
        ("Ahead", ahead),
        ("Behind", behind),
        ("Merge status", merge_status),
        ("Confirmation", confirmation.to_string()),
        (
            "Remote deletion",
            yes_no(request.remote_deletion_eligible()).to_string(),
        ),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }

    table
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
