pub mod cli;
pub mod diagnostics;
pub mod dispatch;

use anyhow::{Context, Result};
use clap::Parser;
use twig_app::App;
use twig_core::command_runner::SystemCommandRunner;

use crate::cli::Cli;
use crate::diagnostics::DiagnosticsSession;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let diagnostics = DiagnosticsSession::initialize(cli.diagnostics)?;
    if let Some(path) = diagnostics.path() {
        eprintln!("Diagnostics enabled: {}", path.display());
    }

    let command_runner = SystemCommandRunner::new();
    let app = App::new(&command_runner);
    let cwd = std::env::current_dir().context("failed to determine current directory")?;

    let result = dispatch::run_with_deps(cli, &app, &cwd, &diagnostics);
    if let Err(error) = &result {
        diagnostics.record(format!("command failed: {error:#}"));
    }
    result
}
