use std::io::{Stdout, stdout};

use anyhow::{Context, Result, anyhow};
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::{Frame, Terminal};

/// Raw-mode and alternate-screen switches, split out so a failed setup can be
/// unwound step by step.
pub(crate) trait TerminalSetup {
    type Output;

    fn enable_raw_mode(&mut self) -> Result<()>;
    fn enter_screen(&mut self) -> Result<()>;
    fn create(&mut self) -> Result<Self::Output>;
    fn leave_screen(&mut self) -> Result<()>;
    fn disable_raw_mode(&mut self) -> Result<()>;
}

struct CrosstermSetup;

impl TerminalSetup for CrosstermSetup {
    type Output = Terminal<CrosstermBackend<Stdout>>;

    fn enable_raw_mode(&mut self) -> Result<()> {
        enable_raw_mode().context("failed to enable raw mode")
    }

    fn enter_screen(&mut self) -> Result<()> {
        execute!(stdout(), EnterAlternateScreen, Hide).context("failed to enter alternate screen")
    }

    fn create(&mut self) -> Result<Self::Output> {
        Terminal::new(CrosstermBackend::new(stdout())).context("failed to create terminal backend")
    }

    fn leave_screen(&mut self) -> Result<()> {
        execute!(stdout(), Show, LeaveAlternateScreen)
            .context("failed to restore terminal screen during rollback")
    }

    fn disable_raw_mode(&mut self) -> Result<()> {
        disable_raw_mode().context("failed to disable raw mode during rollback")
    }
}

/// Runs `setup` in order. When a step fails, the steps that already
/// succeeded are undone and any undo failures are appended to the error.
pub(crate) fn enter_with<S: TerminalSetup>(setup: &mut S) -> Result<S::Output> {
    setup.enable_raw_mode()?;

    let mut screen_entered = false;
    let result = setup.enter_screen().and_then(|()| {
        screen_entered = true;
        setup.create()
    });

    result.map_err(|error| {
        let mut undo_failures = Vec::new();
        if screen_entered && let Err(undo) = setup.leave_screen() {
            undo_failures.push(format!("{undo:#}"));
        }
        if let Err(undo) = setup.disable_raw_mode() {
            undo_failures.push(format!("{undo:#}"));
        }

        if undo_failures.is_empty() {
            error
        } else {
            anyhow!(
                "{error:#}\nterminal rollback cleanup failed: {}",
                undo_failures.join("\n")
            )
        }
    })
}

pub(crate) struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    pub(crate) fn enter() -> Result<Self> {
        let terminal = enter_with(&mut CrosstermSetup)?;
        Ok(Self { terminal })
    }

    pub(crate) fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> Result<()> {
        self.terminal
            .draw(draw_fn)
            .map(|_| ())
            .context("failed to render terminal")
    }

    pub(crate) fn autoresize(&mut self) -> Result<()> {
        self.terminal
            .autoresize()
            .context("failed to autoresize terminal")
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(self.terminal.backend_mut(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}
