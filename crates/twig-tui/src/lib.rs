mod delete_branch_flow;
mod keymap;
mod presentation;
mod terminal;
mod theme;
mod ui;

use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use twig_app::{BranchDispatcher, DeleteBranchRequest, DeleteResult};
use twig_core::config::PlatformStyle;

use crate::delete_branch_flow::DeleteBranchScreen;
use crate::terminal::TerminalSession;
use crate::ui::modal::render_error_modal;

const TICK_RATE: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiExit {
    Deleted(DeleteResult),
    Canceled,
}

pub(crate) fn is_ctrl_c(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// The dialog plus the error modal that covers it after a failed operation.
struct DialogLoop {
    screen: DeleteBranchScreen,
    error: Option<String>,
}

impl DialogLoop {
    fn new(request: DeleteBranchRequest, platform_style: PlatformStyle) -> Self {
        Self {
            screen: DeleteBranchScreen::new(request, platform_style),
            error: None,
        }
    }

    fn on_key(&mut self, key: KeyEvent, dispatcher: &dyn BranchDispatcher) {
        if is_ctrl_c(key) {
            self.screen.cancel();
            return;
        }

        if self.error.is_some() {
            if keymap::is_confirm(key) || keymap::is_back(key) {
                self.error = None;
            }
            return;
        }

        self.screen.on_key(key, dispatcher);
        self.tick();
    }

    fn tick(&mut self) {
        if let Err(error) = self.screen.on_tick() {
            self.error = Some(format!("{error:#}"));
        }
    }

    fn render(&self, frame: &mut Frame<'_>) {
        self.screen.render(frame);
        if let Some(message) = self.error.as_deref() {
            render_error_modal(frame, message);
        }
    }
}

/// Shows the delete-branch dialog for `request` until it is dismissed or the
/// branch is deleted. `record` receives one line per workflow event.
pub fn run_delete_branch(
    dispatcher: &dyn BranchDispatcher,
    request: DeleteBranchRequest,
    platform_style: PlatformStyle,
    record: &dyn Fn(&str),
) -> Result<UiExit> {
    let mut session = TerminalSession::enter()?;
    let mut dialog = DialogLoop::new(request, platform_style);

    loop {
        dialog.screen.take_events().iter().for_each(|entry| record(entry));
        if let Some(exit) = dialog.screen.exit() {
            return Ok(exit);
        }

        session.draw(|frame| dialog.render(frame))?;

        if !event::poll(TICK_RATE).context("failed to poll terminal event")? {
            dialog.tick();
            continue;
        }

        match event::read().context("failed to read terminal event")? {
            Event::Resize(_, _) => session.autoresize()?,
            Event::Key(key) if key.kind == KeyEventKind::Press => dialog.on_key(key, dispatcher),
            _ => {}
        }
    }
}

/// Middle `percent_x` by `percent_y` portion of `area`.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let scale = |length: u16, percent: u16| {
        (u32::from(length) * u32::from(percent.min(100)) / 100) as u16
    };

    let width = scale(area.width, percent_x);
    let height = scale(area.height, percent_y);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
