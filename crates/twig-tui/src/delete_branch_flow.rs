use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::text::{Line, Span, Text};
use twig_app::{
    BranchDispatcher, BusyOperation, ConfirmOutcome, DeleteBranchRequest, DeleteBranchWorkflow,
    DeleteResult, DeletionHost, PollOutcome, PresentationMode, WorkflowPhase,
};
use twig_core::branch::Repository;
use twig_core::config::PlatformStyle;

use crate::UiExit;
use crate::keymap;
use crate::presentation::{self, DialogCopy};
use crate::theme;
use crate::ui::button_group::{Button, ButtonEvent, ButtonGroup};
use crate::ui::loading::LoadingState;
use crate::ui::modal::{ModalSize, ModalSpec, render_modal};
use crate::ui::text::{checkbox_line, compact_hint, label_value_line, strong_line};

#[derive(Debug, Default)]
struct ScreenHost {
    deleted_from: Option<Repository>,
    dismissed: bool,
}

impl DeletionHost for ScreenHost {
    fn on_deleted(&mut self, repository: &Repository) {
        self.deleted_from = Some(repository.clone());
    }

    fn on_dismissed(&mut self) {
        self.dismissed = true;
    }
}

/// Which of the two confirmation layouts to draw. While an operation runs
/// the layout that started it stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    UnmergedWarning,
    DirectConfirm,
}

pub(crate) struct DeleteBranchScreen {
    workflow: DeleteBranchWorkflow,
    copy: DialogCopy,
    buttons: ButtonGroup,
    loading: LoadingState,
    host: ScreenHost,
    notice: Option<String>,
    deleted: Option<DeleteResult>,
    events: Vec<String>,
}

impl DeleteBranchScreen {
    pub(crate) fn new(request: DeleteBranchRequest, style: PlatformStyle) -> Self {
        let workflow = DeleteBranchWorkflow::start(request);
        let events = vec![format!("dialog opened in {:?} view", workflow.phase())];

        Self {
            workflow,
            copy: DialogCopy::new(style),
            buttons: ButtonGroup::new(),
            loading: LoadingState::default(),
            host: ScreenHost::default(),
            notice: None,
            deleted: None,
            events,
        }
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.workflow.is_busy()
    }

    pub(crate) fn take_events(&mut self) -> Vec<String> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn exit(&self) -> Option<UiExit> {
        if !self.host.dismissed {
            return None;
        }

        Some(match &self.deleted {
            Some(result) => UiExit::Deleted(result.clone()),
            None => UiExit::Canceled,
        })
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent, dispatcher: &dyn BranchDispatcher) {
        if self.workflow.is_busy() || self.workflow.is_terminated() {
            return;
        }

        if keymap::is_toggle(key) {
            self.toggle_remote();
            return;
        }

        if keymap::is_skip_merge(key) {
            self.skip_merge();
            return;
        }

        match self.buttons.on_key(key) {
            ButtonEvent::Continue => {}
            ButtonEvent::Back => self.dismiss(),
            ButtonEvent::Activate(Button::Ok) => self.confirm(dispatcher),
            ButtonEvent::Activate(Button::Cancel) => match self.view() {
                View::UnmergedWarning => self.skip_merge(),
                View::DirectConfirm => self.dismiss(),
            },
        }
    }

    /// Closes the dialog unless an operation is running.
    pub(crate) fn cancel(&mut self) {
        self.dismiss();
    }

    /// Advances the spinner and applies a settled operation. A failure is
    /// returned for the error modal; the dialog stays open for a retry.
    pub(crate) fn on_tick(&mut self) -> Result<()> {
        if self.workflow.is_busy() {
            self.loading.next_frame();
        }

        match self.workflow.poll(&mut self.host) {
            Ok(PollOutcome::Idle | PollOutcome::Running) => Ok(()),
            Ok(PollOutcome::Merged(result)) => {
                let notice = presentation::merged_notice(&result);
                self.events.push(notice.clone());
                self.notice = Some(notice);
                self.buttons.reset();
                Ok(())
            }
            Ok(PollOutcome::Deleted(result)) => {
                let repository = self
                    .host
                    .deleted_from
                    .as_ref()
                    .map(Repository::name)
                    .unwrap_or("repo");
                self.events.push(format!(
                    "deleted branch '{}' from {repository} (remote: {})",
                    result.branch_name,
                    result.remote_branch.as_deref().unwrap_or("kept")
                ));
                self.deleted = Some(result);
                Ok(())
            }
            Err(error) => {
                self.events.push(format!("operation failed: {error}"));
                self.buttons.reset();
                Err(error.into())
            }
        }
    }

    fn toggle_remote(&mut self) {
        if self.workflow.mode() != Some(PresentationMode::DirectConfirm)
            || !self.workflow.remote_deletion_eligible()
        {
            return;
        }

        self.workflow.toggle_include_remote();
        self.events.push(format!(
            "include remote branch set to {}",
            self.workflow.include_remote_branch()
        ));
    }

    fn skip_merge(&mut self) {
        if self.workflow.skip_merge() {
            self.buttons.reset();
            self.events.push("merge skipped".to_string());
        }
    }

    fn confirm(&mut self, dispatcher: &dyn BranchDispatcher) {
        if let ConfirmOutcome::Dispatched(operation) = self.workflow.confirm(dispatcher) {
            self.notice = None;
            self.events.push(format!(
                "dispatched {operation:?} for '{}' (include remote: {})",
                self.workflow.request().branch.name,
                self.workflow.include_remote_branch()
            ));
        }
    }

    fn dismiss(&mut self) {
        if self.workflow.dismiss(&mut self.host) {
            self.events.push("dialog dismissed".to_string());
        }
    }

    fn view(&self) -> View {
        match self.workflow.phase() {
            WorkflowPhase::Confirming(PresentationMode::UnmergedWarning)
            | WorkflowPhase::Busy(BusyOperation::Merging) => View::UnmergedWarning,
            _ => View::DirectConfirm,
        }
    }

    pub(crate) fn render(&self, frame: &mut ratatui::Frame<'_>) {
        let key_hint = self.key_hint(frame.area().width);
        render_modal(
            frame,
            ModalSpec {
                title: self.copy.title(),
                title_style: theme::warning_prompt(),
                body: self.body(),
                key_hint,
                size: ModalSize::DIALOG,
            },
        );
    }

    fn body(&self) -> Text<'static> {
        let mut lines = match self.view() {
            View::UnmergedWarning => self.unmerged_warning_lines(),
            View::DirectConfirm => self.direct_confirm_lines(),
        };

        lines.push(Line::from(""));
        lines.push(self.footer_line());
        Text::from(lines)
    }

    fn unmerged_warning_lines(&self) -> Vec<Line<'static>> {
        let request = self.workflow.request();
        let mut lines = Vec::new();

        if let Some(count) = request.unmerged_commits() {
            lines.push(self.unmerged_line(count));
        }
        lines.push(Line::from(presentation::MERGE_FIRST_PROMPT));

        if let Some(status) = request.merge_status {
            lines.push(Line::from(""));
            lines.push(label_value_line("Merge status", status.label()));
        }

        lines
    }

    fn direct_confirm_lines(&self) -> Vec<Line<'static>> {
        let request = self.workflow.request();
        let mut lines = Vec::new();

        if let Some(notice) = &self.notice {
            lines.push(Line::from(Span::styled(
                notice.clone(),
                theme::success_prompt(),
            )));
            lines.push(Line::from(""));
        }

        lines.push(Line::from(vec![
            Span::raw("Delete branch "),
            Span::styled(request.branch.name.clone(), theme::reference()),
            Span::raw("?"),
        ]));
        lines.push(Line::from(presentation::IRREVERSIBLE_NOTE));

        if self.workflow.remote_deletion_eligible() {
            lines.push(Line::from(""));
            lines.push(strong_line(presentation::REMOTE_PROMPT));
            if let Some(count) = request.unmerged_commits() {
                lines.push(self.unmerged_line(count));
            }
            lines.push(checkbox_line(
                presentation::REMOTE_CHECKBOX_LABEL,
                self.workflow.include_remote_branch(),
            ));
        }

        lines
    }

    fn unmerged_line(&self, count: usize) -> Line<'static> {
        Line::from(vec![
            Span::styled(
                self.workflow.request().branch.name.clone(),
                theme::reference(),
            ),
            Span::raw(" has "),
            Span::styled(count.to_string(), theme::emphasis()),
            Span::raw(format!(" {}.", presentation::unmerged_commits_phrase(count))),
        ])
    }

    fn footer_line(&self) -> Line<'static> {
        match self.workflow.phase() {
            WorkflowPhase::Busy(BusyOperation::Merging) => self.loading.line(self.copy.merging()),
            WorkflowPhase::Busy(BusyOperation::Deleting) => {
                self.loading.line(self.copy.deleting())
            }
            _ => match self.view() {
                View::UnmergedWarning => self
                    .buttons
                    .line(self.copy.merge_and_delete(), self.copy.decline_merge()),
                View::DirectConfirm => self.buttons.line(self.copy.delete(), self.copy.cancel()),
            },
        }
    }

    fn key_hint(&self, width: u16) -> &'static str {
        if self.workflow.is_busy() {
            return "Working... input is disabled until the operation finishes";
        }

        match self.view() {
            View::UnmergedWarning => compact_hint(
                width,
                "Enter: activate    Left/Right or Tab: move    d: delete without merging    Esc: cancel",
                "Enter | Left/Right: move | d: skip merge | Esc: cancel",
            ),
            View::DirectConfirm if self.workflow.remote_deletion_eligible() => compact_hint(
                width,
                "Enter: activate    Left/Right or Tab: move    Space: delete on remote    Esc: cancel",
                "Enter | Left/Right: move | Space: remote | Esc: cancel",
            ),
            View::DirectConfirm => compact_hint(
                width,
                "Enter: activate    Left/Right or Tab: move    Esc: cancel",
                "Enter | Left/Right: move | Esc: cancel",
            ),
        }
    }
}
