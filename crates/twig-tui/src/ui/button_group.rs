use crossterm::event::KeyEvent;
use ratatui::text::{Line, Span};

use crate::keymap;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Button {
    Ok,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ButtonEvent {
    Continue,
    Activate(Button),
    Back,
}

/// Ok/cancel pair at the bottom of a dialog. The ok button is destructive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ButtonGroup {
    focused: Button,
}

impl ButtonGroup {
    pub(crate) fn new() -> Self {
        Self {
            focused: Button::Ok,
        }
    }

    pub(crate) fn focused(&self) -> Button {
        self.focused
    }

    pub(crate) fn reset(&mut self) {
        self.focused = Button::Ok;
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent) -> ButtonEvent {
        if keymap::is_back(key) {
            return ButtonEvent::Back;
        }

        if keymap::is_focus_next(key) || keymap::is_focus_prev(key) {
            self.focused = match self.focused {
                Button::Ok => Button::Cancel,
                Button::Cancel => Button::Ok,
            };
            return ButtonEvent::Continue;
        }

        if keymap::is_confirm(key) {
            ButtonEvent::Activate(self.focused)
        } else {
            ButtonEvent::Continue
        }
    }

    pub(crate) fn line(&self, ok_label: &str, cancel_label: &str) -> Line<'static> {
        Line::from(vec![
            Span::styled(
                format!("[ {ok_label} ]"),
                theme::button(self.focused() == Button::Ok, true),
            ),
            Span::raw("   "),
            Span::styled(
                format!("[ {cancel_label} ]"),
                theme::button(self.focused() == Button::Cancel, false),
            ),
        ])
    }
}
