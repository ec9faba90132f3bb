use crossterm::event::{KeyCode, KeyEvent};

pub(crate) fn is_back(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Esc)
}

pub(crate) fn is_confirm(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Enter)
}

pub(crate) fn is_focus_next(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Right | KeyCode::Tab | KeyCode::Char('l'))
}

pub(crate) fn is_focus_prev(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h'))
}

pub(crate) fn is_toggle(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char(' '))
}

pub(crate) fn is_skip_merge(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('d'))
}
