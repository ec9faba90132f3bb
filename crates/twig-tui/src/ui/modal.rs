use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Clear;

use crate::centered_rect;
use crate::theme;
use crate::ui::text::{key_hint_height, key_hint_paragraph, wrapped_paragraph};

/// Share of the screen a modal occupies, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ModalSize {
    pub(crate) width_pct: u16,
    pub(crate) height_pct: u16,
}

impl ModalSize {
    pub(crate) const DIALOG: Self = Self {
        width_pct: 64,
        height_pct: 50,
    };
    pub(crate) const ERROR: Self = Self {
        width_pct: 80,
        height_pct: 60,
    };
}

pub(crate) struct ModalSpec<'a> {
    pub(crate) title: &'a str,
    pub(crate) title_style: Style,
    pub(crate) body: Text<'a>,
    pub(crate) key_hint: &'a str,
    pub(crate) size: ModalSize,
}

/// Draws a centered dialog. Key hints go in a separate box right below the
/// dialog, above it when the bottom is cut off, and inside it as a last resort.
pub(crate) fn render_modal(frame: &mut Frame<'_>, spec: ModalSpec<'_>) {
    let screen = frame.area();
    let area = centered_rect(spec.size.width_pct, spec.size.height_pct, screen);
    let footer_height = key_hint_height(area.width, spec.key_hint);

    let (body_area, hint_area) = match hint_area(screen, area, footer_height) {
        Some(hint_area) => (area, hint_area),
        None => {
            let [body, hint] = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(footer_height)])
                .areas(area);
            (body, hint)
        }
    };

    let title = Line::from(Span::styled(spec.title.to_string(), spec.title_style));
    frame.render_widget(Clear, body_area);
    frame.render_widget(
        wrapped_paragraph(spec.body).block(theme::chrome(title)),
        body_area,
    );

    frame.render_widget(Clear, hint_area);
    frame.render_widget(
        key_hint_paragraph(spec.key_hint).block(theme::key_block()),
        hint_area,
    );
}

fn hint_area(screen: Rect, body: Rect, footer_height: u16) -> Option<Rect> {
    let below_y = body.y.saturating_add(body.height);
    if below_y.saturating_add(footer_height) <= screen.y.saturating_add(screen.height) {
        return Some(Rect::new(body.x, below_y, body.width, footer_height));
    }

    let above_y = body.y.saturating_sub(footer_height);
    if above_y >= screen.y {
        return Some(Rect::new(body.x, above_y, body.width, footer_height));
    }

    None
}

pub(crate) fn render_error_modal(frame: &mut Frame<'_>, message: &str) {
    let mut lines = vec![Line::from("Operation failed."), Line::from("")];
    lines.extend(message_lines(message));

    render_modal(
        frame,
        ModalSpec {
            title: "Error",
            title_style: theme::error_prompt(),
            body: Text::from(lines),
            key_hint: "Enter/Esc: continue",
            size: ModalSize::ERROR,
        },
    );
}

fn message_lines(message: &str) -> Vec<Line<'static>> {
    let message = message.trim_end();
    if message.is_empty() {
        return vec![Line::from("")];
    }

    message
        .lines()
        .map(|line| Line::from(line.to_string()))
        .collect()
}
