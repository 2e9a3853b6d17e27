//! Modal-surface rendering helpers shared by the add form and the
//! password prompt.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tui_input::Input;

use crate::theme;

/// A centered rect of at most `width` x `height` inside `area`.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    Rect::new(area.x + x, area.y + y, width, height)
}

/// Paint a solid backdrop so the modal doesn't blend into the cards below.
pub fn fill_background(frame: &mut Frame, area: Rect) {
    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        area,
    );
}

/// Render one labelled text field. The value is masked when `mask` is set
/// (password input). Focused fields get the accent border.
pub fn render_text_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    input: &Input,
    focused: bool,
    mask: bool,
) {
    let border = if focused {
        theme::border_focused()
    } else {
        theme::border_default()
    };

    let block = Block::default()
        .title(Span::styled(format!(" {label} "), theme::field_label()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let shown = if mask {
        "•".repeat(input.value().chars().count())
    } else {
        input.value().to_owned()
    };

    // Keep the cursor in view on long values.
    let scroll = input.visual_scroll(usize::from(inner.width.saturating_sub(1)));
    let paragraph = Paragraph::new(Line::from(Span::styled(shown, theme::field_value())))
        .scroll((0, u16::try_from(scroll).unwrap_or(0)));
    frame.render_widget(paragraph, inner);

    if focused {
        let cursor_x = u16::try_from(input.visual_cursor().saturating_sub(scroll)).unwrap_or(0);
        frame.set_cursor_position((inner.x + cursor_x, inner.y));
    }
}
