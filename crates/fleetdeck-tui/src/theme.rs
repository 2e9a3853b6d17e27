//! Harbor palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const HARBOR_BLUE: Color = Color::Rgb(96, 165, 250); // #60a5fa
pub const SEAFOAM: Color = Color::Rgb(110, 231, 183); // #6ee7b7
pub const AMBER: Color = Color::Rgb(252, 211, 77); // #fcd34d
pub const RUNNING_GREEN: Color = Color::Rgb(74, 222, 128); // #4ade80
pub const ERROR_RED: Color = Color::Rgb(248, 113, 113); // #f87171

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(203, 213, 225); // #cbd5e1
pub const BORDER_GRAY: Color = Color::Rgb(71, 85, 105); // #475569
pub const BG_DARK: Color = Color::Rgb(15, 23, 42); // #0f172a
pub const STOPPED_GRAY: Color = Color::Rgb(148, 163, 184); // #94a3b8

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default()
        .fg(HARBOR_BLUE)
        .add_modifier(Modifier::BOLD)
}

/// Border for the selected card / focused panel.
pub fn border_focused() -> Style {
    Style::default().fg(SEAFOAM)
}

/// Border for an unfocused panel.
pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// The running status indicator.
pub fn status_running() -> Style {
    Style::default().fg(RUNNING_GREEN)
}

/// The stopped status indicator.
pub fn status_stopped() -> Style {
    Style::default().fg(STOPPED_GRAY)
}

/// Detail-field label text on a card.
pub fn field_label() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Detail-field value text on a card.
pub fn field_value() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Key character in a key-hint pair ("q" of "q quit").
pub fn key_hint_key() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}

/// Description in a key-hint pair.
pub fn key_hint() -> Style {
    Style::default().fg(STOPPED_GRAY)
}
