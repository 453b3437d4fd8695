//! Semantic style builders.

use afcdeck_app::NoticeLevel;
use afcdeck_core::{ConnectionState, LogLevel};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders};

use super::palette;

// --- Text styles ---
pub fn text_primary() -> Style {
    Style::default().fg(palette::TEXT_PRIMARY)
}

pub fn text_secondary() -> Style {
    Style::default().fg(palette::TEXT_SECONDARY)
}

pub fn text_muted() -> Style {
    Style::default().fg(palette::TEXT_MUTED)
}

// --- Border styles ---
pub fn border_inactive() -> Style {
    Style::default().fg(palette::BORDER_DIM)
}

pub fn border_active() -> Style {
    Style::default().fg(palette::BORDER_ACTIVE)
}

// --- Accent styles ---
pub fn accent() -> Style {
    Style::default().fg(palette::ACCENT)
}

pub fn accent_bold() -> Style {
    Style::default()
        .fg(palette::ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn keybinding() -> Style {
    Style::default().fg(palette::STATUS_YELLOW)
}

/// "Black on Cyan" - the row under the cursor
pub fn focused_selected() -> Style {
    Style::default()
        .fg(palette::CONTRAST_FG)
        .bg(palette::ACCENT)
        .add_modifier(Modifier::BOLD)
}

// --- Block builders ---
pub fn glass_block(focused: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            border_active()
        } else {
            border_inactive()
        })
}

pub fn modal_block(title: &str, border: Style) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .style(Style::default().bg(palette::POPUP_BG))
}

// --- Indicators ---

/// Connection indicator for the header and status bar.
///
/// Returns `(icon, Style)`; the label comes from [`ConnectionState::label`].
pub fn connection_indicator(state: &ConnectionState) -> (&'static str, Style) {
    match state {
        ConnectionState::Connected => (
            "●",
            Style::default()
                .fg(palette::STATUS_GREEN)
                .add_modifier(Modifier::BOLD),
        ),
        ConnectionState::Connecting => (
            "↻",
            Style::default()
                .fg(palette::STATUS_YELLOW)
                .add_modifier(Modifier::BOLD),
        ),
        ConnectionState::Disconnected => ("○", Style::default().fg(palette::TEXT_MUTED)),
        ConnectionState::Failed(_) => (
            "✗",
            Style::default()
                .fg(palette::STATUS_RED)
                .add_modifier(Modifier::BOLD),
        ),
    }
}

pub fn log_level(level: LogLevel) -> Style {
    let color = match level {
        LogLevel::Debug => palette::LOG_DEBUG,
        LogLevel::Info => palette::LOG_INFO,
        LogLevel::Warning => palette::LOG_WARNING,
        LogLevel::Error => palette::LOG_ERROR,
    };
    Style::default().fg(color)
}

/// Border color of a notice dialog
pub fn notice_border(level: NoticeLevel) -> Style {
    let color = match level {
        NoticeLevel::Info => palette::STATUS_BLUE,
        NoticeLevel::Warning => palette::STATUS_YELLOW,
        NoticeLevel::Error => palette::STATUS_RED,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}
