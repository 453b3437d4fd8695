//! Screen layout definitions for the TUI

use ratatui::layout::{Constraint, Layout, Rect};

/// Screen areas for the main layout
#[derive(Debug, Clone, Copy)]
pub struct ScreenAreas {
    /// Title, device name and tab bar
    pub header: Rect,

    /// Active tab or the connection screen
    pub body: Rect,

    /// One-line status and key hints
    pub status: Rect,
}

/// Header (glass block with one inner row), body, status line
pub fn create(area: Rect) -> ScreenAreas {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .split(area);

    ScreenAreas {
        header: chunks[0],
        body: chunks[1],
        status: chunks[2],
    }
}

/// File browser: path field above the listing
pub fn split_file_browser(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).split(area);
    (chunks[0], chunks[1])
}

/// Use the compact status bar on narrow terminals
pub fn use_compact_status(area: Rect) -> bool {
    area.width < 70
}
