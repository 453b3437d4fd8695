//! Status bar widget
//!
//! One line: connection indicator, the current status message and
//! pending notice count.

use afcdeck_app::AppState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::{palette, styles};

/// Full status bar for wide terminals
pub struct StatusBar<'a> {
    state: &'a AppState,
}

impl<'a> StatusBar<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn build_segments(&self) -> Vec<Span<'static>> {
        let separator = Span::styled(" │ ", Style::default().fg(palette::BORDER_DIM));
        let (icon, style) = styles::connection_indicator(&self.state.connection);

        let mut spans = vec![
            Span::raw(" "),
            Span::styled(format!("{} {}", icon, self.state.connection.label()), style),
            separator.clone(),
            Span::styled(first_line(&self.state.status), styles::text_primary()),
        ];

        if self.state.syslog_running() {
            spans.push(separator.clone());
            spans.push(Span::styled("syslog", styles::accent()));
        }

        let pending = self.state.notices.len();
        if pending > 1 {
            spans.push(separator);
            spans.push(Span::styled(
                format!("{} notices", pending),
                styles::keybinding(),
            ));
        }
        spans
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = self.build_segments();
        spans.push(Span::styled("  q", styles::keybinding()));
        spans.push(Span::styled(" quit", styles::text_muted()));
        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

/// Status message only, for narrow terminals
pub struct StatusBarCompact<'a> {
    state: &'a AppState,
}

impl<'a> StatusBarCompact<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }
}

impl Widget for StatusBarCompact<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (icon, style) = styles::connection_indicator(&self.state.connection);
        let line = Line::from(vec![
            Span::styled(format!("{} ", icon), style),
            Span::styled(first_line(&self.state.status), styles::text_primary()),
        ]);
        Paragraph::new(line).render(area, buf);
    }
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().to_string()
}
