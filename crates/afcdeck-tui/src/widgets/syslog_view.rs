//! Syslog tab

use afcdeck_app::AppState;
use afcdeck_core::LogLevel;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::styles;

pub struct SyslogView<'a> {
    state: &'a AppState,
}

impl<'a> SyslogView<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn title(&self) -> Line<'static> {
        let (label, style) = if self.state.syslog_running() {
            ("● streaming", styles::log_level(LogLevel::Info))
        } else {
            ("○ stopped", styles::text_muted())
        };
        let mut spans = vec![
            Span::raw(" Syslog "),
            Span::styled(label, style),
            Span::styled(format!(" {} lines ", self.state.syslog.len()), styles::text_muted()),
        ];
        if self.state.syslog_scroll > 0 {
            spans.push(Span::styled(
                format!("↑ {} ", self.state.syslog_scroll),
                styles::keybinding(),
            ));
        }
        Line::from(spans)
    }
}

impl Widget for SyslogView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = styles::glass_block(true)
            .title(self.title())
            .title_bottom(Line::from(vec![
                Span::styled(" s", styles::keybinding()),
                Span::styled(" start/stop  ", styles::text_muted()),
                Span::styled("c", styles::keybinding()),
                Span::styled(" clear  ", styles::text_muted()),
                Span::styled("End", styles::keybinding()),
                Span::styled(" follow ", styles::text_muted()),
            ]));
        let inner = block.inner(area);
        block.render(area, buf);

        let syslog = &self.state.syslog;
        if syslog.is_empty() {
            Paragraph::new(Line::styled("Press s to start the device log.", styles::text_muted()))
                .render(inner, buf);
            return;
        }

        let end = syslog.len().saturating_sub(self.state.syslog_scroll);
        let start = end.saturating_sub(inner.height as usize);
        let lines: Vec<Line> = syslog
            .iter()
            .skip(start)
            .take(end - start)
            .map(|line| {
                if line.starts_with("--- SYSLOG ERROR") {
                    Line::styled(line.as_str(), styles::log_level(LogLevel::Error))
                } else {
                    Line::styled(line.as_str(), styles::text_primary())
                }
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}
