//! Waiting / connecting / failed screen with the activity log

use std::collections::VecDeque;

use afcdeck_app::AppState;
use afcdeck_core::{ConnectionState, LogEntry};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::theme::styles;

/// Shown in the body while no device session exists
pub struct ConnectionScreen<'a> {
    state: &'a AppState,
}

impl<'a> ConnectionScreen<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn headline(&self) -> Vec<Line<'a>> {
        let (icon, style) = styles::connection_indicator(&self.state.connection);
        let mut lines = vec![Line::from(vec![
            Span::styled(icon, style),
            Span::raw(" "),
            Span::styled(self.state.connection.label(), style.add_modifier(Modifier::BOLD)),
        ])];

        match &self.state.connection {
            // The failure reason is multi-line and carries the hint text
            ConnectionState::Failed(reason) => {
                lines.push(Line::raw(""));
                lines.extend(
                    reason
                        .lines()
                        .map(|l| Line::styled(l.to_string(), styles::text_primary())),
                );
                lines.push(Line::raw(""));
                lines.push(Line::from(vec![
                    Span::styled("r", styles::keybinding()),
                    Span::styled(" retry  ", styles::text_muted()),
                    Span::styled("q", styles::keybinding()),
                    Span::styled(" quit", styles::text_muted()),
                ]));
            }
            _ => {
                lines.push(Line::raw(""));
                lines.push(Line::styled(self.state.status.clone(), styles::text_primary()));
                lines.push(Line::raw(""));
                lines.push(Line::styled(
                    "Attach an iOS device over USB and trust this computer.",
                    styles::text_muted(),
                ));
            }
        }
        lines
    }
}

impl Widget for ConnectionScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = styles::glass_block(true).title(" Connection ");
        let inner = block.inner(area);
        block.render(area, buf);

        let headline = self.headline();
        let headline_height = (headline.len() as u16 + 1).min(inner.height);
        let [top, bottom] = Layout::vertical([
            Constraint::Length(headline_height),
            Constraint::Min(0),
        ])
        .areas(inner);

        Paragraph::new(headline)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(top, buf);

        ActivityLog::new(&self.state.activity).render(bottom, buf);
    }
}

/// Newest activity entries, bottom-aligned
pub struct ActivityLog<'a> {
    entries: &'a VecDeque<LogEntry>,
}

impl<'a> ActivityLog<'a> {
    pub fn new(entries: &'a VecDeque<LogEntry>) -> Self {
        Self { entries }
    }
}

impl Widget for ActivityLog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let block = styles::glass_block(false).title(" Activity ");
        let inner = block.inner(area);
        block.render(area, buf);

        let visible = inner.height as usize;
        let skip = self.entries.len().saturating_sub(visible);
        let lines: Vec<Line> = self
            .entries
            .iter()
            .skip(skip)
            .map(|entry| {
                Line::from(vec![
                    Span::styled(entry.formatted_time(), styles::text_muted()),
                    Span::raw(" "),
                    Span::styled(entry.level.prefix(), styles::log_level(entry.level)),
                    Span::styled(
                        format!(" [{}] ", entry.source.prefix()),
                        styles::text_secondary(),
                    ),
                    Span::styled(entry.message.as_str(), styles::text_primary()),
                ])
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}
