//! Applications tab

use afcdeck_app::DeviceSession;
use afcdeck_core::{InstallType, LogLevel};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::{palette, styles};

use super::visible_window;

pub struct AppList<'a> {
    session: &'a DeviceSession,
}

impl<'a> AppList<'a> {
    pub fn new(session: &'a DeviceSession) -> Self {
        Self { session }
    }
}

impl Widget for AppList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let apps = self.session.apps.apps();
        let mut title = format!(" {} application(s) ", apps.len());
        if !self.session.marked_apps.is_empty() {
            title.push_str(&format!("{} marked ", self.session.marked_apps.len()));
        }
        if self.session.apps_loading {
            title.push_str("- Loading... ");
        }

        let block = styles::glass_block(true)
            .title(title)
            .title_bottom(Line::from(vec![
                Span::styled(" Enter", styles::keybinding()),
                Span::styled(" menu  ", styles::text_muted()),
                Span::styled("Space", styles::keybinding()),
                Span::styled(" mark  ", styles::text_muted()),
                Span::styled("i", styles::keybinding()),
                Span::styled(" install  ", styles::text_muted()),
                Span::styled("x", styles::keybinding()),
                Span::styled(" uninstall  ", styles::text_muted()),
                Span::styled("e", styles::keybinding()),
                Span::styled(" documents  ", styles::text_muted()),
                Span::styled("r", styles::keybinding()),
                Span::styled(" refresh ", styles::text_muted()),
            ]));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Vec::new();
        if let Some(error) = self.session.apps.error() {
            lines.push(Line::styled(
                format!("Error: {}", error),
                styles::log_level(LogLevel::Error),
            ));
        } else if apps.is_empty() && !self.session.apps_loading {
            lines.push(Line::styled("(no applications)", styles::text_muted()));
        }

        let rows = (inner.height as usize).saturating_sub(lines.len());
        let (start, end) = visible_window(self.session.app_cursor, apps.len(), rows);
        for (index, app) in apps.iter().enumerate().take(end).skip(start) {
            let kind_style = match app.install_type {
                InstallType::System => styles::text_muted(),
                _ => styles::accent(),
            };
            let marker = if self.session.marked_apps.contains(&app.bundle_id) {
                Span::styled("[x] ", Style::default().fg(palette::MARKED))
            } else {
                Span::styled("[ ] ", styles::text_muted())
            };
            let line = Line::from(vec![
                marker,
                Span::styled(app.name.clone(), styles::text_primary()),
                Span::styled(format!(" (v{})", app.version), styles::text_secondary()),
                Span::styled(format!(" [{}]", app.install_type.as_str()), kind_style),
                Span::styled(format!(" {}", app.bundle_id), styles::text_muted()),
            ]);
            if index == self.session.app_cursor {
                lines.push(line.style(styles::focused_selected()));
            } else {
                lines.push(line);
            }
        }

        Paragraph::new(lines).render(inner, buf);
    }
}
