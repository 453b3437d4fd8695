//! Header bar widget
//!
//! App title, connection dot, device name and the tab bar.

use afcdeck_app::{AppState, Tab};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Tabs, Widget},
};

use crate::theme::{palette, styles};

use super::truncate_name;

pub struct MainHeader<'a> {
    state: &'a AppState,
}

impl<'a> MainHeader<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn title_line(&self, max_name: usize) -> Line<'static> {
        let (icon, icon_style) = styles::connection_indicator(&self.state.connection);
        let mut spans = vec![
            Span::raw(" "),
            Span::styled(icon, icon_style),
            Span::raw(" "),
            Span::styled("afcdeck", styles::accent_bold()),
        ];

        if let Some(session) = &self.state.session {
            spans.push(Span::styled(" / ", styles::text_muted()));
            spans.push(Span::styled(
                truncate_name(&session.snapshot.name, max_name),
                styles::text_primary(),
            ));
            spans.push(Span::styled(
                format!(" ({})", session.snapshot.access_label()),
                styles::text_secondary(),
            ));
        } else {
            spans.push(Span::styled(" / ", styles::text_muted()));
            spans.push(Span::styled(self.state.connection.label(), styles::text_secondary()));
        }
        Line::from(spans)
    }

    fn tabs(&self) -> Tabs<'static> {
        let titles: Vec<Line<'static>> = Tab::ALL
            .iter()
            .map(|tab| Line::from(format!("{} {}", tab.index() + 1, tab.title())))
            .collect();

        Tabs::new(titles)
            .select(self.state.tab.index())
            .style(styles::text_secondary())
            .highlight_style(styles::focused_selected())
            .divider(Span::styled("│", Style::default().fg(palette::BORDER_DIM)))
    }
}

impl Widget for MainHeader<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = styles::glass_block(false);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        // Tabs only make sense once there is a device to show
        if !self.state.is_connected() {
            Paragraph::new(self.title_line(inner.width as usize)).render(inner, buf);
            return;
        }

        let [title_area, tabs_area] =
            Layout::horizontal([Constraint::Min(20), Constraint::Length(60)]).areas(inner);
        Paragraph::new(self.title_line(title_area.width.saturating_sub(24) as usize))
            .render(title_area, buf);
        self.tabs().render(tabs_area, buf);
    }
}
