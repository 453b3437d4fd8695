//! Device info tab

use afcdeck_app::DeviceSession;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Cell, Row, Table, Widget},
};

use crate::theme::styles;

pub struct DeviceInfoPanel<'a> {
    session: &'a DeviceSession,
}

impl<'a> DeviceInfoPanel<'a> {
    pub fn new(session: &'a DeviceSession) -> Self {
        Self { session }
    }
}

impl Widget for DeviceInfoPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snapshot = &self.session.snapshot;
        let block = styles::glass_block(true)
            .title(format!(" {} ", snapshot.name))
            .title_bottom(Line::from(vec![
                Span::styled(" r", styles::keybinding()),
                Span::styled(" refresh  ", styles::text_muted()),
                Span::styled("b", styles::keybinding()),
                Span::styled(" battery  ", styles::text_muted()),
                Span::styled("s", styles::keybinding()),
                Span::styled(" screenshot  ", styles::text_muted()),
                Span::styled("m", styles::keybinding()),
                Span::styled(" device menu ", styles::text_muted()),
            ]));

        let mut rows: Vec<Row> = self
            .session
            .info_rows
            .iter()
            .map(|(label, value)| {
                Row::new(vec![
                    Cell::from(Span::styled(format!("{}:", label), styles::accent())),
                    Cell::from(Span::styled(value.as_str(), styles::text_primary())),
                ])
            })
            .collect();

        rows.push(Row::new(vec![Cell::from(""), Cell::from("")]));
        rows.push(Row::new(vec![
            Cell::from(Span::styled("Device ID:", styles::accent())),
            Cell::from(Span::styled(snapshot.udid.as_str(), styles::text_secondary())),
        ]));
        rows.push(Row::new(vec![
            Cell::from(Span::styled("File access:", styles::accent())),
            Cell::from(Span::styled(
                format!("{} (base {})", snapshot.access_label(), snapshot.base_path),
                styles::text_secondary(),
            )),
        ]));

        Table::new(rows, [Constraint::Length(14), Constraint::Min(10)])
            .block(block)
            .column_spacing(1)
            .render(area, buf);
    }
}
