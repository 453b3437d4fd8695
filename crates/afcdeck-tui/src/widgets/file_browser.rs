//! File browser tab: path field plus the folder/file listing

use afcdeck_app::DeviceSession;
use afcdeck_core::LogLevel;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::layout;
use crate::theme::{palette, styles};

use super::visible_window;

pub struct FileBrowser<'a> {
    session: &'a DeviceSession,
}

impl<'a> FileBrowser<'a> {
    pub fn new(session: &'a DeviceSession) -> Self {
        Self { session }
    }

    fn render_path_field(&self, area: Rect, buf: &mut Buffer) {
        let editing = self.session.path_input.as_deref();
        let block = styles::glass_block(editing.is_some()).title(" Path ");
        let inner = block.inner(area);
        block.render(area, buf);

        let line = match editing {
            Some(value) => {
                let shown = tail_to_width(value, inner.width.saturating_sub(1) as usize);
                Line::from(vec![
                    Span::styled(shown, styles::text_primary()),
                    Span::styled("█", styles::accent()),
                ])
            }
            None => Line::from(vec![Span::styled(
                tail_to_width(self.session.current_path(), inner.width as usize),
                styles::text_secondary(),
            )]),
        };
        Paragraph::new(line).render(inner, buf);
    }

    fn entry_line(&self, name: &str, is_folder: bool, selected: bool) -> Line<'static> {
        let line = if is_folder {
            Line::from(vec![
                Span::raw("    "),
                Span::styled(
                    format!("{}/", name),
                    Style::default()
                        .fg(palette::FOLDER)
                        .add_modifier(Modifier::BOLD),
                ),
            ])
        } else if self.session.marked.contains(name) {
            Line::from(vec![
                Span::styled("[x] ", Style::default().fg(palette::MARKED)),
                Span::styled(name.to_string(), Style::default().fg(palette::MARKED)),
            ])
        } else {
            Line::from(vec![
                Span::styled("[ ] ", styles::text_muted()),
                Span::styled(name.to_string(), styles::text_primary()),
            ])
        };

        if selected {
            line.style(styles::focused_selected())
        } else {
            line
        }
    }

    fn render_listing(&self, area: Rect, buf: &mut Buffer) {
        let count = self.session.entry_count();
        let mut title = format!(" {} item(s)", count);
        if !self.session.marked.is_empty() {
            title.push_str(&format!(", {} marked", self.session.marked.len()));
        }
        title.push(' ');
        if self.session.directory_loading {
            title.push_str("- Loading... ");
        }

        let block = styles::glass_block(self.session.path_input.is_none())
            .title(title)
            .title_bottom(Line::from(vec![
                Span::styled(" Enter", styles::keybinding()),
                Span::styled(" open  ", styles::text_muted()),
                Span::styled("Bksp", styles::keybinding()),
                Span::styled(" up  ", styles::text_muted()),
                Span::styled("Space", styles::keybinding()),
                Span::styled(" mark  ", styles::text_muted()),
                Span::styled("u", styles::keybinding()),
                Span::styled(" upload  ", styles::text_muted()),
                Span::styled("d", styles::keybinding()),
                Span::styled(" download  ", styles::text_muted()),
                Span::styled("/", styles::keybinding()),
                Span::styled(" path ", styles::text_muted()),
            ]));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Vec::new();
        let error = self.session.directory.listing().and_then(|l| l.error.as_deref());
        if let Some(error) = error {
            lines.push(Line::styled(
                format!("Error: {}", error),
                styles::log_level(LogLevel::Error),
            ));
        }

        if count == 0 && error.is_none() {
            lines.push(Line::styled("(empty folder)", styles::text_muted()));
        }

        let rows = (inner.height as usize).saturating_sub(lines.len());
        let (start, end) = visible_window(self.session.file_cursor, count, rows);
        if let Some(listing) = self.session.directory.listing() {
            for index in start..end {
                if let Some((name, is_folder)) = listing.entry(index) {
                    let selected = index == self.session.file_cursor;
                    lines.push(self.entry_line(name, is_folder, selected));
                }
            }
        }

        Paragraph::new(lines).render(inner, buf);
    }
}

impl Widget for FileBrowser<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (path_area, list_area) = layout::split_file_browser(area);
        self.render_path_field(path_area, buf);
        self.render_listing(list_area, buf);
    }
}

/// Keep the end of `text` that fits in `width` columns
fn tail_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut kept = String::new();
    let mut used = 1; // leading ellipsis
    for c in text.chars().rev() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        kept.insert(0, c);
    }
    format!("…{}", kept)
}
