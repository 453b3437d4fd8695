//! Modal dialog widgets: confirm menus, text input and notices

use afcdeck_app::{ConfirmDialogState, InputDialogState, InputPurpose, NoticeState};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::theme::styles;

use super::modal_overlay::prepare_modal;

const MIN_WIDTH: u16 = 40;
const MAX_WIDTH: u16 = 76;

/// Width fitting the widest line plus borders and padding
fn fit_width<'a>(lines: impl Iterator<Item = &'a str>) -> u16 {
    let widest = lines.map(|l| l.width()).max().unwrap_or(0) as u16;
    widest.saturating_add(6).clamp(MIN_WIDTH, MAX_WIDTH)
}

fn message_lines(message: &str) -> Vec<Line<'_>> {
    message
        .lines()
        .map(|l| Line::styled(l, styles::text_primary()))
        .collect()
}

/// Confirmation dialog or option menu.
///
/// Options are listed vertically; the selected one is highlighted.
pub struct ConfirmDialog<'a> {
    state: &'a ConfirmDialogState,
}

impl<'a> ConfirmDialog<'a> {
    pub fn new(state: &'a ConfirmDialogState) -> Self {
        Self { state }
    }
}

impl Widget for ConfirmDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let message_height = self.state.message.lines().count() as u16;
        let options_height = self.state.options.len() as u16;
        let width = fit_width(
            self.state
                .message
                .lines()
                .chain(std::iter::once(self.state.title.as_str())),
        );
        let height = message_height + options_height + 5;
        let modal = prepare_modal(buf, area, width, height);

        let block = styles::modal_block(&self.state.title, styles::border_active())
            .title_bottom(Line::from(vec![
                Span::styled(" ↑↓", styles::keybinding()),
                Span::styled(" choose  ", styles::text_muted()),
                Span::styled("Enter", styles::keybinding()),
                Span::styled(" select  ", styles::text_muted()),
                Span::styled("Esc", styles::keybinding()),
                Span::styled(" cancel ", styles::text_muted()),
            ]));
        let inner = block.inner(modal);
        block.render(modal, buf);

        let [_, message_area, _, options_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(message_height),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(inner);

        Paragraph::new(message_lines(&self.state.message))
            .alignment(Alignment::Center)
            .render(message_area, buf);

        let options: Vec<Line> = self
            .state
            .options
            .iter()
            .enumerate()
            .map(|(index, (label, _))| {
                if index == self.state.selected {
                    Line::styled(format!(" › {} ", label), styles::focused_selected())
                } else {
                    Line::styled(format!("   {} ", label), styles::text_secondary())
                }
            })
            .collect();
        Paragraph::new(options)
            .alignment(Alignment::Center)
            .render(options_area, buf);
    }
}

/// Single-line text prompt
pub struct InputDialog<'a> {
    state: &'a InputDialogState,
}

impl<'a> InputDialog<'a> {
    pub fn new(state: &'a InputDialogState) -> Self {
        Self { state }
    }

    fn hint(&self) -> Option<&'static str> {
        match self.state.purpose {
            InputPurpose::UploadFiles { .. } => Some("Separate multiple files with ;"),
            InputPurpose::DownloadTo { .. } => Some("Local folder; created if missing"),
            InputPurpose::InstallPackage | InputPurpose::ScreenshotPath => None,
        }
    }
}

impl Widget for InputDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let modal = prepare_modal(buf, area, MAX_WIDTH, 8);

        let block = styles::modal_block(&self.state.title, styles::border_active())
            .title_bottom(Line::from(vec![
                Span::styled(" Enter", styles::keybinding()),
                Span::styled(" confirm  ", styles::text_muted()),
                Span::styled("Esc", styles::keybinding()),
                Span::styled(" cancel ", styles::text_muted()),
            ]));
        let inner = block.inner(modal);
        block.render(modal, buf);

        let [prompt_area, _, value_area, hint_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(inner);

        Paragraph::new(Line::styled(self.state.prompt.as_str(), styles::text_secondary()))
            .render(prompt_area, buf);

        // Show the end of long paths; the cursor always sits at the end
        let room = value_area.width.saturating_sub(2) as usize;
        let value = &self.state.value;
        let mut start = 0;
        while value[start..].width() > room {
            start += value[start..].chars().next().map_or(1, char::len_utf8);
        }
        Paragraph::new(Line::from(vec![
            Span::styled(format!(" {}", &value[start..]), styles::text_primary()),
            Span::styled("█", styles::accent()),
        ]))
        .render(value_area, buf);

        if let Some(hint) = self.hint() {
            Paragraph::new(Line::styled(hint, styles::text_muted())).render(hint_area, buf);
        }
    }
}

/// Informational notice, dismissed with Enter or Esc
pub struct NoticeDialog<'a> {
    state: &'a NoticeState,
}

impl<'a> NoticeDialog<'a> {
    pub fn new(state: &'a NoticeState) -> Self {
        Self { state }
    }
}

impl Widget for NoticeDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = fit_width(
            self.state
                .message
                .lines()
                .chain(std::iter::once(self.state.title.as_str())),
        );
        // Wrapped lines may need more rows than the raw line count
        let inner_width = width.saturating_sub(4).max(1) as usize;
        let message_height: u16 = self
            .state
            .message
            .lines()
            .map(|l| l.width().max(1).div_ceil(inner_width) as u16)
            .sum();
        let modal = prepare_modal(buf, area, width, message_height + 4);

        let block = styles::modal_block(&self.state.title, styles::notice_border(self.state.level))
            .title_bottom(Line::from(vec![
                Span::styled(" Enter", styles::keybinding()),
                Span::styled(" dismiss ", styles::text_muted()),
            ]));
        let inner = block.inner(modal);
        block.render(modal, buf);

        let [_, message_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);
        Paragraph::new(message_lines(&self.state.message))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(message_area, buf);
    }
}
