//! Main render/view function (View in TEA pattern)

#[cfg(test)]
mod tests;

use afcdeck_app::{AppState, Modal, Tab};
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::Frame;

use super::{layout, widgets};
use crate::theme::palette;

/// Render the complete UI (View function in TEA)
///
/// Pure rendering; state is never modified here.
pub fn view(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    let bg_block = Block::default().style(Style::default().bg(palette::DEEPEST_BG));
    frame.render_widget(bg_block, area);

    let areas = layout::create(area);

    frame.render_widget(widgets::MainHeader::new(state), areas.header);

    match state.session.as_ref().filter(|_| state.is_connected()) {
        None => frame.render_widget(widgets::ConnectionScreen::new(state), areas.body),
        Some(session) => match state.tab {
            Tab::Info => frame.render_widget(widgets::DeviceInfoPanel::new(session), areas.body),
            Tab::Files => frame.render_widget(widgets::FileBrowser::new(session), areas.body),
            Tab::Apps => frame.render_widget(widgets::AppList::new(session), areas.body),
            Tab::Syslog => frame.render_widget(widgets::SyslogView::new(state), areas.body),
        },
    }

    if layout::use_compact_status(area) {
        frame.render_widget(widgets::StatusBarCompact::new(state), areas.status);
    } else {
        frame.render_widget(widgets::StatusBar::new(state), areas.status);
    }

    // Modals take precedence over queued notices
    match &state.modal {
        Some(Modal::Confirm(dialog)) => {
            frame.render_widget(widgets::ConfirmDialog::new(dialog), area)
        }
        Some(Modal::Input(input)) => frame.render_widget(widgets::InputDialog::new(input), area),
        None => {
            if let Some(notice) = state.current_notice() {
                frame.render_widget(widgets::NoticeDialog::new(notice), area);
            }
        }
    }
}
