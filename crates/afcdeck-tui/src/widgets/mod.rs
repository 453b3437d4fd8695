//! Custom widget components

mod app_list;
mod connection_screen;
mod device_info;
mod dialogs;
mod file_browser;
mod header;
pub mod modal_overlay;
mod status_bar;
mod syslog_view;

pub use app_list::AppList;
pub use connection_screen::{ActivityLog, ConnectionScreen};
pub use device_info::DeviceInfoPanel;
pub use dialogs::{ConfirmDialog, InputDialog, NoticeDialog};
pub use file_browser::FileBrowser;
pub use header::MainHeader;
pub use status_bar::{StatusBar, StatusBarCompact};
pub use syslog_view::SyslogView;

/// Rows `[start, end)` of a list of `len` items to draw in `rows` lines so
/// that `cursor` stays visible
pub(crate) fn visible_window(cursor: usize, len: usize, rows: usize) -> (usize, usize) {
    if rows == 0 || len == 0 {
        return (0, 0);
    }
    let start = cursor.saturating_sub(rows - 1).min(len.saturating_sub(rows));
    (start, (start + rows).min(len))
}

/// Truncate a name to max length, adding ellipsis if needed
pub(crate) fn truncate_name(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        name.to_string()
    } else if max_len <= 1 {
        "…".to_string()
    } else {
        let kept: String = name.chars().take(max_len - 1).collect();
        format!("{}…", kept)
    }
}
