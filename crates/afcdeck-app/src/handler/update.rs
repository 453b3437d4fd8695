//! Main update function - handles state transitions (TEA pattern)
//!
//! Handler implementations live in the sibling modules; this function only
//! matches the message kind to its handler.

use afcdeck_core::LogSource;

use crate::message::Message;
use crate::shared::StopFlag;
use crate::state::{AppState, Tab};

use super::{apps, connection, device, dialogs, files, keys::handle_key, UpdateAction, UpdateResult};

/// Rows moved by PageUp / PageDown
const PAGE_SIZE: usize = 10;

/// Process a message and update state
/// Returns optional follow-up message and/or action
pub fn update(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        Message::Key(key) => match handle_key(state, key) {
            Some(msg) => UpdateResult::message(msg),
            None => UpdateResult::none(),
        },

        Message::Tick => UpdateResult::none(),

        Message::Quit => {
            state.stop_background();
            state.request_quit();
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Watcher / Connector
        // ─────────────────────────────────────────────────────────
        Message::StartWatcher => connection::handle_start_watcher(state),
        Message::WatcherStatus { message } => connection::handle_watcher_status(state, message),
        Message::DeviceDetected { udid } => connection::handle_device_detected(state, udid),
        Message::WatcherFailed { error } => connection::handle_watcher_failed(state, error),
        Message::Retry => connection::handle_retry(state),
        Message::ConnectProgress { message } => connection::handle_connect_progress(state, message),
        Message::ConnectWarning { message } => connection::handle_connect_warning(state, message),
        Message::Connected(success) => connection::handle_connected(state, *success),
        Message::ConnectFailed { reason } => connection::handle_connect_failed(state, reason),
        Message::DeviceDisconnected { reason } => {
            connection::handle_device_disconnected(state, reason)
        }

        // ─────────────────────────────────────────────────────────
        // Navigation
        // ─────────────────────────────────────────────────────────
        Message::SwitchTab(tab) => handle_switch_tab(state, tab),
        Message::NextTab => UpdateResult::message(Message::SwitchTab(state.tab.next())),
        Message::PrevTab => UpdateResult::message(Message::SwitchTab(state.tab.prev())),
        Message::CursorUp => move_cursor(state, -1),
        Message::CursorDown => move_cursor(state, 1),
        Message::PageUp => move_cursor(state, -(PAGE_SIZE as isize)),
        Message::PageDown => move_cursor(state, PAGE_SIZE as isize),

        // ─────────────────────────────────────────────────────────
        // File Browser
        // ─────────────────────────────────────────────────────────
        Message::EditPath => files::handle_edit_path(state),
        Message::CancelPathEdit => files::handle_cancel_path_edit(state),
        Message::PathInput(c) => files::handle_path_input(state, c),
        Message::PathBackspace => files::handle_path_backspace(state),
        Message::SubmitPath => files::handle_submit_path(state),
        Message::NavigateTo { path } => files::handle_navigate_to(state, path),
        Message::NavigateUp => files::handle_navigate_up(state),
        Message::OpenSelected => files::handle_open_selected(state),
        Message::ToggleMark => files::handle_toggle_mark(state),
        Message::RefreshDirectory => files::handle_refresh_directory(state),
        Message::DirectoryLoaded(listing) => files::handle_directory_loaded(state, listing),
        Message::RequestUpload => files::handle_request_upload(state),
        Message::RequestDownload => files::handle_request_download(state),

        // ─────────────────────────────────────────────────────────
        // Applications
        // ─────────────────────────────────────────────────────────
        Message::RefreshApps => apps::handle_refresh_apps(state),
        Message::AppsLoaded { apps, error } => apps::handle_apps_loaded(state, apps, error),
        Message::ToggleAppMark => apps::handle_toggle_app_mark(state),
        Message::OpenAppMenu => apps::handle_open_app_menu(state),
        Message::RequestInstall => apps::handle_request_install(state),
        Message::ConfirmInstall { package } => apps::handle_confirm_install(state, package),
        Message::RequestUninstall => apps::handle_request_uninstall(state),
        Message::ConfirmUninstall { apps } => apps::handle_confirm_uninstall(state, apps),
        Message::UninstallConfirmed { apps } => apps::handle_uninstall_confirmed(state, apps),
        Message::ExploreDocuments => apps::handle_explore_documents(state),
        Message::Unimplemented { feature } => apps::handle_unimplemented(state, feature),

        // ─────────────────────────────────────────────────────────
        // Device Menu / Action Outcomes
        // ─────────────────────────────────────────────────────────
        Message::OpenDeviceMenu => device::handle_open_device_menu(state),
        Message::RefreshDeviceInfo => device::handle_refresh_device_info(state),
        Message::DeviceInfoLoaded { properties } => {
            device::handle_device_info_loaded(state, properties)
        }
        Message::RequestScreenshot => device::handle_request_screenshot(state),
        Message::RequestBattery => device::handle_request_battery(state),
        Message::RequestPower(power) => device::handle_request_power(state, power),
        Message::ConfirmPower(power) => device::handle_confirm_power(state, power),
        Message::ActionProgress { message } => {
            state.status = message;
            UpdateResult::none()
        }
        Message::ActionFinished {
            title,
            message,
            refresh,
        } => device::handle_action_finished(state, title, message, refresh),
        Message::ActionFailed { title, message } => {
            device::handle_action_failed(state, title, message)
        }

        // ─────────────────────────────────────────────────────────
        // Syslog
        // ─────────────────────────────────────────────────────────
        Message::ToggleSyslog => handle_toggle_syslog(state),
        Message::LogLine { line } => {
            state.syslog.push(line);
            if state.syslog_scroll > 0 {
                // Keep the viewport on the same lines while scrolled back
                let max = state.syslog.len().saturating_sub(1);
                state.syslog_scroll = (state.syslog_scroll + 1).min(max);
            }
            UpdateResult::none()
        }
        Message::LogStreamStopped => {
            state.syslog_stop = None;
            state.status = "Syslog stopped.".to_string();
            state.log_info(LogSource::Syslog, "Syslog stream stopped");
            UpdateResult::none()
        }
        Message::ClearSyslog => {
            state.syslog.clear();
            state.syslog_scroll = 0;
            UpdateResult::none()
        }
        Message::FollowSyslog => {
            state.syslog_scroll = 0;
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Dialogs
        // ─────────────────────────────────────────────────────────
        Message::DialogNext => dialogs::handle_dialog_next(state),
        Message::DialogPrev => dialogs::handle_dialog_prev(state),
        Message::DialogSelect => dialogs::handle_dialog_select(state),
        Message::DismissDialog => dialogs::handle_dismiss(state),
        Message::InputChar(c) => dialogs::handle_input_char(state, c),
        Message::InputBackspace => dialogs::handle_input_backspace(state),
        Message::SubmitInput => dialogs::handle_submit_input(state),
        Message::InputSubmitted { purpose, value } => {
            dialogs::handle_input_submitted(state, purpose, value)
        }
    }
}

fn handle_switch_tab(state: &mut AppState, tab: Tab) -> UpdateResult {
    state.tab = tab;
    let Some(session) = state.session.as_mut() else {
        return UpdateResult::none();
    };

    match tab {
        Tab::Apps if !session.apps.is_valid() && !session.apps_loading => {
            session.apps_loading = true;
            UpdateResult::action(UpdateAction::FetchApps)
        }
        Tab::Files if !session.directory.is_fresh() && !session.directory_loading => {
            session.directory_loading = true;
            UpdateResult::action(UpdateAction::ListDirectory {
                path: session.current_path().to_string(),
            })
        }
        _ => UpdateResult::none(),
    }
}

fn move_cursor(state: &mut AppState, delta: isize) -> UpdateResult {
    match state.tab {
        Tab::Files => {
            if let Some(session) = state.session.as_mut() {
                session.file_cursor = step(session.file_cursor, delta, session.entry_count());
            }
        }
        Tab::Apps => {
            if let Some(session) = state.session.as_mut() {
                session.app_cursor = step(session.app_cursor, delta, session.apps.apps().len());
            }
        }
        Tab::Syslog => {
            // Up scrolls back in time
            let max = state.syslog.len().saturating_sub(1);
            state.syslog_scroll = if delta < 0 {
                (state.syslog_scroll + delta.unsigned_abs()).min(max)
            } else {
                state.syslog_scroll.saturating_sub(delta.unsigned_abs())
            };
        }
        Tab::Info => {}
    }
    UpdateResult::none()
}

fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as isize + delta;
    next.clamp(0, len as isize - 1) as usize
}

fn handle_toggle_syslog(state: &mut AppState) -> UpdateResult {
    if let Some(flag) = &state.syslog_stop {
        if flag.is_stopped() {
            state.status = "Syslog is stopping...".to_string();
        } else {
            flag.stop();
            state.status = "Stopping syslog...".to_string();
        }
        return UpdateResult::none();
    }

    if !state.is_connected() {
        state.status = "Not connected.".to_string();
        return UpdateResult::none();
    }

    let stop = StopFlag::new();
    state.syslog_stop = Some(stop.clone());
    state.status = "Syslog started.".to_string();
    state.log_info(LogSource::Syslog, "Syslog stream requested");
    UpdateResult::action(UpdateAction::StartLogStream { stop })
}
