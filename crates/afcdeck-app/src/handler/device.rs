//! Device menu and action outcome handlers

use afcdeck_core::{format_device_info, normalize, LogSource, PropertyMap};

use crate::actions::{DeviceAction, PowerAction};
use crate::dialog::{ConfirmDialogState, InputDialogState, InputPurpose, Modal, NoticeState};
use crate::message::{Message, Refresh};
use crate::state::AppState;

use super::dialogs::not_connected;
use super::{UpdateAction, UpdateResult};

pub fn handle_open_device_menu(state: &mut AppState) -> UpdateResult {
    let Some(session) = state.session.as_ref() else {
        return not_connected(state);
    };
    let title = session.snapshot.name.clone();
    let message = format!("{} - {}", session.snapshot.udid, session.snapshot.access_label());
    state.modal = Some(Modal::Confirm(ConfirmDialogState::new(
        title,
        message,
        vec![
            ("Screenshot", Message::RequestScreenshot),
            ("Battery", Message::RequestBattery),
            ("Reboot", Message::RequestPower(PowerAction::Reboot)),
            ("Shutdown", Message::RequestPower(PowerAction::Shutdown)),
            ("Recovery", Message::RequestPower(PowerAction::Recovery)),
            ("Cancel", Message::DismissDialog),
        ],
    )));
    UpdateResult::none()
}

pub fn handle_refresh_device_info(state: &mut AppState) -> UpdateResult {
    if !state.is_connected() {
        return not_connected(state);
    }
    state.status = "Refreshing device info...".to_string();
    UpdateResult::action(UpdateAction::RunDevice(DeviceAction::RefreshDeviceInfo))
}

pub fn handle_device_info_loaded(state: &mut AppState, properties: PropertyMap) -> UpdateResult {
    if let Some(session) = state.session.as_mut() {
        session.info_rows = format_device_info(&properties);
        session.snapshot.properties = properties;
        state.status = "Device info refreshed.".to_string();
    }
    UpdateResult::none()
}

/// Ask where to save the screenshot, prefilled with a timestamped name
pub fn handle_request_screenshot(state: &mut AppState) -> UpdateResult {
    if !state.is_connected() {
        return not_connected(state);
    }
    let name = format!(
        "screenshot_{}.png",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let default = state.settings.transfer.screenshot_dir().join(name);
    state.modal = Some(Modal::Input(InputDialogState::new(
        "Screenshot",
        "Save screenshot to:",
        default.display().to_string(),
        InputPurpose::ScreenshotPath,
    )));
    UpdateResult::none()
}

pub fn handle_request_battery(state: &mut AppState) -> UpdateResult {
    if !state.is_connected() {
        return not_connected(state);
    }
    state.status = "Reading battery...".to_string();
    UpdateResult::action(UpdateAction::RunDevice(DeviceAction::Battery))
}

pub fn handle_request_power(state: &mut AppState, power: PowerAction) -> UpdateResult {
    if !state.is_connected() {
        return not_connected(state);
    }
    state.modal = Some(Modal::Confirm(ConfirmDialogState::yes_cancel(
        format!("Confirm {}", power.label()),
        power.confirm_message(),
        Message::ConfirmPower(power),
    )));
    UpdateResult::none()
}

pub fn handle_confirm_power(state: &mut AppState, power: PowerAction) -> UpdateResult {
    if !state.is_connected() {
        return not_connected(state);
    }
    state.log_info(LogSource::Action, format!("{} requested", power.label()));
    state.status = format!("Sending {}...", power.label().to_lowercase());
    UpdateResult::action(UpdateAction::RunDevice(DeviceAction::Power(power)))
}

pub fn handle_action_finished(
    state: &mut AppState,
    title: String,
    message: String,
    refresh: Refresh,
) -> UpdateResult {
    state.status = message.lines().next().unwrap_or_default().to_string();
    state.log_info(LogSource::Action, format!("{}: {}", title, message.replace('\n', " ")));
    state.push_notice(NoticeState::info(title, message));

    let Some(session) = state.session.as_mut() else {
        return UpdateResult::none();
    };
    match refresh {
        Refresh::None => UpdateResult::none(),
        Refresh::Directory(path) => {
            // Only re-list if the user is still looking at that directory
            if normalize(&path) != session.current_path() {
                return UpdateResult::none();
            }
            session.directory.invalidate();
            session.directory_loading = true;
            UpdateResult::action(UpdateAction::ListDirectory {
                path: session.current_path().to_string(),
            })
        }
        Refresh::Apps => {
            session.apps.invalidate();
            session.apps_loading = true;
            UpdateResult::action(UpdateAction::FetchApps)
        }
    }
}

pub fn handle_action_failed(state: &mut AppState, title: String, message: String) -> UpdateResult {
    state.status = format!("Error: {}", title);
    state.log_error(LogSource::Action, format!("{}: {}", title, message.replace('\n', " ")));
    state.push_notice(NoticeState::error(title, message));
    UpdateResult::none()
}
