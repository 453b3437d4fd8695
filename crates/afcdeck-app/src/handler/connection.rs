//! Watcher and connector lifecycle handlers

use afcdeck_core::{ConnectionState, LogSource};

use crate::connector::{ConnectOptions, ConnectSuccess};
use crate::dialog::NoticeState;
use crate::message::Message;
use crate::shared::StopFlag;
use crate::state::{AppState, DeviceSession};

use super::{UpdateAction, UpdateResult};

const RETRY_HINT: &str = "Press r to retry.";
const AUTO_RETRY_HINT: &str = "Looking for the device again.";

pub fn handle_start_watcher(state: &mut AppState) -> UpdateResult {
    if state.watcher_running() {
        tracing::debug!("Watcher already running, ignoring start");
        return UpdateResult::none();
    }
    if state.connection != ConnectionState::Disconnected {
        tracing::debug!("Not starting watcher while {}", state.connection.label());
        return UpdateResult::none();
    }

    let stop = StopFlag::new();
    state.watcher_stop = Some(stop.clone());
    state.status = crate::watcher::WAITING_STATUS.to_string();
    state.log_info(LogSource::Watcher, "Looking for a device");
    UpdateResult::action(UpdateAction::StartWatcher {
        stop,
        interval: state.settings.watcher.poll_interval(),
    })
}

pub fn handle_watcher_status(state: &mut AppState, message: String) -> UpdateResult {
    if state.connection == ConnectionState::Disconnected {
        state.status = message;
    }
    UpdateResult::none()
}

/// Hand-off from the watcher. Only a disconnected app starts a handshake.
pub fn handle_device_detected(state: &mut AppState, udid: String) -> UpdateResult {
    if state.connection != ConnectionState::Disconnected {
        tracing::warn!(
            "Ignoring device {} while {}",
            udid,
            state.connection.label()
        );
        return UpdateResult::none();
    }

    if let Some(flag) = state.watcher_stop.take() {
        flag.stop();
    }
    state.connection = ConnectionState::Connecting;
    state.status = format!("Device detected: {}. Connecting...", udid);
    state.log_info(LogSource::Watcher, format!("Device detected: {}", udid));
    UpdateResult::action(UpdateAction::Connect {
        udid,
        options: ConnectOptions::from(&state.settings.connect),
    })
}

pub fn handle_watcher_failed(state: &mut AppState, error: String) -> UpdateResult {
    state.watcher_stop = None;
    let reason = format!("Listener Error: {}", error);
    state.log_error(LogSource::Watcher, reason.clone());
    state.connection = ConnectionState::Failed(reason.clone());
    state.status = format!("Device listener stopped. {}", RETRY_HINT);
    state.push_notice(NoticeState::error(
        "Listener Error",
        format!("{}\n\n{}", reason, RETRY_HINT),
    ));
    UpdateResult::none()
}

pub fn handle_retry(state: &mut AppState) -> UpdateResult {
    match state.connection {
        ConnectionState::Failed(_) => {
            state.connection = ConnectionState::Disconnected;
            state.log_info(LogSource::App, "Retrying");
            UpdateResult::message(Message::StartWatcher)
        }
        ConnectionState::Disconnected if !state.watcher_running() => {
            UpdateResult::message(Message::StartWatcher)
        }
        _ => UpdateResult::none(),
    }
}

pub fn handle_connect_progress(state: &mut AppState, message: String) -> UpdateResult {
    state.log_info(LogSource::Connector, message.clone());
    state.status = message;
    UpdateResult::none()
}

pub fn handle_connect_warning(state: &mut AppState, message: String) -> UpdateResult {
    state.status = message.lines().next().unwrap_or_default().to_string();
    state.log_warn(LogSource::Connector, message);
    UpdateResult::none()
}

pub fn handle_connected(state: &mut AppState, success: ConnectSuccess) -> UpdateResult {
    if !state.connection.is_connecting() {
        // Stale handshake (the app was reset meanwhile); drop its transport
        tracing::warn!(
            "Discarding connection to {} while {}",
            success.snapshot.udid,
            state.connection.label()
        );
        return UpdateResult::action(UpdateAction::ReleaseTransport);
    }

    let ConnectSuccess {
        snapshot,
        listing,
        apps,
        apps_error,
    } = success;

    let status = format!("Connected: {} ({})", snapshot.name, snapshot.access_label());
    state.log_info(LogSource::Connector, status.clone());
    state.status = status;
    if let Some(error) = &apps_error {
        state.push_notice(NoticeState::warning(
            "Applications",
            format!("Could not load the application list:\n{}", error),
        ));
    }

    state.connection = ConnectionState::Connected;
    state.session = Some(DeviceSession::new(snapshot, listing, apps, apps_error));
    UpdateResult::none()
}

pub fn handle_connect_failed(state: &mut AppState, reason: String) -> UpdateResult {
    state.log_error(LogSource::Connector, reason.replace('\n', " "));
    state.session = None;
    state.connection = ConnectionState::Failed(reason.clone());

    let auto_retry = state.settings.watcher.retry_after_failure;
    let hint = if auto_retry { AUTO_RETRY_HINT } else { RETRY_HINT };
    state.status = format!("Connection failed. {}", hint);
    state.push_notice(NoticeState::error(
        "Connection Failed",
        format!("{}\n\n{}", reason, hint),
    ));

    if auto_retry {
        UpdateResult::message(Message::Retry)
    } else {
        UpdateResult::none()
    }
}

/// The device is going away (power action). Reset and look for it again.
pub fn handle_device_disconnected(state: &mut AppState, reason: String) -> UpdateResult {
    if let Some(flag) = &state.syslog_stop {
        flag.stop();
    }
    state.log_warn(LogSource::App, reason.clone());
    state.session = None;
    state.modal = None;
    state.connection = ConnectionState::Disconnected;
    state.status = reason;
    UpdateResult::action_then(UpdateAction::ReleaseTransport, Message::StartWatcher)
}
