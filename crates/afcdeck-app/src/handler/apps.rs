//! Application list handlers

use std::path::PathBuf;

use afcdeck_core::{is_system_bundle, AppRecord, LogSource};

use crate::actions::DeviceAction;
use crate::dialog::{ConfirmDialogState, InputDialogState, InputPurpose, Modal, NoticeState};
use crate::message::Message;
use crate::state::AppState;

use super::dialogs::{not_connected, warning};
use super::{UpdateAction, UpdateResult};

pub fn handle_refresh_apps(state: &mut AppState) -> UpdateResult {
    let Some(session) = state.session.as_mut() else {
        return not_connected(state);
    };
    session.apps.invalidate();
    session.apps_loading = true;
    state.status = "Fetching application list...".to_string();
    UpdateResult::action(UpdateAction::FetchApps)
}

pub fn handle_apps_loaded(
    state: &mut AppState,
    apps: Vec<AppRecord>,
    error: Option<String>,
) -> UpdateResult {
    let Some(session) = state.session.as_mut() else {
        return UpdateResult::none();
    };
    let count = apps.len();
    session.set_apps(apps, error.clone());

    match error {
        Some(error) => {
            state.status = "Could not fetch applications.".to_string();
            state.log_warn(LogSource::App, format!("App list failed: {}", error));
            state.push_notice(NoticeState::error(
                "Applications",
                format!("Could not load the application list:\n{}", error),
            ));
        }
        None => state.status = format!("Fetched {} applications.", count),
    }
    UpdateResult::none()
}

fn selected_app(state: &mut AppState) -> Result<AppRecord, UpdateResult> {
    let Some(session) = state.session.as_ref() else {
        return Err(not_connected(state));
    };
    match session.selected_app() {
        Some(app) => Ok(app.clone()),
        None => Err(warning(state, "No application selected.")),
    }
}

/// Context menu for the application under the cursor
pub fn handle_open_app_menu(state: &mut AppState) -> UpdateResult {
    let app = match selected_app(state) {
        Ok(app) => app,
        Err(result) => return result,
    };
    state.modal = Some(Modal::Confirm(ConfirmDialogState::new(
        app.name.clone(),
        app.label(),
        vec![
            ("Explore Documents", Message::ExploreDocuments),
            (
                "Export IPA",
                Message::Unimplemented {
                    feature: "Export IPA".into(),
                },
            ),
            (
                "Export Backup",
                Message::Unimplemented {
                    feature: "Export Backup".into(),
                },
            ),
            (
                "Import Backup",
                Message::Unimplemented {
                    feature: "Import Backup".into(),
                },
            ),
            ("Uninstall", Message::RequestUninstall),
            ("Cancel", Message::DismissDialog),
        ],
    )));
    UpdateResult::none()
}

pub fn handle_request_install(state: &mut AppState) -> UpdateResult {
    if !state.is_connected() {
        return not_connected(state);
    }
    state.modal = Some(Modal::Input(InputDialogState::new(
        "Install App",
        "Path to the .ipa file:",
        "",
        InputPurpose::InstallPackage,
    )));
    UpdateResult::none()
}

pub fn handle_confirm_install(state: &mut AppState, package: PathBuf) -> UpdateResult {
    if !state.is_connected() {
        return not_connected(state);
    }
    state.log_info(LogSource::Action, format!("Installing {}", package.display()));
    UpdateResult::action(UpdateAction::RunDevice(DeviceAction::Install { package }))
}

/// Mark or unmark the app under the cursor
pub fn handle_toggle_app_mark(state: &mut AppState) -> UpdateResult {
    let Some(session) = state.session.as_mut() else {
        return UpdateResult::none();
    };
    let Some(bundle_id) = session.selected_app().map(|a| a.bundle_id.clone()) else {
        return UpdateResult::none();
    };
    if !session.marked_apps.remove(&bundle_id) {
        session.marked_apps.insert(bundle_id);
    }
    state.status = format!("{} application(s) selected.", session.marked_apps.len());
    UpdateResult::none()
}

fn describe(apps: &[AppRecord]) -> String {
    match apps {
        [app] => format!("'{}'", app.name),
        _ => format!("{} applications", apps.len()),
    }
}

pub fn handle_request_uninstall(state: &mut AppState) -> UpdateResult {
    let Some(session) = state.session.as_ref() else {
        return not_connected(state);
    };
    let apps = session.selected_apps();
    if apps.is_empty() {
        return warning(state, "No application selected.");
    }
    let mut message = format!("Uninstall {}?", describe(&apps));
    if apps.len() > 1 {
        for app in &apps {
            message.push_str(&format!("\n- {}", app.name));
        }
    }
    state.modal = Some(Modal::Confirm(ConfirmDialogState::yes_cancel(
        "Confirm Uninstall",
        message,
        Message::ConfirmUninstall { apps },
    )));
    UpdateResult::none()
}

/// First confirmation accepted. System bundles need a second one.
pub fn handle_confirm_uninstall(state: &mut AppState, apps: Vec<AppRecord>) -> UpdateResult {
    let system: Vec<&str> = apps
        .iter()
        .filter(|a| is_system_bundle(&a.bundle_id))
        .map(|a| a.name.as_str())
        .collect();
    if system.is_empty() {
        return UpdateResult::message(Message::UninstallConfirmed { apps });
    }
    let message = match system.as_slice() {
        [name] => format!("'{}' looks like a system app.\nProceed anyway?", name),
        names => format!("{} look like system apps.\nProceed anyway?", names.join(", ")),
    };
    state.modal = Some(Modal::Confirm(ConfirmDialogState::yes_cancel(
        "System App",
        message,
        Message::UninstallConfirmed { apps },
    )));
    UpdateResult::none()
}

pub fn handle_uninstall_confirmed(state: &mut AppState, apps: Vec<AppRecord>) -> UpdateResult {
    let Some(session) = state.session.as_mut() else {
        return not_connected(state);
    };
    session.marked_apps.clear();
    let ids: Vec<&str> = apps.iter().map(|a| a.bundle_id.as_str()).collect();
    state.log_info(LogSource::Action, format!("Uninstalling {}", ids.join(", ")));
    UpdateResult::action(UpdateAction::RunDevice(DeviceAction::Uninstall { apps }))
}

pub fn handle_explore_documents(state: &mut AppState) -> UpdateResult {
    let app = match selected_app(state) {
        Ok(app) => app,
        Err(result) => return result,
    };
    state.status = format!("Exploring {}...", app.name);
    UpdateResult::action(UpdateAction::RunDevice(DeviceAction::ExploreDocuments {
        bundle_id: app.bundle_id,
    }))
}

pub fn handle_unimplemented(state: &mut AppState, feature: String) -> UpdateResult {
    state.push_notice(NoticeState::warning("TODO", format!("{} not implemented.", feature)));
    UpdateResult::none()
}
