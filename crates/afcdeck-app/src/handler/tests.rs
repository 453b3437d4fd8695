//! Tests for the update function and key handling

use std::path::PathBuf;

use afcdeck_core::{
    AppRecord, ConnectionState, DeviceSnapshot, DirectoryListing, InstallType, PropertyMap,
};

use super::*;
use crate::actions::{DeviceAction, PowerAction};
use crate::connector::ConnectSuccess;
use crate::dialog::{InputPurpose, Modal};
use crate::input_key::InputKey;
use crate::message::{Message, Refresh};
use crate::state::{AppState, Tab};

/// Run a message and all its follow-ups, collecting the actions
fn process(state: &mut AppState, msg: Message) -> Vec<UpdateAction> {
    let mut actions = Vec::new();
    let mut next = Some(msg);
    while let Some(msg) = next.take() {
        let result = update(state, msg);
        if let Some(action) = result.action {
            actions.push(action);
        }
        next = result.message;
    }
    actions
}

fn apps() -> Vec<AppRecord> {
    vec![
        AppRecord::new(
            "com.apple.Maps",
            Some("Maps".into()),
            Some("1.0".into()),
            InstallType::System,
        ),
        AppRecord::new(
            "org.videolan.vlc",
            Some("VLC".into()),
            Some("3.5".into()),
            InstallType::User,
        ),
    ]
}

fn connected_state() -> AppState {
    let mut state = AppState::new();
    state.connection = ConnectionState::Connecting;
    let mut properties = PropertyMap::new();
    properties.insert("DeviceName".into(), "Test iPhone".into());
    let success = ConnectSuccess {
        snapshot: DeviceSnapshot {
            udid: "abc".into(),
            name: "Test iPhone".into(),
            properties,
            root_access: false,
            base_path: "/var/mobile/Media".into(),
        },
        listing: DirectoryListing::new(
            "/var/mobile/Media",
            vec!["DCIM".into()],
            vec!["a.txt".into(), "b.txt".into()],
        ),
        apps: apps(),
        apps_error: None,
    };
    let actions = process(&mut state, Message::Connected(Box::new(success)));
    assert!(actions.is_empty());
    state
}

fn select_app(state: &mut AppState, bundle_id: &str) {
    let session = state.session.as_mut().unwrap();
    session.app_cursor = session
        .apps
        .apps()
        .iter()
        .position(|a| a.bundle_id == bundle_id)
        .unwrap();
}

// ─────────────────────────────────────────────────────────
// Watcher / Connector
// ─────────────────────────────────────────────────────────

#[test]
fn test_start_watcher_is_refused_while_running() {
    let mut state = AppState::new();
    let first = process(&mut state, Message::StartWatcher);
    assert!(matches!(first.as_slice(), [UpdateAction::StartWatcher { .. }]));
    assert!(state.watcher_running());

    let second = process(&mut state, Message::StartWatcher);
    assert!(second.is_empty());
}

#[test]
fn test_device_detected_starts_one_handshake() {
    let mut state = AppState::new();
    process(&mut state, Message::StartWatcher);

    let actions = process(&mut state, Message::DeviceDetected { udid: "abc".into() });
    assert!(matches!(
        actions.as_slice(),
        [UpdateAction::Connect { udid, .. }] if udid == "abc"
    ));
    assert_eq!(state.connection, ConnectionState::Connecting);
    assert!(state.watcher_stop.is_none());

    // A second hand-off while the handshake runs is refused
    let again = process(&mut state, Message::DeviceDetected { udid: "abc".into() });
    assert!(again.is_empty());
}

#[test]
fn test_connect_options_follow_settings() {
    let mut state = AppState::new();
    state.settings.connect.non_root_base_path = "/var/mobile".into();
    let actions = process(&mut state, Message::DeviceDetected { udid: "abc".into() });
    match actions.as_slice() {
        [UpdateAction::Connect { options, .. }] => {
            assert_eq!(options.non_root_base_path, "/var/mobile")
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_connected_builds_session() {
    let state = connected_state();
    assert!(state.is_connected());
    let session = state.session.as_ref().unwrap();
    assert_eq!(session.current_path(), "/var/mobile/Media");
    assert_eq!(session.apps.apps().len(), 2);
    assert!(state.status.contains("Jailed AFC"));
}

#[test]
fn test_stale_connected_releases_transport() {
    let mut state = AppState::new();
    let success = ConnectSuccess {
        snapshot: DeviceSnapshot {
            udid: "abc".into(),
            name: "Test iPhone".into(),
            properties: PropertyMap::new(),
            root_access: true,
            base_path: "/".into(),
        },
        listing: DirectoryListing::new("/", vec![], vec![]),
        apps: Vec::new(),
        apps_error: None,
    };
    let actions = process(&mut state, Message::Connected(Box::new(success)));
    assert!(matches!(actions.as_slice(), [UpdateAction::ReleaseTransport]));
    assert!(state.session.is_none());
}

#[test]
fn test_connected_with_app_error_warns() {
    let mut state = AppState::new();
    state.connection = ConnectionState::Connecting;
    let success = ConnectSuccess {
        snapshot: DeviceSnapshot {
            udid: "abc".into(),
            name: "Test iPhone".into(),
            properties: PropertyMap::new(),
            root_access: true,
            base_path: "/".into(),
        },
        listing: DirectoryListing::new("/", vec![], vec![]),
        apps: Vec::new(),
        apps_error: Some("proxy down".into()),
    };
    process(&mut state, Message::Connected(Box::new(success)));
    assert!(state.is_connected());
    assert!(state.notices.front().unwrap().message.contains("proxy down"));

    // The failed app fetch is not cached, so the Apps tab refetches
    let actions = process(&mut state, Message::SwitchTab(Tab::Apps));
    assert!(matches!(actions.as_slice(), [UpdateAction::FetchApps]));
}

#[test]
fn test_connect_failed_then_retry() {
    let mut state = AppState::new();
    state.connection = ConnectionState::Connecting;
    process(&mut state, Message::ConnectFailed { reason: "Could not connect.".into() });
    assert!(matches!(state.connection, ConnectionState::Failed(_)));
    assert_eq!(state.notices.len(), 1);

    // Dismiss the notice, then retry
    process(&mut state, Message::Key(InputKey::Enter));
    assert!(state.notices.is_empty());
    let actions = process(&mut state, Message::Key(InputKey::Char('r')));
    assert!(matches!(actions.as_slice(), [UpdateAction::StartWatcher { .. }]));
    assert_eq!(state.connection, ConnectionState::Disconnected);
}

#[test]
fn test_connect_failed_retries_when_configured() {
    let mut settings = crate::config::Settings::default();
    settings.watcher.retry_after_failure = true;
    let mut state = AppState::with_settings(settings);
    state.connection = ConnectionState::Connecting;

    let reason = "Could not connect.".to_string();
    let actions = process(&mut state, Message::ConnectFailed { reason });

    assert!(matches!(actions.as_slice(), [UpdateAction::StartWatcher { .. }]));
    assert_eq!(state.connection, ConnectionState::Disconnected);
    assert!(state.watcher_running());
    let notice = state.current_notice().expect("failure notice");
    assert_eq!(notice.title, "Connection Failed");
    assert!(notice.message.contains("Looking for the device again."));
}

#[test]
fn test_watcher_failure_is_reported() {
    let mut state = AppState::new();
    process(&mut state, Message::StartWatcher);
    process(&mut state, Message::WatcherFailed { error: "usbmuxd".into() });
    assert!(matches!(
        &state.connection,
        ConnectionState::Failed(r) if r.starts_with("Listener Error")
    ));
    assert!(!state.watcher_running());
}

#[test]
fn test_device_disconnected_resets_and_restarts_watcher() {
    let mut state = connected_state();
    let actions = process(
        &mut state,
        Message::DeviceDisconnected {
            reason: "Reboot initiated.".into(),
        },
    );
    assert!(matches!(
        actions.as_slice(),
        [UpdateAction::ReleaseTransport, UpdateAction::StartWatcher { .. }]
    ));
    assert_eq!(state.connection, ConnectionState::Disconnected);
    assert!(state.session.is_none());
}

// ─────────────────────────────────────────────────────────
// Files
// ─────────────────────────────────────────────────────────

#[test]
fn test_download_without_selection_warns() {
    let mut state = connected_state();
    state.tab = Tab::Files;
    // Cursor sits on the DCIM folder
    let actions = process(&mut state, Message::RequestDownload);
    assert!(actions.is_empty());
    assert!(state.modal.is_none());
    assert_eq!(state.notices.back().unwrap().message, "Please select files, not folders.");
}

#[test]
fn test_download_marked_files_flow() {
    let mut state = connected_state();
    state.tab = Tab::Files;
    process(&mut state, Message::CursorDown);
    process(&mut state, Message::ToggleMark);
    process(&mut state, Message::CursorDown);
    process(&mut state, Message::ToggleMark);

    process(&mut state, Message::RequestDownload);
    let Some(Modal::Input(input)) = &state.modal else {
        panic!("expected input dialog");
    };
    assert_eq!(
        input.purpose,
        InputPurpose::DownloadTo {
            remote_files: vec![
                "/var/mobile/Media/a.txt".to_string(),
                "/var/mobile/Media/b.txt".to_string()
            ]
        }
    );

    let dir = tempfile::tempdir().unwrap();
    if let Some(Modal::Input(input)) = state.modal.as_mut() {
        input.value = dir.path().display().to_string();
    }
    let actions = process(&mut state, Message::SubmitInput);
    match actions.as_slice() {
        [UpdateAction::RunDevice(DeviceAction::Download { remote_files, dest_dir })] => {
            assert_eq!(remote_files.len(), 2);
            assert_eq!(dest_dir, dir.path());
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_path_field_navigates() {
    let mut state = connected_state();
    state.tab = Tab::Files;
    process(&mut state, Message::Key(InputKey::Char('/')));
    assert!(state.session.as_ref().unwrap().path_input.is_some());

    for _ in 0.."/var/mobile/Media".len() {
        process(&mut state, Message::Key(InputKey::Backspace));
    }
    for c in "/private//var/".chars() {
        process(&mut state, Message::Key(InputKey::Char(c)));
    }
    let actions = process(&mut state, Message::Key(InputKey::Enter));
    assert!(matches!(
        actions.as_slice(),
        [UpdateAction::ListDirectory { path }] if path == "/private/var"
    ));
    assert!(state.session.as_ref().unwrap().path_input.is_none());
}

#[test]
fn test_open_folder_and_go_up() {
    let mut state = connected_state();
    state.tab = Tab::Files;
    let actions = process(&mut state, Message::Key(InputKey::Enter));
    assert!(matches!(
        actions.as_slice(),
        [UpdateAction::ListDirectory { path }] if path == "/var/mobile/Media/DCIM"
    ));

    let actions = process(&mut state, Message::Key(InputKey::Backspace));
    assert!(matches!(
        actions.as_slice(),
        [UpdateAction::ListDirectory { path }] if path == "/var/mobile"
    ));
}

#[test]
fn test_upload_refresh_only_for_current_directory() {
    let mut state = connected_state();
    let other = process(
        &mut state,
        Message::ActionFinished {
            title: "Done".into(),
            message: "Uploaded 1 file(s).".into(),
            refresh: Refresh::Directory("/Downloads".into()),
        },
    );
    assert!(other.is_empty());

    let current = process(
        &mut state,
        Message::ActionFinished {
            title: "Done".into(),
            message: "Uploaded 1 file(s).".into(),
            refresh: Refresh::Directory("/var/mobile/Media".into()),
        },
    );
    assert!(matches!(current.as_slice(), [UpdateAction::ListDirectory { .. }]));
    assert_eq!(state.status, "Uploaded 1 file(s).");
}

#[test]
fn test_upload_rejects_missing_files() {
    let mut state = connected_state();
    let actions = process(
        &mut state,
        Message::InputSubmitted {
            purpose: InputPurpose::UploadFiles {
                dest_dir: "/var/mobile/Media".into(),
            },
            value: "/definitely/not/here.txt".into(),
        },
    );
    assert!(actions.is_empty());
    assert!(state.notices.back().unwrap().message.starts_with("Not a file"));
}

// ─────────────────────────────────────────────────────────
// Apps
// ─────────────────────────────────────────────────────────

#[test]
fn test_system_uninstall_needs_second_confirmation() {
    let mut state = connected_state();
    state.tab = Tab::Apps;
    select_app(&mut state, "com.apple.Maps");

    process(&mut state, Message::RequestUninstall);
    // First dialog: "Yes" is selected by default
    let actions = process(&mut state, Message::DialogSelect);
    assert!(actions.is_empty());
    let Some(Modal::Confirm(dialog)) = &state.modal else {
        panic!("expected the system app dialog");
    };
    assert_eq!(dialog.title, "System App");

    // Declining issues no device call
    let actions = process(&mut state, Message::Key(InputKey::Esc));
    assert!(actions.is_empty());
    assert!(state.modal.is_none());
}

#[test]
fn test_system_uninstall_accepted_twice_runs() {
    let mut state = connected_state();
    select_app(&mut state, "com.apple.Maps");
    process(&mut state, Message::RequestUninstall);
    process(&mut state, Message::DialogSelect);
    let actions = process(&mut state, Message::DialogSelect);
    assert!(matches!(
        actions.as_slice(),
        [UpdateAction::RunDevice(DeviceAction::Uninstall { apps })]
            if apps.len() == 1 && apps[0].bundle_id == "com.apple.Maps"
    ));
}

#[test]
fn test_user_uninstall_needs_one_confirmation() {
    let mut state = connected_state();
    select_app(&mut state, "org.videolan.vlc");
    process(&mut state, Message::RequestUninstall);
    let actions = process(&mut state, Message::DialogSelect);
    assert!(matches!(
        actions.as_slice(),
        [UpdateAction::RunDevice(DeviceAction::Uninstall { apps })]
            if apps.len() == 1 && apps[0].name == "VLC"
    ));
}

#[test]
fn test_marked_apps_uninstall_together() {
    let mut state = connected_state();
    state.tab = Tab::Apps;
    select_app(&mut state, "com.apple.Maps");
    process(&mut state, Message::Key(InputKey::Char(' ')));
    select_app(&mut state, "org.videolan.vlc");
    process(&mut state, Message::Key(InputKey::Char(' ')));
    assert_eq!(state.session.as_ref().unwrap().marked_apps.len(), 2);

    process(&mut state, Message::RequestUninstall);
    let Some(Modal::Confirm(dialog)) = &state.modal else {
        panic!("expected the uninstall dialog");
    };
    assert!(dialog.message.starts_with("Uninstall 2 applications?"));

    // One system bundle in the batch still needs the extra confirmation
    let actions = process(&mut state, Message::DialogSelect);
    assert!(actions.is_empty());
    let actions = process(&mut state, Message::DialogSelect);
    match actions.as_slice() {
        [UpdateAction::RunDevice(DeviceAction::Uninstall { apps })] => {
            let ids: Vec<&str> = apps.iter().map(|a| a.bundle_id.as_str()).collect();
            assert_eq!(ids, vec!["com.apple.Maps", "org.videolan.vlc"]);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(state.session.as_ref().unwrap().marked_apps.is_empty());
}

#[test]
fn test_app_marks_follow_refetch() {
    let mut state = connected_state();
    state.tab = Tab::Apps;
    select_app(&mut state, "com.apple.Maps");
    process(&mut state, Message::ToggleAppMark);
    select_app(&mut state, "org.videolan.vlc");
    process(&mut state, Message::ToggleAppMark);

    let remaining = vec![apps()[1].clone()];
    process(&mut state, Message::AppsLoaded { apps: remaining, error: None });
    let session = state.session.as_ref().unwrap();
    assert_eq!(session.marked_apps.len(), 1);
    assert!(session.marked_apps.contains("org.videolan.vlc"));
}

#[test]
fn test_uninstall_cancel_issues_nothing() {
    let mut state = connected_state();
    select_app(&mut state, "org.videolan.vlc");
    process(&mut state, Message::RequestUninstall);
    process(&mut state, Message::DialogNext);
    let actions = process(&mut state, Message::DialogSelect);
    assert!(actions.is_empty());
    assert!(state.modal.is_none());
}

#[test]
fn test_install_requires_ipa() {
    let mut state = connected_state();
    let actions = process(
        &mut state,
        Message::InputSubmitted {
            purpose: InputPurpose::InstallPackage,
            value: "/tmp/app.zip".into(),
        },
    );
    assert!(actions.is_empty());
    assert_eq!(state.notices.back().unwrap().message, "Please choose an .ipa file.");

    process(
        &mut state,
        Message::InputSubmitted {
            purpose: InputPurpose::InstallPackage,
            value: "/tmp/App.IPA".into(),
        },
    );
    let actions = process(&mut state, Message::DialogSelect);
    assert!(matches!(
        actions.as_slice(),
        [UpdateAction::RunDevice(DeviceAction::Install { package })]
            if package == &PathBuf::from("/tmp/App.IPA")
    ));
}

#[test]
fn test_install_success_refetches_apps() {
    let mut state = connected_state();
    let actions = process(
        &mut state,
        Message::ActionFinished {
            title: "Done".into(),
            message: "Install successful.".into(),
            refresh: Refresh::Apps,
        },
    );
    assert!(matches!(actions.as_slice(), [UpdateAction::FetchApps]));
    assert!(!state.session.as_ref().unwrap().apps.is_valid());
}

#[test]
fn test_app_menu_unimplemented_entries() {
    let mut state = connected_state();
    state.tab = Tab::Apps;
    process(&mut state, Message::Key(InputKey::Enter));
    process(&mut state, Message::DialogNext);
    let actions = process(&mut state, Message::DialogSelect);
    assert!(actions.is_empty());
    let notice = state.notices.back().unwrap();
    assert_eq!(notice.title, "TODO");
    assert_eq!(notice.message, "Export IPA not implemented.");
}

#[test]
fn test_cached_apps_are_reused_on_tab_switch() {
    let mut state = connected_state();
    let actions = process(&mut state, Message::SwitchTab(Tab::Apps));
    assert!(actions.is_empty());
}

// ─────────────────────────────────────────────────────────
// Device menu
// ─────────────────────────────────────────────────────────

#[test]
fn test_power_requires_confirmation() {
    let mut state = connected_state();
    let actions = process(&mut state, Message::RequestPower(PowerAction::Shutdown));
    assert!(actions.is_empty());
    assert!(matches!(state.modal, Some(Modal::Confirm(_))));

    let actions = process(&mut state, Message::DialogSelect);
    assert!(matches!(
        actions.as_slice(),
        [UpdateAction::RunDevice(DeviceAction::Power(PowerAction::Shutdown))]
    ));
}

#[test]
fn test_device_menu_battery() {
    let mut state = connected_state();
    process(&mut state, Message::Key(InputKey::Char('m')));
    process(&mut state, Message::DialogNext);
    let actions = process(&mut state, Message::DialogSelect);
    assert!(matches!(
        actions.as_slice(),
        [UpdateAction::RunDevice(DeviceAction::Battery)]
    ));
}

#[test]
fn test_screenshot_appends_png() {
    let mut state = connected_state();
    process(&mut state, Message::RequestScreenshot);
    let Some(Modal::Input(input)) = &state.modal else {
        panic!("expected input dialog");
    };
    assert!(input.value.ends_with(".png"));

    let actions = process(
        &mut state,
        Message::InputSubmitted {
            purpose: InputPurpose::ScreenshotPath,
            value: "/tmp/shot".into(),
        },
    );
    assert!(matches!(
        actions.as_slice(),
        [UpdateAction::RunDevice(DeviceAction::Screenshot { dest })]
            if dest == &PathBuf::from("/tmp/shot.png")
    ));
}

#[test]
fn test_action_failed_sets_status_and_notice() {
    let mut state = connected_state();
    process(
        &mut state,
        Message::ActionFailed {
            title: "Download Error".into(),
            message: "Download failed on b.txt: read error".into(),
        },
    );
    assert_eq!(state.status, "Error: Download Error");
    assert_eq!(state.notices.back().unwrap().title, "Download Error");
}

#[test]
fn test_not_connected_precondition() {
    let mut state = AppState::new();
    let actions = process(&mut state, Message::RequestBattery);
    assert!(actions.is_empty());
    assert_eq!(state.notices.back().unwrap().message, "Not connected.");
}

// ─────────────────────────────────────────────────────────
// Syslog
// ─────────────────────────────────────────────────────────

#[test]
fn test_syslog_toggle_starts_once_then_stops() {
    let mut state = connected_state();
    let actions = process(&mut state, Message::ToggleSyslog);
    let stop = match actions.as_slice() {
        [UpdateAction::StartLogStream { stop }] => stop.clone(),
        other => panic!("unexpected {:?}", other),
    };

    let actions = process(&mut state, Message::ToggleSyslog);
    assert!(actions.is_empty());
    assert!(stop.is_stopped());

    // Still stopping: no second stream
    let actions = process(&mut state, Message::ToggleSyslog);
    assert!(actions.is_empty());

    process(&mut state, Message::LogStreamStopped);
    assert!(!state.syslog_running());
    let actions = process(&mut state, Message::ToggleSyslog);
    assert!(matches!(actions.as_slice(), [UpdateAction::StartLogStream { .. }]));
}

#[test]
fn test_syslog_buffer_respects_setting() {
    let mut state = AppState::with_settings({
        let mut settings = crate::config::Settings::default();
        settings.ui.log_buffer_size = 3;
        settings
    });
    for i in 0..5 {
        process(&mut state, Message::LogLine { line: format!("line {}", i) });
    }
    assert_eq!(state.syslog.len(), 3);
    assert_eq!(state.syslog.iter().next().unwrap(), "line 2");
}

#[test]
fn test_syslog_scroll_and_follow() {
    let mut state = connected_state();
    state.tab = Tab::Syslog;
    for i in 0..20 {
        process(&mut state, Message::LogLine { line: format!("line {}", i) });
    }
    process(&mut state, Message::Key(InputKey::Up));
    assert_eq!(state.syslog_scroll, 1);
    process(&mut state, Message::LogLine { line: "new".into() });
    assert_eq!(state.syslog_scroll, 2);
    process(&mut state, Message::Key(InputKey::End));
    assert_eq!(state.syslog_scroll, 0);
}

// ─────────────────────────────────────────────────────────
// Keys / Dialogs
// ─────────────────────────────────────────────────────────

#[test]
fn test_quit_stops_background_work() {
    let mut state = AppState::new();
    process(&mut state, Message::StartWatcher);
    let stop = state.watcher_stop.clone().unwrap();
    process(&mut state, Message::Key(InputKey::CharCtrl('c')));
    assert!(state.should_quit());
    assert!(stop.is_stopped());
}

#[test]
fn test_modal_captures_keys() {
    let mut state = connected_state();
    process(&mut state, Message::RequestInstall);
    process(&mut state, Message::Key(InputKey::Char('q')));
    assert!(!state.should_quit());
    let Some(Modal::Input(input)) = &state.modal else {
        panic!("expected input dialog");
    };
    assert_eq!(input.value, "q");
}

#[test]
fn test_dismiss_closes_modal_before_notices() {
    let mut state = connected_state();
    process(&mut state, Message::Unimplemented { feature: "Export IPA".into() });
    process(&mut state, Message::RequestInstall);
    assert!(state.current_notice().is_none());

    process(&mut state, Message::DismissDialog);
    assert!(state.modal.is_none());
    assert_eq!(state.notices.len(), 1);
    process(&mut state, Message::DismissDialog);
    assert!(state.notices.is_empty());
}

#[test]
fn test_tab_keys() {
    let mut state = connected_state();
    process(&mut state, Message::Key(InputKey::Tab));
    assert_eq!(state.tab, Tab::Files);
    process(&mut state, Message::Key(InputKey::Char('4')));
    assert_eq!(state.tab, Tab::Syslog);
    process(&mut state, Message::Key(InputKey::BackTab));
    assert_eq!(state.tab, Tab::Apps);
}
