//! Full-screen rendering tests for `view`

use afcdeck_app::{update, ConfirmDialogState, Message, Modal, NoticeState, Tab};
use afcdeck_core::ConnectionState;

use super::view;
use crate::test_utils::{connected_state, TestTerminal};

use afcdeck_app::AppState;

fn render(state: &AppState) -> TestTerminal {
    let mut term = TestTerminal::new();
    term.draw_with(|frame| view(frame, state));
    term
}

#[test]
fn test_waiting_screen_before_connect() {
    let state = AppState::new();
    let term = render(&state);

    assert!(term.buffer_contains("afcdeck"));
    assert!(term.buffer_contains("Waiting for device..."));
    assert!(!term.buffer_contains("Device Info"));
}

#[test]
fn test_connecting_state_shows_progress_status() {
    let mut state = AppState::new();
    state.connection = ConnectionState::Connecting;
    state.status = "Fetching device info...".into();
    let term = render(&state);

    assert!(term.buffer_contains("Connecting"));
    assert!(term.buffer_contains("Fetching device info..."));
}

#[test]
fn test_connected_info_tab() {
    let state = connected_state();
    let term = render(&state);

    assert!(term.buffer_contains("Device Info"));
    assert!(term.buffer_contains("Jailed AFC"));
    assert!(term.buffer_contains("Connected: Test iPhone (Jailed AFC)"));
}

#[test]
fn test_each_tab_renders_its_panel() {
    let mut state = connected_state();

    state.tab = Tab::Files;
    assert!(render(&state).buffer_contains("DCIM/"));

    state.tab = Tab::Apps;
    assert!(render(&state).buffer_contains("org.videolan.vlc"));

    state.tab = Tab::Syslog;
    assert!(render(&state).buffer_contains("Press s to start"));
}

#[test]
fn test_notice_overlays_body() {
    let mut state = connected_state();
    state.push_notice(NoticeState::info("Battery Info", "Battery Level: 80%"));
    let term = render(&state);

    assert!(term.buffer_contains("Battery Info"));
    assert!(term.buffer_contains("Battery Level: 80%"));
}

#[test]
fn test_modal_hides_notice() {
    let mut state = connected_state();
    state.push_notice(NoticeState::info("Queued", "later"));
    state.modal = Some(Modal::Confirm(ConfirmDialogState::yes_cancel(
        "Confirm Reboot",
        "Reboot the device?",
        Message::DismissDialog,
    )));
    let term = render(&state);

    assert!(term.buffer_contains("Confirm Reboot"));
    assert!(!term.buffer_contains("Queued"));
}

#[test]
fn test_disconnect_returns_to_waiting_screen() {
    let mut state = connected_state();
    let _ = update(
        &mut state,
        Message::DeviceDisconnected {
            reason: "Reboot initiated.".into(),
        },
    );
    let term = render(&state);

    assert!(term.buffer_contains("Disconnected"));
    assert!(!term.buffer_contains("Device Info"));
}

#[test]
fn test_small_terminal_does_not_panic() {
    let state = connected_state();
    let mut term = TestTerminal::with_size(20, 6);
    term.draw_with(|frame| view(frame, &state));
}
