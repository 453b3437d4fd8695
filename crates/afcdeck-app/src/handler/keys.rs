//! Key event handlers for the tabs and modals

use crate::dialog::Modal;
use crate::input_key::InputKey;
use crate::message::Message;
use crate::state::{AppState, Tab};

/// Convert key events to messages based on what currently has focus
pub fn handle_key(state: &AppState, key: InputKey) -> Option<Message> {
    // Ctrl+C always quits
    if key == InputKey::CharCtrl('c') {
        return Some(Message::Quit);
    }

    if let Some(modal) = &state.modal {
        return match modal {
            Modal::Confirm(_) => handle_key_confirm_dialog(key),
            Modal::Input(_) => handle_key_input_dialog(key),
        };
    }

    if state.current_notice().is_some() {
        return handle_key_notice(key);
    }

    if !state.is_connected() {
        return handle_key_disconnected(state, key);
    }

    let editing_path = state
        .session
        .as_ref()
        .is_some_and(|s| s.path_input.is_some());
    if state.tab == Tab::Files && editing_path {
        return handle_key_path_field(key);
    }

    handle_key_global(key).or_else(|| match state.tab {
        Tab::Info => handle_key_info(key),
        Tab::Files => handle_key_files(key),
        Tab::Apps => handle_key_apps(key),
        Tab::Syslog => handle_key_syslog(key),
    })
}

fn handle_key_confirm_dialog(key: InputKey) -> Option<Message> {
    match key {
        InputKey::Left | InputKey::Up | InputKey::BackTab | InputKey::Char('h' | 'k') => {
            Some(Message::DialogPrev)
        }
        InputKey::Right | InputKey::Down | InputKey::Tab | InputKey::Char('l' | 'j') => {
            Some(Message::DialogNext)
        }
        InputKey::Enter => Some(Message::DialogSelect),
        InputKey::Esc | InputKey::Char('n' | 'N') => Some(Message::DismissDialog),
        _ => None,
    }
}

fn handle_key_input_dialog(key: InputKey) -> Option<Message> {
    match key {
        InputKey::Enter => Some(Message::SubmitInput),
        InputKey::Esc => Some(Message::DismissDialog),
        InputKey::Backspace => Some(Message::InputBackspace),
        InputKey::Char(c) => Some(Message::InputChar(c)),
        _ => None,
    }
}

fn handle_key_notice(key: InputKey) -> Option<Message> {
    match key {
        InputKey::Enter | InputKey::Esc | InputKey::Char(' ') => Some(Message::DismissDialog),
        _ => None,
    }
}

/// Waiting and failed screens
fn handle_key_disconnected(state: &AppState, key: InputKey) -> Option<Message> {
    match key {
        InputKey::Char('q') | InputKey::Esc => Some(Message::Quit),
        InputKey::Char('r') if !state.connection.is_connecting() => Some(Message::Retry),
        _ => None,
    }
}

fn handle_key_path_field(key: InputKey) -> Option<Message> {
    match key {
        InputKey::Enter => Some(Message::SubmitPath),
        InputKey::Esc => Some(Message::CancelPathEdit),
        InputKey::Backspace => Some(Message::PathBackspace),
        InputKey::Char(c) => Some(Message::PathInput(c)),
        _ => None,
    }
}

fn handle_key_global(key: InputKey) -> Option<Message> {
    match key {
        InputKey::Char('q') => Some(Message::Quit),
        InputKey::Tab => Some(Message::NextTab),
        InputKey::BackTab => Some(Message::PrevTab),
        InputKey::Char('1') => Some(Message::SwitchTab(Tab::Info)),
        InputKey::Char('2') => Some(Message::SwitchTab(Tab::Files)),
        InputKey::Char('3') => Some(Message::SwitchTab(Tab::Apps)),
        InputKey::Char('4') => Some(Message::SwitchTab(Tab::Syslog)),
        InputKey::Char('m') => Some(Message::OpenDeviceMenu),
        _ => None,
    }
}

fn handle_key_info(key: InputKey) -> Option<Message> {
    match key {
        InputKey::Char('r') => Some(Message::RefreshDeviceInfo),
        InputKey::Char('b') => Some(Message::RequestBattery),
        InputKey::Char('s') => Some(Message::RequestScreenshot),
        _ => None,
    }
}

fn handle_key_files(key: InputKey) -> Option<Message> {
    match key {
        InputKey::Up | InputKey::Char('k') => Some(Message::CursorUp),
        InputKey::Down | InputKey::Char('j') => Some(Message::CursorDown),
        InputKey::PageUp => Some(Message::PageUp),
        InputKey::PageDown => Some(Message::PageDown),
        InputKey::Enter | InputKey::Right | InputKey::Char('l') => Some(Message::OpenSelected),
        InputKey::Backspace | InputKey::Left | InputKey::Char('h') => Some(Message::NavigateUp),
        InputKey::Char(' ') => Some(Message::ToggleMark),
        InputKey::Char('/' | 'g') => Some(Message::EditPath),
        InputKey::Char('u') => Some(Message::RequestUpload),
        InputKey::Char('d') => Some(Message::RequestDownload),
        InputKey::Char('r') => Some(Message::RefreshDirectory),
        _ => None,
    }
}

fn handle_key_apps(key: InputKey) -> Option<Message> {
    match key {
        InputKey::Up | InputKey::Char('k') => Some(Message::CursorUp),
        InputKey::Down | InputKey::Char('j') => Some(Message::CursorDown),
        InputKey::PageUp => Some(Message::PageUp),
        InputKey::PageDown => Some(Message::PageDown),
        InputKey::Enter => Some(Message::OpenAppMenu),
        InputKey::Char(' ') => Some(Message::ToggleAppMark),
        InputKey::Char('r') => Some(Message::RefreshApps),
        InputKey::Char('i') => Some(Message::RequestInstall),
        InputKey::Char('x') | InputKey::Delete => Some(Message::RequestUninstall),
        InputKey::Char('e') => Some(Message::ExploreDocuments),
        _ => None,
    }
}

fn handle_key_syslog(key: InputKey) -> Option<Message> {
    match key {
        InputKey::Char('s') | InputKey::Enter => Some(Message::ToggleSyslog),
        InputKey::Char('c') => Some(Message::ClearSyslog),
        InputKey::Up | InputKey::Char('k') => Some(Message::CursorUp),
        InputKey::Down | InputKey::Char('j') => Some(Message::CursorDown),
        InputKey::PageUp => Some(Message::PageUp),
        InputKey::PageDown => Some(Message::PageDown),
        InputKey::End | InputKey::Char('G') => Some(Message::FollowSyslog),
        _ => None,
    }
}
