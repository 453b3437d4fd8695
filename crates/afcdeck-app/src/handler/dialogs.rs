//! Modal and notice handlers

use std::path::{Path, PathBuf};

use crate::actions::DeviceAction;
use crate::config::expand_tilde;
use crate::dialog::{split_local_paths, ConfirmDialogState, InputPurpose, Modal, NoticeState};
use crate::message::Message;
use crate::state::AppState;

use super::{UpdateAction, UpdateResult};

/// Show a precondition warning; no background work is started
pub(crate) fn warning(state: &mut AppState, message: &str) -> UpdateResult {
    state.status = message.to_string();
    state.push_notice(NoticeState::warning("Warning", message));
    UpdateResult::none()
}

pub(crate) fn not_connected(state: &mut AppState) -> UpdateResult {
    warning(state, "Not connected.")
}

pub fn handle_dialog_next(state: &mut AppState) -> UpdateResult {
    if let Some(Modal::Confirm(dialog)) = state.modal.as_mut() {
        dialog.select_next();
    }
    UpdateResult::none()
}

pub fn handle_dialog_prev(state: &mut AppState) -> UpdateResult {
    if let Some(Modal::Confirm(dialog)) = state.modal.as_mut() {
        dialog.select_prev();
    }
    UpdateResult::none()
}

/// Close the confirm dialog and dispatch its selected option
pub fn handle_dialog_select(state: &mut AppState) -> UpdateResult {
    match state.modal.take() {
        Some(Modal::Confirm(dialog)) => match dialog.selected_message() {
            Some(msg) => UpdateResult::message(msg),
            None => UpdateResult::none(),
        },
        other => {
            state.modal = other;
            UpdateResult::none()
        }
    }
}

/// Close the open modal, else the oldest notice
pub fn handle_dismiss(state: &mut AppState) -> UpdateResult {
    if state.modal.take().is_none() {
        state.notices.pop_front();
    }
    UpdateResult::none()
}

pub fn handle_input_char(state: &mut AppState, c: char) -> UpdateResult {
    if let Some(Modal::Input(input)) = state.modal.as_mut() {
        input.push(c);
    }
    UpdateResult::none()
}

pub fn handle_input_backspace(state: &mut AppState) -> UpdateResult {
    if let Some(Modal::Input(input)) = state.modal.as_mut() {
        input.backspace();
    }
    UpdateResult::none()
}

pub fn handle_submit_input(state: &mut AppState) -> UpdateResult {
    match state.modal.take() {
        Some(Modal::Input(input)) => UpdateResult::message(Message::InputSubmitted {
            purpose: input.purpose,
            value: input.value,
        }),
        other => {
            state.modal = other;
            UpdateResult::none()
        }
    }
}

/// Validate a submitted input value and turn it into a device action
pub fn handle_input_submitted(
    state: &mut AppState,
    purpose: InputPurpose,
    value: String,
) -> UpdateResult {
    if !state.is_connected() {
        return not_connected(state);
    }
    let value = value.trim();

    match purpose {
        InputPurpose::UploadFiles { dest_dir } => {
            let files = split_local_paths(value);
            if files.is_empty() {
                return warning(state, "No files selected.");
            }
            if let Some(missing) = files.iter().find(|f| !f.is_file()) {
                let message = format!("Not a file: {}", missing.display());
                return warning(state, &message);
            }
            state.status = format!("Uploading {} file(s)...", files.len());
            UpdateResult::action(UpdateAction::RunDevice(DeviceAction::Upload { files, dest_dir }))
        }

        InputPurpose::DownloadTo { remote_files } => {
            if value.is_empty() {
                return warning(state, "Please choose a destination folder.");
            }
            state.status = format!("Downloading {} file(s)...", remote_files.len());
            UpdateResult::action(UpdateAction::RunDevice(DeviceAction::Download {
                remote_files,
                dest_dir: expand_tilde(Path::new(value)),
            }))
        }

        InputPurpose::InstallPackage => {
            let package = expand_tilde(Path::new(value));
            let is_ipa = package
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("ipa"));
            if value.is_empty() || !is_ipa {
                return warning(state, "Please choose an .ipa file.");
            }
            let name = package
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            state.modal = Some(Modal::Confirm(ConfirmDialogState::yes_cancel(
                "Confirm Install",
                format!("Install {}?", name),
                Message::ConfirmInstall { package },
            )));
            UpdateResult::none()
        }

        InputPurpose::ScreenshotPath => {
            if value.is_empty() {
                return warning(state, "Please choose where to save the screenshot.");
            }
            let dest = with_png_extension(expand_tilde(Path::new(value)));
            state.status = "Taking screenshot...".to_string();
            UpdateResult::action(UpdateAction::RunDevice(DeviceAction::Screenshot { dest }))
        }
    }
}

fn with_png_extension(path: PathBuf) -> PathBuf {
    let is_png = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if is_png {
        path
    } else {
        let mut raw = path.into_os_string();
        raw.push(".png");
        PathBuf::from(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_extension_added_once() {
        assert_eq!(
            with_png_extension(PathBuf::from("/tmp/shot")),
            PathBuf::from("/tmp/shot.png")
        );
        assert_eq!(
            with_png_extension(PathBuf::from("/tmp/shot.PNG")),
            PathBuf::from("/tmp/shot.PNG")
        );
        assert_eq!(
            with_png_extension(PathBuf::from("/tmp/shot.jpg")),
            PathBuf::from("/tmp/shot.jpg.png")
        );
    }
}
