//! File browser handlers

use afcdeck_core::{join, normalize, parent, DirectoryListing, LogSource};

use crate::dialog::{InputDialogState, InputPurpose, Modal, NoticeState};
use crate::message::Message;
use crate::state::AppState;

use super::dialogs::{not_connected, warning};
use super::{UpdateAction, UpdateResult};

pub fn handle_edit_path(state: &mut AppState) -> UpdateResult {
    if let Some(session) = state.session.as_mut() {
        session.path_input = Some(session.current_path().to_string());
    }
    UpdateResult::none()
}

pub fn handle_cancel_path_edit(state: &mut AppState) -> UpdateResult {
    if let Some(session) = state.session.as_mut() {
        session.path_input = None;
    }
    UpdateResult::none()
}

pub fn handle_path_input(state: &mut AppState, c: char) -> UpdateResult {
    if let Some(input) = state.session.as_mut().and_then(|s| s.path_input.as_mut()) {
        input.push(c);
    }
    UpdateResult::none()
}

pub fn handle_path_backspace(state: &mut AppState) -> UpdateResult {
    if let Some(input) = state.session.as_mut().and_then(|s| s.path_input.as_mut()) {
        input.pop();
    }
    UpdateResult::none()
}

pub fn handle_submit_path(state: &mut AppState) -> UpdateResult {
    match state.session.as_mut().and_then(|s| s.path_input.take()) {
        Some(input) => UpdateResult::message(Message::NavigateTo {
            path: normalize(&input),
        }),
        None => UpdateResult::none(),
    }
}

pub fn handle_navigate_to(state: &mut AppState, path: String) -> UpdateResult {
    let Some(session) = state.session.as_mut() else {
        return not_connected(state);
    };
    let path = normalize(&path);
    session.path_input = None;
    session.directory_loading = true;
    state.status = format!("Listing {}...", path);
    UpdateResult::action(UpdateAction::ListDirectory { path })
}

pub fn handle_navigate_up(state: &mut AppState) -> UpdateResult {
    let Some(session) = state.session.as_ref() else {
        return UpdateResult::none();
    };
    let current = session.current_path();
    let up = parent(current);
    if up == current {
        return UpdateResult::none();
    }
    UpdateResult::message(Message::NavigateTo { path: up })
}

pub fn handle_open_selected(state: &mut AppState) -> UpdateResult {
    let Some(session) = state.session.as_ref() else {
        return UpdateResult::none();
    };
    match session.selected_entry() {
        Some((name, true)) => UpdateResult::message(Message::NavigateTo {
            path: join(session.current_path(), name),
        }),
        Some((_, false)) => UpdateResult::message(Message::ToggleMark),
        None => UpdateResult::none(),
    }
}

/// Mark or unmark the file under the cursor. Folders cannot be marked.
pub fn handle_toggle_mark(state: &mut AppState) -> UpdateResult {
    let Some(session) = state.session.as_mut() else {
        return UpdateResult::none();
    };
    let Some((name, is_dir)) = session.selected_entry() else {
        return UpdateResult::none();
    };
    if is_dir {
        state.status = "Folders cannot be selected.".to_string();
        return UpdateResult::none();
    }
    let name = name.to_string();
    if !session.marked.remove(&name) {
        session.marked.insert(name);
    }
    let count = session.marked.len();
    state.status = format!("{} file(s) selected.", count);
    UpdateResult::none()
}

pub fn handle_refresh_directory(state: &mut AppState) -> UpdateResult {
    let Some(session) = state.session.as_mut() else {
        return not_connected(state);
    };
    session.directory.invalidate();
    session.directory_loading = true;
    UpdateResult::action(UpdateAction::ListDirectory {
        path: session.current_path().to_string(),
    })
}

pub fn handle_directory_loaded(state: &mut AppState, listing: DirectoryListing) -> UpdateResult {
    let Some(session) = state.session.as_mut() else {
        // Late result after a disconnect
        return UpdateResult::none();
    };

    let path = listing.path.clone();
    let error = listing.error.clone();
    let summary = format!(
        "{}: {} folders, {} files",
        path,
        listing.folders.len(),
        listing.files.len()
    );
    session.set_listing(listing);

    match error {
        Some(error) => {
            state.status = format!("Error listing {}", path);
            state.log_warn(LogSource::App, format!("Listing {} failed: {}", path, error));
            state.push_notice(NoticeState::warning(
                "Directory Error",
                format!("Could not list {}:\n{}", path, error),
            ));
        }
        None => state.status = summary,
    }
    UpdateResult::none()
}

pub fn handle_request_upload(state: &mut AppState) -> UpdateResult {
    let Some(session) = state.session.as_ref() else {
        return not_connected(state);
    };
    let dest_dir = session.current_path().to_string();
    state.modal = Some(Modal::Input(InputDialogState::new(
        "Upload Files",
        format!("Local files to upload into {} (separate with ;)", dest_dir),
        "",
        InputPurpose::UploadFiles { dest_dir },
    )));
    UpdateResult::none()
}

/// Marked files, else the file under the cursor
pub fn handle_request_download(state: &mut AppState) -> UpdateResult {
    let Some(session) = state.session.as_ref() else {
        return not_connected(state);
    };

    let names = session.selected_files();
    if names.is_empty() {
        let on_folder = matches!(session.selected_entry(), Some((_, true)));
        return if on_folder {
            warning(state, "Please select files, not folders.")
        } else {
            warning(state, "No files selected.")
        };
    }

    let current = session.current_path();
    let remote_files: Vec<String> = names.iter().map(|n| join(current, n)).collect();
    let dest = state.settings.transfer.download_dir();
    state.modal = Some(Modal::Input(InputDialogState::new(
        "Download Files",
        format!("Save {} file(s) to local folder:", remote_files.len()),
        dest.display().to_string(),
        InputPurpose::DownloadTo { remote_files },
    )));
    UpdateResult::none()
}
