//! Dialog state.
//!
//! Data model for confirmation, text input and notice dialogs. The
//! rendering widgets live in afcdeck-tui.

use std::path::PathBuf;

use crate::message::Message;

/// A modal choice between labelled options, each carrying its message
#[derive(Debug, Clone)]
pub struct ConfirmDialogState {
    pub title: String,
    pub message: String,
    pub options: Vec<(String, Message)>,
    pub selected: usize,
}

impl ConfirmDialogState {
    /// Create a generic confirmation dialog
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        options: Vec<(&str, Message)>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            options: options
                .into_iter()
                .map(|(label, msg)| (label.to_string(), msg))
                .collect(),
            selected: 0,
        }
    }

    /// Yes/Cancel dialog where Cancel just closes
    pub fn yes_cancel(title: impl Into<String>, message: impl Into<String>, yes: Message) -> Self {
        Self::new(title, message, vec![("Yes", yes), ("Cancel", Message::DismissDialog)])
    }

    pub fn select_next(&mut self) {
        if !self.options.is_empty() {
            self.selected = (self.selected + 1) % self.options.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.options.is_empty() {
            self.selected = (self.selected + self.options.len() - 1) % self.options.len();
        }
    }

    /// Message of the selected option
    pub fn selected_message(&self) -> Option<Message> {
        self.options.get(self.selected).map(|(_, msg)| msg.clone())
    }
}

/// What a submitted input dialog value is used for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPurpose {
    /// Local files to upload into the device directory
    UploadFiles { dest_dir: String },
    /// Local directory receiving the given device files
    DownloadTo { remote_files: Vec<String> },
    /// Local `.ipa` to install
    InstallPackage,
    /// Local file receiving a screenshot
    ScreenshotPath,
}

/// Single-line text prompt
#[derive(Debug, Clone)]
pub struct InputDialogState {
    pub title: String,
    pub prompt: String,
    pub value: String,
    pub purpose: InputPurpose,
}

impl InputDialogState {
    pub fn new(
        title: impl Into<String>,
        prompt: impl Into<String>,
        initial: impl Into<String>,
        purpose: InputPurpose,
    ) -> Self {
        Self {
            title: title.into(),
            prompt: prompt.into(),
            value: initial.into(),
            purpose,
        }
    }

    pub fn push(&mut self, c: char) {
        self.value.push(c);
    }

    pub fn backspace(&mut self) {
        self.value.pop();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Informational dialog dismissed with Enter or Esc
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeState {
    pub title: String,
    pub message: String,
    pub level: NoticeLevel,
}

impl NoticeState {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, message)
    }

    fn new(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            level,
        }
    }
}

/// The interactive modal currently capturing keys
#[derive(Debug, Clone)]
pub enum Modal {
    Confirm(ConfirmDialogState),
    Input(InputDialogState),
}

/// Split user input into local paths (`;` or newline separated)
pub fn split_local_paths(value: &str) -> Vec<PathBuf> {
    value
        .split([';', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| crate::config::expand_tilde(std::path::Path::new(s)))
        .collect()
}
