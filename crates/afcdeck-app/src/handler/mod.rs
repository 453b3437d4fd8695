//! Handler module - TEA update function and event handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function and message dispatch
//! - `connection`: Watcher and connector lifecycle
//! - `files`: File browser handlers
//! - `apps`: Application list handlers
//! - `device`: Device menu and action outcome handlers
//! - `dialogs`: Modal and notice handlers
//! - `keys`: Key event handlers per tab and modal

pub(crate) mod apps;
pub(crate) mod connection;
pub(crate) mod device;
pub(crate) mod dialogs;
pub(crate) mod files;
pub(crate) mod keys;
pub(crate) mod update;

#[cfg(test)]
mod tests;

use std::time::Duration;

use crate::actions::DeviceAction;
use crate::connector::ConnectOptions;
use crate::message::Message;
use crate::shared::StopFlag;

// Re-export main entry point
pub use update::update;

/// Actions that the event loop should perform after update
#[derive(Debug, Clone)]
pub enum UpdateAction {
    /// Poll for an attached device until `stop` is set
    StartWatcher { stop: StopFlag, interval: Duration },

    /// Run the handshake for a detected device
    Connect { udid: String, options: ConnectOptions },

    /// List a device directory for the file browser
    ListDirectory { path: String },

    /// Fetch the installed application list
    FetchApps,

    /// Run a device action on a background task
    RunDevice(DeviceAction),

    /// Relay device syslog lines until `stop` is set
    StartLogStream { stop: StopFlag },

    /// Close the live transport, if any
    ReleaseTransport,
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Optional action for the event loop to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }

    pub fn action_then(action: UpdateAction, msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: Some(action),
        }
    }
}
