//! Message types for the application (TEA pattern)

use std::path::PathBuf;

use afcdeck_core::{AppRecord, DirectoryListing, PropertyMap};

use crate::actions::PowerAction;
use crate::connector::ConnectSuccess;
use crate::dialog::InputPurpose;
use crate::input_key::InputKey;
use crate::state::Tab;

/// What to refetch after a successful action
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Refresh {
    #[default]
    None,
    /// Re-list this directory if it is still the one shown
    Directory(String),
    /// Invalidate the app cache and refetch it
    Apps,
}

/// All possible messages/events in the application
#[derive(Debug, Clone)]
pub enum Message {
    /// Keyboard event
    Key(InputKey),

    /// Tick for periodic updates
    Tick,

    /// Request application quit
    Quit,

    // ─────────────────────────────────────────────────────────
    // Device Watcher
    // ─────────────────────────────────────────────────────────
    /// Start polling for an attached device
    StartWatcher,

    /// Non-terminal watcher status ("Waiting for device...")
    WatcherStatus { message: String },

    /// A device was found; the watcher has stopped itself
    DeviceDetected { udid: String },

    /// Enumeration failed; the watcher has stopped
    WatcherFailed { error: String },

    /// Reset from `Failed` and look for a device again
    Retry,

    // ─────────────────────────────────────────────────────────
    // Connector
    // ─────────────────────────────────────────────────────────
    /// Non-terminal handshake progress
    ConnectProgress { message: String },

    /// Non-terminal handshake problem; the handshake continues
    ConnectWarning { message: String },

    /// Terminal handshake success
    Connected(Box<ConnectSuccess>),

    /// Terminal handshake failure; the transport is already released
    ConnectFailed { reason: String },

    // ─────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────
    SwitchTab(Tab),
    NextTab,
    PrevTab,
    CursorUp,
    CursorDown,
    PageUp,
    PageDown,

    // ─────────────────────────────────────────────────────────
    // File Browser
    // ─────────────────────────────────────────────────────────
    /// Focus the path field
    EditPath,
    /// Leave the path field without navigating
    CancelPathEdit,
    PathInput(char),
    PathBackspace,
    /// Enter in the path field
    SubmitPath,
    NavigateTo { path: String },
    NavigateUp,
    /// Open the folder under the cursor
    OpenSelected,
    ToggleMark,
    RefreshDirectory,
    DirectoryLoaded(DirectoryListing),
    RequestUpload,
    RequestDownload,

    // ─────────────────────────────────────────────────────────
    // Applications
    // ─────────────────────────────────────────────────────────
    RefreshApps,
    AppsLoaded {
        apps: Vec<AppRecord>,
        error: Option<String>,
    },
    /// Mark or unmark the app under the cursor
    ToggleAppMark,
    /// Context menu for the app under the cursor
    OpenAppMenu,
    RequestInstall,
    ConfirmInstall { package: PathBuf },
    RequestUninstall,
    /// First confirmation accepted
    ConfirmUninstall { apps: Vec<AppRecord> },
    /// All confirmations accepted
    UninstallConfirmed { apps: Vec<AppRecord> },
    ExploreDocuments,
    /// Declared but not implemented (export IPA, export/import backup)
    Unimplemented { feature: String },

    // ─────────────────────────────────────────────────────────
    // Device Menu
    // ─────────────────────────────────────────────────────────
    OpenDeviceMenu,
    RefreshDeviceInfo,
    DeviceInfoLoaded { properties: PropertyMap },
    RequestScreenshot,
    RequestBattery,
    RequestPower(PowerAction),
    ConfirmPower(PowerAction),

    // ─────────────────────────────────────────────────────────
    // Action Outcomes
    // ─────────────────────────────────────────────────────────
    /// Non-terminal progress of a running action
    ActionProgress { message: String },

    ActionFinished {
        title: String,
        message: String,
        refresh: Refresh,
    },

    ActionFailed { title: String, message: String },

    /// The device is expected to vanish; reset to `Disconnected`
    DeviceDisconnected { reason: String },

    // ─────────────────────────────────────────────────────────
    // Syslog
    // ─────────────────────────────────────────────────────────
    ToggleSyslog,
    LogLine { line: String },
    LogStreamStopped,
    ClearSyslog,
    /// Jump back to the newest syslog line
    FollowSyslog,

    // ─────────────────────────────────────────────────────────
    // Dialogs
    // ─────────────────────────────────────────────────────────
    DialogNext,
    DialogPrev,
    /// Activate the selected confirm option
    DialogSelect,
    /// Close the top modal or notice
    DismissDialog,
    InputChar(char),
    InputBackspace,
    SubmitInput,
    InputSubmitted { purpose: InputPurpose, value: String },
}
