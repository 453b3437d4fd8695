//! Application state (Model in TEA pattern)

use std::collections::{BTreeSet, VecDeque};

use afcdeck_core::{
    format_device_info, AppRecord, ConnectionState, DeviceSnapshot, DirectoryListing, LogEntry,
    LogLevel, LogSource,
};

use crate::cache::{AppCache, DirectoryCache};
use crate::config::Settings;
use crate::dialog::{Modal, NoticeState};
use crate::shared::StopFlag;

/// Maximum activity log entries kept
const MAX_ACTIVITY: usize = 500;

/// Main tabs of the connected view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Info,
    Files,
    Apps,
    Syslog,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Info, Tab::Files, Tab::Apps, Tab::Syslog];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Info => "Device Info",
            Tab::Files => "Files",
            Tab::Apps => "Applications",
            Tab::Syslog => "Syslog",
        }
    }

    pub fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(&self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Everything known about the connected device.
///
/// Created once per successful handshake and dropped on disconnect.
#[derive(Debug, Clone)]
pub struct DeviceSession {
    pub snapshot: DeviceSnapshot,
    /// `Label: value` rows for the info tab
    pub info_rows: Vec<(String, String)>,

    pub directory: DirectoryCache,
    /// Flat cursor over folders then files
    pub file_cursor: usize,
    /// Marked file names in the current directory
    pub marked: BTreeSet<String>,
    /// Path field contents while it has focus
    pub path_input: Option<String>,
    pub directory_loading: bool,

    pub apps: AppCache,
    pub app_cursor: usize,
    /// Marked bundle identifiers
    pub marked_apps: BTreeSet<String>,
    pub apps_loading: bool,
}

impl DeviceSession {
    pub fn new(
        snapshot: DeviceSnapshot,
        listing: DirectoryListing,
        apps: Vec<AppRecord>,
        apps_error: Option<String>,
    ) -> Self {
        let info_rows = format_device_info(&snapshot.properties);
        Self {
            snapshot,
            info_rows,
            directory: DirectoryCache::new(listing),
            file_cursor: 0,
            marked: BTreeSet::new(),
            path_input: None,
            directory_loading: false,
            apps: AppCache::new(apps, apps_error),
            app_cursor: 0,
            marked_apps: BTreeSet::new(),
            apps_loading: false,
        }
    }

    /// Directory currently shown
    pub fn current_path(&self) -> &str {
        self.directory.path()
    }

    /// Replace the listing after a navigation or refresh
    pub fn set_listing(&mut self, listing: DirectoryListing) {
        if listing.path != self.current_path() {
            self.file_cursor = 0;
            self.marked.clear();
        }
        let len = listing.len();
        self.directory.store(listing);
        self.directory_loading = false;
        self.file_cursor = self.file_cursor.min(len.saturating_sub(1));
        let files: BTreeSet<String> = self
            .directory
            .listing()
            .map(|l| l.files.iter().cloned().collect())
            .unwrap_or_default();
        self.marked.retain(|name| files.contains(name));
    }

    /// Entry under the cursor and whether it is a folder
    pub fn selected_entry(&self) -> Option<(&str, bool)> {
        self.directory.listing()?.entry(self.file_cursor)
    }

    pub fn entry_count(&self) -> usize {
        self.directory.listing().map(|l| l.len()).unwrap_or(0)
    }

    /// Files to act on: marked files, else the file under the cursor
    pub fn selected_files(&self) -> Vec<String> {
        if !self.marked.is_empty() {
            return self.marked.iter().cloned().collect();
        }
        match self.selected_entry() {
            Some((name, false)) => vec![name.to_string()],
            _ => Vec::new(),
        }
    }

    pub fn set_apps(&mut self, apps: Vec<AppRecord>, error: Option<String>) {
        self.apps.store(apps, error);
        self.apps_loading = false;
        self.app_cursor = self.app_cursor.min(self.apps.apps().len().saturating_sub(1));
        let bundles: BTreeSet<&str> = self
            .apps
            .apps()
            .iter()
            .map(|a| a.bundle_id.as_str())
            .collect();
        self.marked_apps.retain(|id| bundles.contains(id.as_str()));
    }

    pub fn selected_app(&self) -> Option<&AppRecord> {
        self.apps.apps().get(self.app_cursor)
    }

    /// Apps to act on: marked apps in list order, else the app under the cursor
    pub fn selected_apps(&self) -> Vec<AppRecord> {
        if !self.marked_apps.is_empty() {
            return self
                .apps
                .apps()
                .iter()
                .filter(|a| self.marked_apps.contains(&a.bundle_id))
                .cloned()
                .collect();
        }
        self.selected_app().cloned().into_iter().collect()
    }
}

/// Bounded buffer of syslog lines
#[derive(Debug, Clone)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, line: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &String> + ExactSizeIterator {
        self.lines.iter()
    }
}

/// Complete application state (the Model in TEA)
#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,
    pub connection: ConnectionState,
    /// One-line status shown in the status bar
    pub status: String,
    pub session: Option<DeviceSession>,
    pub tab: Tab,

    /// Modal capturing keys
    pub modal: Option<Modal>,
    /// Queued notices, shown one at a time when no modal is open
    pub notices: VecDeque<NoticeState>,

    /// Connection and action activity
    pub activity: VecDeque<LogEntry>,

    pub syslog: LogBuffer,
    /// Lines scrolled up from the newest line; 0 follows the stream
    pub syslog_scroll: usize,

    /// Set while a watcher is polling
    pub watcher_stop: Option<StopFlag>,
    /// Set while a log stream runs
    pub syslog_stop: Option<StopFlag>,

    quit: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(Settings::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        let syslog = LogBuffer::new(settings.ui.log_buffer_size);
        Self {
            settings,
            connection: ConnectionState::Disconnected,
            status: "Waiting for device...".to_string(),
            session: None,
            tab: Tab::Info,
            modal: None,
            notices: VecDeque::new(),
            activity: VecDeque::new(),
            syslog,
            syslog_scroll: 0,
            watcher_stop: None,
            syslog_stop: None,
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected() && self.session.is_some()
    }

    pub fn watcher_running(&self) -> bool {
        self.watcher_stop
            .as_ref()
            .is_some_and(|flag| !flag.is_stopped())
    }

    pub fn syslog_running(&self) -> bool {
        self.syslog_stop.is_some()
    }

    /// Notice to render, if no modal is open
    pub fn current_notice(&self) -> Option<&NoticeState> {
        if self.modal.is_some() {
            None
        } else {
            self.notices.front()
        }
    }

    pub fn push_notice(&mut self, notice: NoticeState) {
        self.notices.push_back(notice);
    }

    pub fn log(&mut self, level: LogLevel, source: LogSource, message: impl Into<String>) {
        let entry = LogEntry::new(level, source, message);
        tracing::debug!("[{}] {}", entry.source.prefix(), entry.message);
        if self.activity.len() == MAX_ACTIVITY {
            self.activity.pop_front();
        }
        self.activity.push_back(entry);
    }

    pub fn log_info(&mut self, source: LogSource, message: impl Into<String>) {
        self.log(LogLevel::Info, source, message);
    }

    pub fn log_warn(&mut self, source: LogSource, message: impl Into<String>) {
        self.log(LogLevel::Warning, source, message);
    }

    pub fn log_error(&mut self, source: LogSource, message: impl Into<String>) {
        self.log(LogLevel::Error, source, message);
    }

    /// Signal every background loop to stop
    pub fn stop_background(&mut self) {
        if let Some(flag) = self.watcher_stop.take() {
            flag.stop();
        }
        if let Some(flag) = &self.syslog_stop {
            flag.stop();
        }
    }
}
