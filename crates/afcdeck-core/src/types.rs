//! Core domain type definitions

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};
use serde::Serialize;

/// Device property map as reported by the lockdown service (key → value text)
pub type PropertyMap = BTreeMap<String, String>;

/// Bundle identifier prefix reserved for the vendor's own applications
pub const SYSTEM_BUNDLE_PREFIX: &str = "com.apple.";

/// Connection lifecycle
///
/// Moves forward only (`Disconnected → Connecting → Connected | Failed`),
/// except for an explicit reset back to `Disconnected`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed(String),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self, ConnectionState::Connecting)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Connected => "Connected",
            ConnectionState::Failed(_) => "Failed",
        }
    }
}

/// Immutable record of a device captured once per successful connect
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSnapshot {
    pub udid: String,
    pub name: String,
    pub properties: PropertyMap,
    /// Whether the file service exposes the full filesystem
    pub root_access: bool,
    /// Directory the file browser starts in
    pub base_path: String,
}

impl DeviceSnapshot {
    /// Mode label shown next to the device name
    pub fn access_label(&self) -> &'static str {
        if self.root_access {
            "Root AFC"
        } else {
            "Jailed AFC"
        }
    }
}

/// Contents of one device directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    pub path: String,
    pub folders: Vec<String>,
    pub files: Vec<String>,
    /// Set when the listing could not be fetched
    pub error: Option<String>,
}

impl DirectoryListing {
    /// Build a listing, dropping `.`/`..` and sorting case-insensitively.
    pub fn new(path: impl Into<String>, folders: Vec<String>, files: Vec<String>) -> Self {
        Self {
            path: path.into(),
            folders: sorted_names(folders),
            files: sorted_names(files),
            error: None,
        }
    }

    /// An empty listing carrying the error that prevented fetching it
    pub fn failed(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            folders: Vec::new(),
            files: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.folders.len() + self.files.len()
    }

    /// Entry at a flat index (folders first, then files) and whether it is a folder
    pub fn entry(&self, index: usize) -> Option<(&str, bool)> {
        if index < self.folders.len() {
            Some((&self.folders[index], true))
        } else {
            self.files
                .get(index - self.folders.len())
                .map(|f| (f.as_str(), false))
        }
    }
}

fn sorted_names(mut names: Vec<String>) -> Vec<String> {
    names.retain(|n| n != "." && n != ".." && !n.is_empty());
    names.sort_by_key(|n| n.to_lowercase());
    names
}

/// How an application was installed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum InstallType {
    #[default]
    User,
    System,
    Other(String),
}

impl InstallType {
    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "" | "User" => InstallType::User,
            "System" => InstallType::System,
            other => InstallType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InstallType::User => "User",
            InstallType::System => "System",
            InstallType::Other(s) => s,
        }
    }
}

/// One installed application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppRecord {
    pub name: String,
    pub version: String,
    pub install_type: InstallType,
    pub bundle_id: String,
}

impl AppRecord {
    /// Build a record, applying the display fallbacks for missing fields
    pub fn new(
        bundle_id: impl Into<String>,
        name: Option<String>,
        version: Option<String>,
        install_type: InstallType,
    ) -> Self {
        let bundle_id = bundle_id.into();
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| bundle_id.clone());
        let version = version
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "N/A".to_string());
        Self {
            name,
            version,
            install_type,
            bundle_id,
        }
    }

    /// Whether the bundle identifier lives in the vendor-reserved namespace
    pub fn is_system_bundle(&self) -> bool {
        is_system_bundle(&self.bundle_id)
    }

    /// One-line label used in lists
    pub fn label(&self) -> String {
        format!(
            "{} (v{}) - [{}] - {}",
            self.name,
            self.version,
            self.install_type.as_str(),
            self.bundle_id
        )
    }

    /// Sort applications by display name, case-insensitively
    pub fn sort(apps: &mut [AppRecord]) {
        apps.sort_by_key(|a| a.name.to_lowercase());
    }
}

/// Whether a bundle identifier contains the vendor-reserved prefix
pub fn is_system_bundle(bundle_id: &str) -> bool {
    bundle_id.contains(SYSTEM_BUNDLE_PREFIX)
}

/// Battery state from the diagnostics domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatteryInfo {
    pub level: Option<u8>,
    pub status: Option<String>,
}

impl BatteryInfo {
    pub fn summary(&self) -> String {
        let level = self
            .level
            .map(|l| l.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let status = self.status.as_deref().unwrap_or("N/A");
        format!("Battery Level: {}%\nStatus: {}", level, status)
    }
}

/// Property keys shown on the info tab, with their labels
const DEVICE_INFO_FIELDS: &[(&str, &str)] = &[
    ("DeviceName", "Name"),
    ("ProductType", "Model"),
    ("HardwareModel", "HW Model"),
    ("ProductName", "OS"),
    ("ProductVersion", "Version"),
    ("BuildVersion", "Build"),
    ("UniqueDeviceID", "UDID"),
    ("SerialNumber", "Serial"),
    ("CPUArchitecture", "CPU"),
    ("WiFiAddress", "WiFi"),
    ("BluetoothAddress", "BT"),
    ("TimeZone", "Zone"),
    ("ActivationState", "Act State"),
];

/// Render the interesting subset of a property map as `Label: value` lines
pub fn format_device_info(properties: &PropertyMap) -> Vec<(String, String)> {
    DEVICE_INFO_FIELDS
        .iter()
        .map(|(key, label)| {
            let value = properties
                .get(*key)
                .cloned()
                .unwrap_or_else(|| "N/A".to_string());
            (label.to_string(), value)
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────
// Activity log
// ─────────────────────────────────────────────────────────────────

/// Counter for generating unique log entry IDs
static LOG_ENTRY_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DBG",
            LogLevel::Info => "INF",
            LogLevel::Warning => "WRN",
            LogLevel::Error => "ERR",
        }
    }
}

/// Where an activity log entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    App,
    Watcher,
    Connector,
    Action,
    Syslog,
}

impl LogSource {
    pub fn prefix(&self) -> &'static str {
        match self {
            LogSource::App => "app",
            LogSource::Watcher => "watch",
            LogSource::Connector => "connect",
            LogSource::Action => "action",
            LogSource::Syslog => "syslog",
        }
    }
}

/// One activity log line
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub source: LogSource,
    pub message: String,
    pub id: u64,
}

impl LogEntry {
    pub fn new(level: LogLevel, source: LogSource, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            source,
            message: message.into(),
            id: LOG_ENTRY_COUNTER.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn info(source: LogSource, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, source, message)
    }

    pub fn warn(source: LogSource, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, source, message)
    }

    pub fn error(source: LogSource, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, source, message)
    }

    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}
