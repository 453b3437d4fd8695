//! Configuration types for afcdeck
//!
//! Defines `Settings` and its per-section sub-types. Every field has a
//! default so a partial or missing config file is always valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application settings (config.toml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub watcher: WatcherSettings,

    #[serde(default)]
    pub connect: ConnectSettings,

    #[serde(default)]
    pub transfer: TransferSettings,

    #[serde(default)]
    pub ui: UiSettings,

    #[serde(default)]
    pub tools: ToolSettings,
}

/// Device watcher settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WatcherSettings {
    /// Delay between device polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Look for the device again right after a failed handshake instead
    /// of waiting for a manual retry
    #[serde(default)]
    pub retry_after_failure: bool,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            retry_after_failure: false,
        }
    }
}

impl WatcherSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

fn default_poll_interval_ms() -> u64 {
    2000
}

/// Handshake settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConnectSettings {
    /// Pause after opening the session before querying the device
    #[serde(default = "default_stabilize_ms")]
    pub stabilize_ms: u64,

    /// Privileged path listed to detect root file access
    #[serde(default = "default_root_probe_path")]
    pub root_probe_path: String,

    /// Browse root when the file service is sandboxed
    #[serde(default = "default_non_root_base_path")]
    pub non_root_base_path: String,

    /// Developer disk image mounted during the handshake
    #[serde(default)]
    pub developer_image: Option<PathBuf>,

    #[serde(default)]
    pub developer_image_signature: Option<PathBuf>,
}

impl Default for ConnectSettings {
    fn default() -> Self {
        Self {
            stabilize_ms: default_stabilize_ms(),
            root_probe_path: default_root_probe_path(),
            non_root_base_path: default_non_root_base_path(),
            developer_image: None,
            developer_image_signature: None,
        }
    }
}

fn default_stabilize_ms() -> u64 {
    1000
}

fn default_root_probe_path() -> String {
    "/private".to_string()
}

fn default_non_root_base_path() -> String {
    "/var/mobile/Media".to_string()
}

/// Local destinations for transfers
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TransferSettings {
    #[serde(default)]
    pub download_dir: Option<PathBuf>,

    #[serde(default)]
    pub screenshot_dir: Option<PathBuf>,
}

impl TransferSettings {
    /// Download destination: configured, else the user's download folder
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .as_deref()
            .map(expand_tilde)
            .or_else(dirs::download_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Screenshot destination: configured, else the user's picture folder
    pub fn screenshot_dir(&self) -> PathBuf {
        self.screenshot_dir
            .as_deref()
            .map(expand_tilde)
            .or_else(dirs::picture_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// UI settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UiSettings {
    /// Maximum syslog lines kept in the log view
    #[serde(default = "default_log_buffer_size")]
    pub log_buffer_size: usize,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            log_buffer_size: default_log_buffer_size(),
        }
    }
}

fn default_log_buffer_size() -> usize {
    10_000
}

/// Device tool location and limits
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToolSettings {
    /// Directory holding the libimobiledevice tools; `PATH` when unset
    #[serde(default)]
    pub bin_dir: Option<PathBuf>,

    /// Longest a single tool invocation may run
    #[serde(default = "default_tool_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            bin_dir: None,
            timeout_secs: default_tool_timeout_secs(),
        }
    }
}

fn default_tool_timeout_secs() -> u64 {
    120
}

impl ToolSettings {
    pub fn bin_dir(&self) -> Option<PathBuf> {
        self.bin_dir.as_deref().map(expand_tilde)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &std::path::Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
