//! Device transport abstraction
//!
//! A [`Transport`] is a live session with one attached device. The app layer
//! only ever talks to a device through this trait, so the libimobiledevice
//! backend and the scripted test backend are interchangeable.

use std::path::Path;

use afcdeck_core::prelude::*;
use afcdeck_core::{AppRecord, BatteryInfo, PropertyMap};
use tokio::sync::mpsc;

/// Receiving end of a device log stream.
///
/// Each item is one log line, or the error that ended the stream. The
/// producer stops once the receiver is dropped.
pub type LogLines = mpsc::Receiver<Result<String>>;

/// Metadata for one path on the device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInfo {
    pub is_dir: bool,
    pub size: Option<u64>,
}

impl FileInfo {
    pub fn dir() -> Self {
        Self {
            is_dir: true,
            size: None,
        }
    }

    pub fn file(size: u64) -> Self {
        Self {
            is_dir: false,
            size: Some(size),
        }
    }
}

/// Operations available on an established device session
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Identifier of the device this session belongs to
    fn udid(&self) -> &str;

    /// Full lockdown property map
    async fn properties(&self) -> Result<PropertyMap>;

    /// A single lockdown property
    async fn property(&self, key: &str) -> Result<String>;

    /// Mount the developer disk image used by screenshot and diagnostics
    async fn mount_developer_image(&self, image: &Path, signature: Option<&Path>) -> Result<()>;

    /// Start the file-transfer sub-session
    async fn start_file_service(&self) -> Result<()>;

    /// Raw entry names of a device directory
    async fn list_dir(&self, path: &str) -> Result<Vec<String>>;

    async fn stat(&self, path: &str) -> Result<FileInfo>;

    /// Copy a device file to the local filesystem
    async fn pull(&self, remote: &str, local: &Path) -> Result<()>;

    /// Copy a local file onto the device
    async fn push(&self, local: &Path, remote: &str) -> Result<()>;

    /// Installed user and system applications
    async fn list_apps(&self) -> Result<Vec<AppRecord>>;

    async fn install(&self, package: &Path) -> Result<()>;

    async fn uninstall(&self, bundle_id: &str) -> Result<()>;

    /// Entry names of an application's Documents folder
    async fn list_app_documents(&self, bundle_id: &str) -> Result<Vec<String>>;

    /// Save a screenshot of the device screen to `dest`
    async fn screenshot(&self, dest: &Path) -> Result<()>;

    async fn battery(&self) -> Result<BatteryInfo>;

    async fn restart(&self) -> Result<()>;

    async fn shutdown(&self) -> Result<()>;

    async fn enter_recovery(&self) -> Result<()>;

    /// Start relaying device syslog lines
    async fn log_stream(&self) -> Result<LogLines>;

    /// Release the session. Later calls fail with `NotConnected`, and every
    /// log stream started from it ends.
    async fn close(&self);
}

/// Enumeration primitive plus the factory for transports
#[trait_variant::make(DeviceBackend: Send)]
pub trait LocalDeviceBackend {
    type Transport: Transport + Sync + 'static;

    /// Identifiers of attached devices, in the order the system reports them
    async fn list_devices(&self) -> Result<Vec<String>>;

    /// Open a session with the given device
    async fn open(&self, udid: &str) -> Result<Self::Transport>;
}
