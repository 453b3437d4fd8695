//! # afcdeck-core - Core Domain Types
//!
//! Foundation crate for afcdeck. Provides domain types, error handling,
//! logging setup and device path helpers.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`ConnectionState`] - Disconnected / Connecting / Connected / Failed
//! - [`DeviceSnapshot`] - Immutable record captured at connect time
//! - [`DirectoryListing`] - Folders and files of one device directory
//! - [`AppRecord`] - One installed application
//! - [`BatteryInfo`] - Battery level and charge status
//! - [`LogEntry`] - A single activity log line with level and timestamp
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum grouped by layer
//! - [`DeviceErrorKind`] - Typed classification of device-side failures
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//!
//! ### Device Paths (`device_path`)
//! - [`join`], [`parent`], [`normalize`] - Forward-slash path helpers
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use afcdeck_core::prelude::*;
//! ```

pub mod device_path;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod types;

pub use device_path::{join, normalize, parent};
pub use error::{DeviceErrorKind, Error, Result};
pub use types::{
    format_device_info, is_system_bundle, AppRecord, BatteryInfo, ConnectionState, DeviceSnapshot,
    DirectoryListing, InstallType, LogEntry, LogLevel, LogSource, PropertyMap,
    SYSTEM_BUNDLE_PREFIX,
};
