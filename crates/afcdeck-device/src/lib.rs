//! # afcdeck-device - Device Transport
//!
//! Talks to attached iOS devices through the libimobiledevice command-line
//! tools, spawned as child processes.
//!
//! Depends on [`afcdeck_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Transport Abstraction
//! - [`Transport`] - Operations on an established device session
//! - [`DeviceBackend`] - Device enumeration plus the transport factory
//! - [`LogLines`] - Receiver side of a device syslog stream
//!
//! ### libimobiledevice Backend
//! - [`ImobileBackend`], [`ImobileTransport`] - Production implementation
//! - [`ToolRunner`] - Locate and run device tools, classify failures
//!
//! ### Platform Utilities
//! - [`ToolAvailability`] - Check which device tools are installed
//!
//! ### Test Support
//! - `test_utils::{FakeBackend, FakeTransport}` behind the `test-helpers` feature

pub mod imobile;
pub mod parse;
pub mod runner;
pub mod syslog;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod tool_availability;
pub mod transport;

pub use imobile::{ImobileBackend, ImobileTransport};
pub use runner::{classify_failure, ToolOutput, ToolRunner};
pub use tool_availability::{ToolAvailability, ToolStatus, REQUIRED_TOOLS};
pub use transport::{DeviceBackend, FileInfo, LogLines, Transport};
