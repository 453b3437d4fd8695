//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Typed classification of a failure reported by the device side.
///
/// Callers branch on the kind instead of inspecting message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceErrorKind {
    /// The service refused access to the path or operation
    PermissionDenied,
    /// The path, bundle or object does not exist
    NotFound,
    /// The device is gone or the session is not established
    NotConnected,
    /// The device answered with data we could not use
    InvalidData,
    /// The required device tool is not installed
    Unavailable,
    /// Anything else
    Other,
}

impl DeviceErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            DeviceErrorKind::PermissionDenied => "permission denied",
            DeviceErrorKind::NotFound => "not found",
            DeviceErrorKind::NotConnected => "not connected",
            DeviceErrorKind::InvalidData => "invalid data",
            DeviceErrorKind::Unavailable => "unavailable",
            DeviceErrorKind::Other => "device error",
        }
    }
}

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Terminal/TUI Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Terminal error: {message}")]
    Terminal { message: String },

    // ─────────────────────────────────────────────────────────────
    // Device Tool Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Device tool '{tool}' not found. Install libimobiledevice or add it to PATH.")]
    ToolNotFound { tool: String },

    #[error("Failed to spawn '{tool}': {reason}")]
    ProcessSpawn { tool: String, reason: String },

    #[error("Device tool error: {message}")]
    Process { message: String },

    // ─────────────────────────────────────────────────────────────
    // Device Errors
    // ─────────────────────────────────────────────────────────────
    #[error("{}: {message}", kind.label())]
    Device {
        kind: DeviceErrorKind,
        message: String,
    },

    #[error("No device connected")]
    NotConnected,

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn terminal(message: impl Into<String>) -> Self {
        Self::Terminal {
            message: message.into(),
        }
    }

    pub fn process(message: impl Into<String>) -> Self {
        Self::Process {
            message: message.into(),
        }
    }

    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    pub fn device(kind: DeviceErrorKind, message: impl Into<String>) -> Self {
        Self::Device {
            kind,
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::device(DeviceErrorKind::PermissionDenied, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::device(DeviceErrorKind::NotFound, message)
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::device(DeviceErrorKind::InvalidData, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Typed classification of this error as seen from the device side.
    ///
    /// Infrastructure errors that are not about the device map to `Other`.
    pub fn device_kind(&self) -> DeviceErrorKind {
        match self {
            Error::Device { kind, .. } => *kind,
            Error::NotConnected => DeviceErrorKind::NotConnected,
            Error::ToolNotFound { .. } => DeviceErrorKind::Unavailable,
            _ => DeviceErrorKind::Other,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        self.device_kind() == DeviceErrorKind::PermissionDenied
    }
}
