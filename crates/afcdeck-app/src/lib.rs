//! afcdeck-app - Application state and orchestration for afcdeck
//!
//! This crate implements the TEA (The Elm Architecture) pattern for state
//! management, the Engine that wires it to a device backend, configuration
//! loading, and the background workers: device watcher, connection
//! handshake, action dispatcher and syslog stream.

pub mod actions;
pub mod cache;
pub mod config;
pub mod connector;
pub mod dialog;
pub mod engine;
pub mod handler;
pub mod input_key;
pub mod listing;
pub mod log_stream;
pub mod message;
pub mod process;
pub mod shared;
pub mod signals;
pub mod state;
pub mod watcher;

// Re-export primary types
pub use actions::{DeviceAction, PowerAction};
pub use config::Settings;
pub use connector::{ConnectOptions, ConnectSuccess};
pub use dialog::{
    ConfirmDialogState, InputDialogState, InputPurpose, Modal, NoticeLevel, NoticeState,
};
pub use engine::Engine;
pub use handler::{update, UpdateAction, UpdateResult};
pub use input_key::InputKey;
pub use message::{Message, Refresh};
pub use shared::{StopFlag, TransportSlot};
pub use state::{AppState, DeviceSession, LogBuffer, Tab};
