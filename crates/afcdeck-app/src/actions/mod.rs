//! Action handlers: UpdateAction dispatch and background task spawning

use std::path::PathBuf;
use std::sync::Arc;

use afcdeck_core::prelude::*;
use afcdeck_core::{AppRecord, DirectoryListing};
use afcdeck_device::{DeviceBackend, Transport};
use tokio::sync::mpsc;

use crate::connector::spawn_connect;
use crate::listing::fetch_listing;
use crate::log_stream::{error_marker, spawn_log_stream};
use crate::message::Message;
use crate::shared::TransportSlot;
use crate::watcher::spawn_watcher;
use crate::UpdateAction;

pub mod device;
pub use device::execute;

/// Power-state changes that end the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Reboot,
    Shutdown,
    Recovery,
}

impl PowerAction {
    pub fn label(&self) -> &'static str {
        match self {
            PowerAction::Reboot => "Reboot",
            PowerAction::Shutdown => "Shutdown",
            PowerAction::Recovery => "Recovery",
        }
    }

    /// Question asked before running the action
    pub fn confirm_message(&self) -> &'static str {
        match self {
            PowerAction::Reboot => "Reboot the device?",
            PowerAction::Shutdown => "Shut down the device?",
            PowerAction::Recovery => "Put the device into recovery mode?",
        }
    }

    pub(crate) fn notice(&self) -> &'static str {
        match self {
            PowerAction::Reboot => "Device is rebooting. Connection will be lost.",
            PowerAction::Shutdown => "Device is powering off. Connection will be lost.",
            PowerAction::Recovery => "Device entering recovery mode. Connection will be lost.",
        }
    }

    pub(crate) fn disconnect_reason(&self) -> &'static str {
        match self {
            PowerAction::Reboot => "Reboot initiated.",
            PowerAction::Shutdown => "Shutdown initiated.",
            PowerAction::Recovery => "Recovery initiated.",
        }
    }
}

/// A single user-requested device operation.
///
/// Preconditions (selection, confirmation, destination) are checked by the
/// update function before one of these is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceAction {
    Upload { files: Vec<PathBuf>, dest_dir: String },
    Download { remote_files: Vec<String>, dest_dir: PathBuf },
    Install { package: PathBuf },
    /// Removed in order; stops at the first failure
    Uninstall { apps: Vec<AppRecord> },
    ExploreDocuments { bundle_id: String },
    Screenshot { dest: PathBuf },
    Battery,
    Power(PowerAction),
    RefreshDeviceInfo,
}

/// Execute an action by spawning a background task
pub fn handle_action<B>(
    action: UpdateAction,
    msg_tx: mpsc::Sender<Message>,
    backend: Arc<B>,
    slot: TransportSlot<B::Transport>,
) where
    B: DeviceBackend + Sync + 'static,
{
    match action {
        UpdateAction::StartWatcher { stop, interval } => {
            spawn_watcher(backend, stop, interval, msg_tx);
        }

        UpdateAction::Connect { udid, options } => {
            spawn_connect(backend, slot, udid, options, msg_tx);
        }

        UpdateAction::ListDirectory { path } => {
            tokio::spawn(async move {
                let listing = match slot.get().await {
                    Some(transport) => fetch_listing(transport.as_ref(), &path)
                        .await
                        .unwrap_or_else(|e| {
                            warn!("Listing {} failed: {}", path, e);
                            DirectoryListing::failed(path.as_str(), e.to_string())
                        }),
                    None => {
                        DirectoryListing::failed(path.as_str(), Error::NotConnected.to_string())
                    }
                };
                let _ = msg_tx.send(Message::DirectoryLoaded(listing)).await;
            });
        }

        UpdateAction::FetchApps => {
            tokio::spawn(async move {
                let result = match slot.get().await {
                    Some(transport) => transport.list_apps().await,
                    None => Err(Error::NotConnected),
                };
                let msg = match result {
                    Ok(apps) => Message::AppsLoaded { apps, error: None },
                    Err(e) => {
                        warn!("Fetching apps failed: {}", e);
                        Message::AppsLoaded {
                            apps: Vec::new(),
                            error: Some(e.to_string()),
                        }
                    }
                };
                let _ = msg_tx.send(msg).await;
            });
        }

        UpdateAction::RunDevice(action) => {
            tokio::spawn(async move {
                match slot.get().await {
                    Some(transport) => execute(transport.as_ref(), action, &msg_tx).await,
                    None => {
                        let _ = msg_tx
                            .send(Message::ActionFailed {
                                title: "Error".to_string(),
                                message: "Not connected.".to_string(),
                            })
                            .await;
                    }
                }
            });
        }

        UpdateAction::StartLogStream { stop } => {
            tokio::spawn(async move {
                match slot.get().await {
                    Some(transport) => spawn_log_stream(transport, stop, msg_tx),
                    None => {
                        let _ = msg_tx
                            .send(Message::LogLine {
                                line: error_marker(&Error::NotConnected),
                            })
                            .await;
                        let _ = msg_tx.send(Message::LogStreamStopped).await;
                    }
                }
            });
        }

        UpdateAction::ReleaseTransport => {
            tokio::spawn(async move {
                slot.release().await;
            });
        }
    }
}
