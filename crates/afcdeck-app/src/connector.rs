//! Connection handshake and session preload.
//!
//! [`run_connect`] drives one attempt from open to preload and always ends
//! with exactly one terminal message: `Connected` or `ConnectFailed`.
//! Progress and warnings may be sent before it.
//!
//! Handshake steps:
//! 1. release any previous transport, open a new one
//! 2. fetch properties (a `DeviceName` is required)
//! 3. mount the developer image (best effort)
//! 4. start the file service and probe for root access
//! 5. preload the base directory, retrying once at `/`
//! 6. preload the application list (best effort)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use afcdeck_core::prelude::*;
use afcdeck_core::{AppRecord, DeviceSnapshot, DirectoryListing};
use afcdeck_device::{DeviceBackend, Transport};
use tokio::sync::mpsc;

use crate::config::ConnectSettings;
use crate::listing::fetch_listing;
use crate::message::Message;
use crate::shared::TransportSlot;

/// Browse root when the file service has full filesystem access
pub const ROOT_BASE_PATH: &str = "/";

const MOUNT_HINT: &str = "Device actions (Screenshot, Reboot) may fail.";

/// Handshake parameters, resolved from [`ConnectSettings`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectOptions {
    pub stabilize: Duration,
    pub root_probe_path: String,
    pub non_root_base_path: String,
    pub developer_image: Option<PathBuf>,
    pub developer_image_signature: Option<PathBuf>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self::from(&ConnectSettings::default())
    }
}

impl From<&ConnectSettings> for ConnectOptions {
    fn from(settings: &ConnectSettings) -> Self {
        Self {
            stabilize: Duration::from_millis(settings.stabilize_ms),
            root_probe_path: settings.root_probe_path.clone(),
            non_root_base_path: settings.non_root_base_path.clone(),
            developer_image: settings
                .developer_image
                .as_deref()
                .map(crate::config::expand_tilde),
            developer_image_signature: settings
                .developer_image_signature
                .as_deref()
                .map(crate::config::expand_tilde),
        }
    }
}

/// Everything preloaded by a successful handshake
#[derive(Debug, Clone)]
pub struct ConnectSuccess {
    pub snapshot: DeviceSnapshot,
    pub listing: DirectoryListing,
    pub apps: Vec<AppRecord>,
    pub apps_error: Option<String>,
}

/// Spawn a handshake on its own task
pub fn spawn_connect<B>(
    backend: Arc<B>,
    slot: TransportSlot<B::Transport>,
    udid: String,
    options: ConnectOptions,
    msg_tx: mpsc::Sender<Message>,
) where
    B: DeviceBackend + Sync + 'static,
{
    tokio::spawn(async move {
        run_connect(backend.as_ref(), &slot, &udid, &options, &msg_tx).await;
    });
}

/// Run one handshake and send its single terminal message
pub async fn run_connect<B: DeviceBackend + Sync>(
    backend: &B,
    slot: &TransportSlot<B::Transport>,
    udid: &str,
    options: &ConnectOptions,
    msg_tx: &mpsc::Sender<Message>,
) {
    let terminal = match handshake(backend, slot, udid, options, msg_tx).await {
        Ok(success) => {
            info!(
                "Connected to {} ({})",
                success.snapshot.name,
                success.snapshot.access_label()
            );
            Message::Connected(Box::new(success))
        }
        Err(reason) => {
            warn!("Connection to {} failed: {}", udid, reason);
            Message::ConnectFailed { reason }
        }
    };
    let _ = msg_tx.send(terminal).await;
}

async fn progress(msg_tx: &mpsc::Sender<Message>, message: impl Into<String>) {
    let message = message.into();
    debug!("{}", message);
    let _ = msg_tx.send(Message::ConnectProgress { message }).await;
}

async fn warning(msg_tx: &mpsc::Sender<Message>, message: impl Into<String>) {
    let message = message.into();
    warn!("{}", message);
    let _ = msg_tx.send(Message::ConnectWarning { message }).await;
}

/// Handshake body. `Err` carries the user-facing failure reason; the slot
/// is empty whenever it returns `Err`.
async fn handshake<B: DeviceBackend + Sync>(
    backend: &B,
    slot: &TransportSlot<B::Transport>,
    udid: &str,
    options: &ConnectOptions,
    msg_tx: &mpsc::Sender<Message>,
) -> std::result::Result<ConnectSuccess, String> {
    slot.release().await;

    progress(msg_tx, format!("Connecting to {}...", udid)).await;
    let transport = backend.open(udid).await.map_err(|e| {
        format!(
            "Could not connect.\nIs the device trusted? Is usbmuxd running?\n\nError: {}",
            e
        )
    })?;
    progress(msg_tx, "Connection successful. Stabilizing...").await;

    if !options.stabilize.is_zero() {
        tokio::time::sleep(options.stabilize).await;
    }

    progress(msg_tx, "Fetching device info...").await;
    let properties = match transport.properties().await {
        Ok(properties) => properties,
        Err(e) => {
            transport.close().await;
            return Err(format!("Connected but failed info.\nPairing issue?\n\nError: {}", e));
        }
    };
    let name = match properties.get("DeviceName").map(|n| n.trim()) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            transport.close().await;
            return Err(
                "Connected but failed info.\nPairing issue?\n\nError: device did not report a name"
                    .to_string(),
            );
        }
    };
    progress(msg_tx, format!("Got device info. Name: {}", name)).await;

    let transport = slot.install(transport).await;

    match &options.developer_image {
        Some(image) => {
            progress(msg_tx, "Attempting to mount Developer Image...").await;
            match transport
                .mount_developer_image(image, options.developer_image_signature.as_deref())
                .await
            {
                Ok(()) => progress(msg_tx, "Developer Image mounted successfully.").await,
                Err(e) => {
                    warning(
                        msg_tx,
                        format!(
                            "WARNING: Failed to mount Developer Image: {}\n{}",
                            e, MOUNT_HINT
                        ),
                    )
                    .await
                }
            }
        }
        None => {
            warning(
                msg_tx,
                format!("WARNING: No Developer Image configured.\n{}", MOUNT_HINT),
            )
            .await
        }
    }

    progress(msg_tx, "Starting AFC service...").await;
    if let Err(e) = transport.start_file_service().await {
        slot.release().await;
        return Err(format!("Could not start the file service.\n\nError: {}", e));
    }

    // A jailed file service hides the probe path or refuses it
    let (root_access, base_path) = match transport.list_dir(&options.root_probe_path).await {
        Ok(_) => (true, ROOT_BASE_PATH.to_string()),
        Err(e)
            if matches!(
                e.device_kind(),
                DeviceErrorKind::PermissionDenied | DeviceErrorKind::NotFound
            ) =>
        {
            debug!("Root probe not reachable: {}", e);
            (false, options.non_root_base_path.clone())
        }
        Err(e) => {
            slot.release().await;
            return Err(format!("Could not start the file service.\n\nError: {}", e));
        }
    };
    progress(
        msg_tx,
        format!(
            "File access: {}",
            if root_access { "Root AFC" } else { "Jailed AFC" }
        ),
    )
    .await;

    progress(msg_tx, format!("Fetching initial file list for {}...", base_path)).await;
    let listing = preload_listing(transport.as_ref(), &base_path, msg_tx).await;

    progress(msg_tx, "Fetching application list...").await;
    let (apps, apps_error) = match transport.list_apps().await {
        Ok(mut apps) => {
            AppRecord::sort(&mut apps);
            progress(msg_tx, format!("Fetched {} applications.", apps.len())).await;
            (apps, None)
        }
        Err(e) => {
            warning(msg_tx, format!("Warning: Error fetching apps: {}", e)).await;
            (Vec::new(), Some(e.to_string()))
        }
    };

    progress(msg_tx, "Pre-loading complete. Connection setup successful!").await;

    Ok(ConnectSuccess {
        snapshot: DeviceSnapshot {
            udid: udid.to_string(),
            name,
            properties,
            root_access,
            base_path,
        },
        listing,
        apps,
        apps_error,
    })
}

/// List the base path, falling back to `/` once. Never fails: the second
/// error is carried inside the returned listing.
async fn preload_listing<T: Transport + Sync>(
    transport: &T,
    base_path: &str,
    msg_tx: &mpsc::Sender<Message>,
) -> DirectoryListing {
    let first_error = match fetch_listing(transport, base_path).await {
        Ok(listing) => return report_listing(listing, msg_tx).await,
        Err(e) => e,
    };
    warning(msg_tx, format!("Warning: Error fetching files: {}", first_error)).await;

    if base_path == ROOT_BASE_PATH {
        return DirectoryListing::failed(base_path, first_error.to_string());
    }

    match fetch_listing(transport, ROOT_BASE_PATH).await {
        Ok(listing) => report_listing(listing, msg_tx).await,
        Err(e) => {
            warning(msg_tx, format!("Warning: Error fetching files: {}", e)).await;
            DirectoryListing::failed(base_path, e.to_string())
        }
    }
}

async fn report_listing(
    listing: DirectoryListing,
    msg_tx: &mpsc::Sender<Message>,
) -> DirectoryListing {
    progress(
        msg_tx,
        format!(
            "Fetched initial files: {} folders, {} files.",
            listing.folders.len(),
            listing.files.len()
        ),
    )
    .await;
    listing
}
