//! Device action execution.
//!
//! Each action reports exactly one outcome: `ActionFinished` or
//! `ActionFailed`. Multi-file transfers run in order and stop at the first
//! failing file. Power actions that succeed also send `DeviceDisconnected`.

use std::path::Path;

use afcdeck_core::device_path::file_name;
use afcdeck_core::prelude::*;
use afcdeck_core::{join, AppRecord};
use afcdeck_device::Transport;
use tokio::sync::mpsc;

use super::{DeviceAction, PowerAction};
use crate::message::{Message, Refresh};

/// Run one device action against a live transport
pub async fn execute<T: Transport + Sync>(
    transport: &T,
    action: DeviceAction,
    msg_tx: &mpsc::Sender<Message>,
) {
    debug!("Executing {:?}", action);
    let outcome = match action {
        DeviceAction::Upload { files, dest_dir } => {
            upload(transport, &files, &dest_dir, msg_tx).await
        }
        DeviceAction::Download {
            remote_files,
            dest_dir,
        } => download(transport, &remote_files, &dest_dir, msg_tx).await,
        DeviceAction::Install { package } => install(transport, &package, msg_tx).await,
        DeviceAction::Uninstall { apps } => uninstall(transport, &apps, msg_tx).await,
        DeviceAction::ExploreDocuments { bundle_id } => {
            match transport.list_app_documents(&bundle_id).await {
                Ok(entries) => finished(
                    "Explore Docs",
                    documents_summary(&bundle_id, &entries),
                    Refresh::None,
                ),
                Err(e) => failed("Explore Error", format!("Could not explore: {}", e)),
            }
        }
        DeviceAction::Screenshot { dest } => screenshot(transport, &dest, msg_tx).await,
        DeviceAction::Battery => match transport.battery().await {
            Ok(battery) => finished("Battery Info", battery.summary(), Refresh::None),
            Err(e) => failed("Battery Error", format!("Could not read battery: {}", e)),
        },
        DeviceAction::Power(power) => {
            let result = match power {
                PowerAction::Reboot => transport.restart().await,
                PowerAction::Shutdown => transport.shutdown().await,
                PowerAction::Recovery => transport.enter_recovery().await,
            };
            match result {
                Ok(()) => {
                    info!("{} sent to {}", power.label(), transport.udid());
                    let _ = msg_tx
                        .send(finished(power.label(), power.notice(), Refresh::None))
                        .await;
                    let _ = msg_tx
                        .send(Message::DeviceDisconnected {
                            reason: power.disconnect_reason().to_string(),
                        })
                        .await;
                    return;
                }
                Err(e) => failed(
                    format!("{} Error", power.label()),
                    format!("{} failed: {}", power.label(), e),
                ),
            }
        }
        DeviceAction::RefreshDeviceInfo => match transport.properties().await {
            Ok(properties) => Message::DeviceInfoLoaded { properties },
            Err(e) => failed("Info Error", format!("Failed to refresh info: {}", e)),
        },
    };
    let _ = msg_tx.send(outcome).await;
}

fn finished(title: impl Into<String>, message: impl Into<String>, refresh: Refresh) -> Message {
    Message::ActionFinished {
        title: title.into(),
        message: message.into(),
        refresh,
    }
}

fn failed(title: impl Into<String>, message: impl Into<String>) -> Message {
    let message = message.into();
    warn!("{}", message);
    Message::ActionFailed {
        title: title.into(),
        message,
    }
}

async fn progress(msg_tx: &mpsc::Sender<Message>, message: String) {
    let _ = msg_tx.send(Message::ActionProgress { message }).await;
}

fn local_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

async fn upload<T: Transport + Sync>(
    transport: &T,
    files: &[std::path::PathBuf],
    dest_dir: &str,
    msg_tx: &mpsc::Sender<Message>,
) -> Message {
    for local in files {
        let name = local_name(local);
        progress(msg_tx, format!("Uploading {}...", name)).await;
        if let Err(e) = transport.push(local, &join(dest_dir, &name)).await {
            return failed("Upload Error", format!("Upload failed on {}: {}", name, e));
        }
    }
    finished(
        "Done",
        format!("Uploaded {} file(s).", files.len()),
        Refresh::Directory(dest_dir.to_string()),
    )
}

async fn download<T: Transport + Sync>(
    transport: &T,
    remote_files: &[String],
    dest_dir: &Path,
    msg_tx: &mpsc::Sender<Message>,
) -> Message {
    if let Err(e) = tokio::fs::create_dir_all(dest_dir).await {
        return failed(
            "Download Error",
            format!("Cannot create {}: {}", dest_dir.display(), e),
        );
    }
    for remote in remote_files {
        let name = file_name(remote);
        progress(msg_tx, format!("Downloading {}...", name)).await;
        if let Err(e) = transport.pull(remote, &dest_dir.join(name)).await {
            return failed("Download Error", format!("Download failed on {}: {}", name, e));
        }
    }
    finished(
        "Done",
        format!("Downloaded {} file(s).", remote_files.len()),
        Refresh::None,
    )
}

async fn uninstall<T: Transport + Sync>(
    transport: &T,
    apps: &[AppRecord],
    msg_tx: &mpsc::Sender<Message>,
) -> Message {
    for app in apps {
        progress(msg_tx, format!("Uninstalling {}...", app.name)).await;
        if let Err(e) = transport.uninstall(&app.bundle_id).await {
            return failed(
                "Uninstall Error",
                format!("Failed to uninstall {}: {}", app.name, e),
            );
        }
    }
    let message = match apps {
        [app] => format!("'{}' uninstalled.", app.name),
        _ => format!("Uninstalled {} applications.", apps.len()),
    };
    finished("Done", message, Refresh::Apps)
}

async fn install<T: Transport + Sync>(
    transport: &T,
    package: &Path,
    msg_tx: &mpsc::Sender<Message>,
) -> Message {
    progress(msg_tx, format!("Installing {}...", local_name(package))).await;
    match transport.install(package).await {
        Ok(()) => finished("Done", "Install successful.", Refresh::Apps),
        Err(e) => failed("Install Error", format!("Install failed: {}", e)),
    }
}

async fn screenshot<T: Transport + Sync>(
    transport: &T,
    dest: &Path,
    msg_tx: &mpsc::Sender<Message>,
) -> Message {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            return failed("Screenshot Error", format!("Cannot create {}: {}", parent.display(), e));
        }
    }
    progress(msg_tx, "Taking screenshot...".to_string()).await;
    match transport.screenshot(dest).await {
        Ok(()) => finished(
            "Success",
            format!("Screenshot saved to: {}", dest.display()),
            Refresh::None,
        ),
        Err(e) => failed("Screenshot Error", format!("Screenshot failed: {}", e)),
    }
}

fn documents_summary(bundle_id: &str, entries: &[String]) -> String {
    let entries: Vec<&String> = entries
        .iter()
        .filter(|e| e.as_str() != "." && e.as_str() != "..")
        .collect();
    if entries.is_empty() {
        return format!("App: {}\n\nDocuments folder empty/inaccessible.", bundle_id);
    }
    let mut text = format!("App: {}\n\nDocuments:", bundle_id);
    for entry in entries {
        text.push_str("\n- ");
        text.push_str(entry);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use afcdeck_core::{BatteryInfo, InstallType};
    use afcdeck_device::test_utils::{FakeCall, FakeTransport};
    use std::path::PathBuf;

    async fn run(transport: &FakeTransport, action: DeviceAction) -> Vec<Message> {
        let (tx, mut rx) = mpsc::channel(64);
        execute(transport, action, &tx).await;
        drop(tx);
        let mut msgs = Vec::new();
        while let Some(msg) = rx.recv().await {
            msgs.push(msg);
        }
        msgs
    }

    fn outcomes(msgs: &[Message]) -> Vec<&Message> {
        msgs.iter()
            .filter(|m| matches!(m, Message::ActionFinished { .. } | Message::ActionFailed { .. }))
            .collect()
    }

    #[tokio::test]
    async fn test_download_aborts_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let t = FakeTransport::new("abc")
            .with_file("/DCIM/a.jpg", 1)
            .with_file("/DCIM/b.jpg", 1)
            .with_file("/DCIM/c.jpg", 1)
            .with_pull_error("/DCIM/b.jpg");

        let msgs = run(
            &t,
            DeviceAction::Download {
                remote_files: vec![
                    "/DCIM/a.jpg".into(),
                    "/DCIM/b.jpg".into(),
                    "/DCIM/c.jpg".into(),
                ],
                dest_dir: dir.path().to_path_buf(),
            },
        )
        .await;

        let outcomes = outcomes(&msgs);
        assert_eq!(outcomes.len(), 1);
        match outcomes[0] {
            Message::ActionFailed { title, message } => {
                assert_eq!(title, "Download Error");
                assert!(message.contains("b.jpg"));
            }
            other => panic!("unexpected {:?}", other),
        }
        let pulls: Vec<String> = t
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                FakeCall::Pull(remote, _) => Some(remote),
                _ => None,
            })
            .collect();
        assert_eq!(pulls, vec!["/DCIM/a.jpg", "/DCIM/b.jpg"]);
        assert!(dir.path().join("a.jpg").exists());
        assert!(!dir.path().join("c.jpg").exists());
    }

    #[tokio::test]
    async fn test_upload_refreshes_destination() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("notes.txt");
        std::fs::write(&local, "hi").unwrap();
        let t = FakeTransport::new("abc").with_dir("/Downloads", &[]);

        let msgs = run(
            &t,
            DeviceAction::Upload {
                files: vec![local.clone()],
                dest_dir: "/Downloads".into(),
            },
        )
        .await;

        assert!(matches!(
            msgs.first(),
            Some(Message::ActionProgress { message }) if message == "Uploading notes.txt..."
        ));
        match outcomes(&msgs)[0] {
            Message::ActionFinished { message, refresh, .. } => {
                assert_eq!(message, "Uploaded 1 file(s).");
                assert_eq!(*refresh, Refresh::Directory("/Downloads".into()));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(t
            .calls()
            .contains(&FakeCall::Push(local, "/Downloads/notes.txt".into())));
    }

    #[tokio::test]
    async fn test_upload_failure_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        let t = FakeTransport::new("abc").with_push_error("/b.txt");

        let msgs = run(
            &t,
            DeviceAction::Upload {
                files: vec![a, b],
                dest_dir: "/".into(),
            },
        )
        .await;

        assert!(matches!(
            outcomes(&msgs)[0],
            Message::ActionFailed { title, message }
                if title == "Upload Error" && message.contains("b.txt")
        ));
    }

    fn app(bundle_id: &str, name: &str) -> AppRecord {
        AppRecord::new(bundle_id, Some(name.into()), None, InstallType::User)
    }

    #[tokio::test]
    async fn test_uninstall_refreshes_apps() {
        let t = FakeTransport::new("abc");
        let msgs = run(
            &t,
            DeviceAction::Uninstall {
                apps: vec![app("org.vlc", "VLC")],
            },
        )
        .await;
        assert!(matches!(
            outcomes(&msgs)[0],
            Message::ActionFinished { message, refresh: Refresh::Apps, .. }
                if message == "'VLC' uninstalled."
        ));
    }

    #[tokio::test]
    async fn test_uninstall_many_stops_at_first_failure() {
        let t = FakeTransport::new("abc").with_uninstall_error("busy");
        let msgs = run(
            &t,
            DeviceAction::Uninstall {
                apps: vec![app("org.vlc", "VLC"), app("com.example.notes", "Notes")],
            },
        )
        .await;

        let outcomes = outcomes(&msgs);
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            outcomes[0],
            Message::ActionFailed { title, message }
                if title == "Uninstall Error" && message.contains("VLC")
        ));
        assert_eq!(t.count(|c| matches!(c, FakeCall::Uninstall(_))), 1);
    }

    #[tokio::test]
    async fn test_uninstall_many_reports_count() {
        let t = FakeTransport::new("abc");
        let msgs = run(
            &t,
            DeviceAction::Uninstall {
                apps: vec![app("org.vlc", "VLC"), app("com.example.notes", "Notes")],
            },
        )
        .await;
        assert!(matches!(
            outcomes(&msgs)[0],
            Message::ActionFinished { message, .. } if message == "Uninstalled 2 applications."
        ));
        assert_eq!(t.count(|c| matches!(c, FakeCall::Uninstall(_))), 2);
    }

    #[tokio::test]
    async fn test_install_failure() {
        let t = FakeTransport::new("abc").with_install_error("bad signature");
        let msgs = run(
            &t,
            DeviceAction::Install {
                package: PathBuf::from("/tmp/app.ipa"),
            },
        )
        .await;
        assert!(matches!(
            outcomes(&msgs)[0],
            Message::ActionFailed { message, .. } if message.starts_with("Install failed:")
        ));
    }

    #[tokio::test]
    async fn test_power_success_disconnects() {
        let t = FakeTransport::new("abc");
        let msgs = run(&t, DeviceAction::Power(PowerAction::Reboot)).await;
        assert_eq!(msgs.len(), 2);
        assert!(matches!(&msgs[0], Message::ActionFinished { title, .. } if title == "Reboot"));
        assert!(matches!(
            &msgs[1],
            Message::DeviceDisconnected { reason } if reason == "Reboot initiated."
        ));
        assert_eq!(t.count(|c| *c == FakeCall::Restart), 1);
    }

    #[tokio::test]
    async fn test_power_failure_keeps_connection() {
        let t = FakeTransport::new("abc").with_power_error("diagnostics unavailable");
        let msgs = run(&t, DeviceAction::Power(PowerAction::Shutdown)).await;
        assert_eq!(msgs.len(), 1);
        assert!(matches!(
            &msgs[0],
            Message::ActionFailed { title, .. } if title == "Shutdown Error"
        ));
    }

    #[tokio::test]
    async fn test_battery_summary() {
        let t = FakeTransport::new("abc").with_battery(BatteryInfo {
            level: Some(80),
            status: Some("Charging".into()),
        });
        let msgs = run(&t, DeviceAction::Battery).await;
        assert!(matches!(
            &msgs[0],
            Message::ActionFinished { message, .. } if message.contains("80%")
        ));
    }

    #[tokio::test]
    async fn test_explore_documents() {
        let t = FakeTransport::new("abc")
            .with_documents("org.vlc", &["movie.mkv"])
            .with_documents("org.empty", &[]);

        let msgs = run(&t, DeviceAction::ExploreDocuments { bundle_id: "org.vlc".into() }).await;
        assert!(matches!(
            &msgs[0],
            Message::ActionFinished { message, .. } if message.ends_with("Documents:\n- movie.mkv")
        ));

        let msgs = run(&t, DeviceAction::ExploreDocuments { bundle_id: "org.empty".into() }).await;
        assert!(matches!(
            &msgs[0],
            Message::ActionFinished { message, .. } if message.contains("empty/inaccessible")
        ));

        let msgs = run(&t, DeviceAction::ExploreDocuments { bundle_id: "org.none".into() }).await;
        assert!(matches!(
            &msgs[0],
            Message::ActionFailed { title, .. } if title == "Explore Error"
        ));
    }

    #[tokio::test]
    async fn test_screenshot_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("shots").join("s.png");
        let t = FakeTransport::new("abc");
        let msgs = run(&t, DeviceAction::Screenshot { dest: dest.clone() }).await;
        assert!(matches!(
            outcomes(&msgs)[0],
            Message::ActionFinished { title, .. } if title == "Success"
        ));
        assert!(dest.exists());
    }

    #[tokio::test]
    async fn test_refresh_device_info() {
        let t = FakeTransport::new("abc");
        let msgs = run(&t, DeviceAction::RefreshDeviceInfo).await;
        assert!(matches!(
            &msgs[0],
            Message::DeviceInfoLoaded { properties }
                if properties.get("DeviceName").map(String::as_str) == Some("Test iPhone")
        ));
    }
}
