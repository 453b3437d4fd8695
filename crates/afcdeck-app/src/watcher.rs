//! Device watcher: polls for an attached device and hands off the first one

use std::time::Duration;

use afcdeck_core::prelude::*;
use afcdeck_device::DeviceBackend;
use tokio::sync::mpsc;

use crate::message::Message;
use crate::shared::StopFlag;

pub const WAITING_STATUS: &str = "Waiting for device...";

/// Spawn the polling loop on its own task
pub fn spawn_watcher<B>(
    backend: std::sync::Arc<B>,
    stop: StopFlag,
    interval: Duration,
    msg_tx: mpsc::Sender<Message>,
) where
    B: DeviceBackend + Sync + 'static,
{
    tokio::spawn(async move {
        run_watcher(backend.as_ref(), &stop, interval, &msg_tx).await;
    });
}

/// Poll until a device shows up, enumeration fails, or `stop` is set.
///
/// Sends at most one terminal message (`DeviceDetected` or `WatcherFailed`).
/// The flag is set before the hand-off so a watcher never outlives it.
pub async fn run_watcher<B: DeviceBackend + Sync>(
    backend: &B,
    stop: &StopFlag,
    interval: Duration,
    msg_tx: &mpsc::Sender<Message>,
) {
    debug!("Device watcher started ({}ms)", interval.as_millis());

    loop {
        if stop.is_stopped() {
            break;
        }

        match backend.list_devices().await {
            Ok(devices) => match devices.into_iter().next() {
                Some(udid) => {
                    stop.stop();
                    info!("Device detected: {}", udid);
                    let _ = msg_tx.send(Message::DeviceDetected { udid }).await;
                    break;
                }
                None => {
                    let _ = msg_tx
                        .send(Message::WatcherStatus {
                            message: WAITING_STATUS.to_string(),
                        })
                        .await;
                }
            },
            Err(e) => {
                stop.stop();
                error!("Device enumeration failed: {}", e);
                let _ = msg_tx
                    .send(Message::WatcherFailed {
                        error: e.to_string(),
                    })
                    .await;
                break;
            }
        }

        tokio::time::sleep(interval).await;
        if stop.is_stopped() {
            break;
        }
    }

    debug!("Device watcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use afcdeck_device::test_utils::{FakeBackend, FakeTransport};

    fn drain(rx: &mut mpsc::Receiver<Message>) -> Vec<Message> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_hands_off_first_device_once() {
        let backend = FakeBackend::new(FakeTransport::new("aaa"))
            .with_poll(&[])
            .with_poll(&[])
            .with_poll(&["aaa", "bbb"]);
        let stop = StopFlag::new();
        let (tx, mut rx) = mpsc::channel(16);

        run_watcher(&backend, &stop, Duration::from_secs(2), &tx).await;

        let msgs = drain(&mut rx);
        let detected: Vec<_> = msgs
            .iter()
            .filter_map(|m| match m {
                Message::DeviceDetected { udid } => Some(udid.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(detected, vec!["aaa"]);
        assert!(matches!(msgs.last(), Some(Message::DeviceDetected { .. })));
        assert_eq!(
            msgs.iter()
                .filter(|m| matches!(m, Message::WatcherStatus { .. }))
                .count(),
            2
        );
        assert_eq!(backend.poll_count(), 3);
        assert!(stop.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_enumeration_error_stops_watcher() {
        let backend = FakeBackend::new(FakeTransport::new("aaa")).with_poll_error("usbmuxd gone");
        let stop = StopFlag::new();
        let (tx, mut rx) = mpsc::channel(16);

        run_watcher(&backend, &stop, Duration::from_secs(2), &tx).await;

        let msgs = drain(&mut rx);
        assert_eq!(msgs.len(), 1);
        assert!(matches!(
            &msgs[0],
            Message::WatcherFailed { error } if error.contains("usbmuxd gone")
        ));
        assert_eq!(backend.poll_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_sleep_ends_loop_without_handoff() {
        let backend = FakeBackend::new(FakeTransport::new("aaa"));
        let stop = StopFlag::new();
        let (tx, mut rx) = mpsc::channel(64);

        let task = {
            let backend = backend.clone();
            let stop = stop.clone();
            tokio::spawn(async move {
                run_watcher(&backend, &stop, Duration::from_secs(2), &tx).await;
            })
        };

        tokio::time::sleep(Duration::from_secs(5)).await;
        stop.stop();
        // A device attached after the stop must not be handed off
        backend.attach("aaa");
        task.await.unwrap();

        let msgs = drain(&mut rx);
        assert!(msgs
            .iter()
            .all(|m| matches!(m, Message::WatcherStatus { .. })));
        assert!(!msgs.is_empty());
    }

    #[tokio::test]
    async fn test_already_stopped_never_polls() {
        let backend = FakeBackend::new(FakeTransport::new("aaa")).with_poll(&["aaa"]);
        let stop = StopFlag::new();
        stop.stop();
        let (tx, mut rx) = mpsc::channel(4);

        run_watcher(&backend, &stop, Duration::from_millis(10), &tx).await;

        assert_eq!(backend.poll_count(), 0);
        assert!(rx.try_recv().is_err());
    }
}
