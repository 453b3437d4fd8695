//! Continuous device syslog relay

use std::sync::Arc;

use afcdeck_core::prelude::*;
use afcdeck_device::Transport;
use tokio::sync::mpsc;

use crate::message::Message;
use crate::shared::StopFlag;

/// Inline marker shown in the log view when the stream fails
pub fn error_marker(error: &impl std::fmt::Display) -> String {
    format!("--- SYSLOG ERROR: {} ---", error)
}

pub fn spawn_log_stream<T>(transport: Arc<T>, stop: StopFlag, msg_tx: mpsc::Sender<Message>)
where
    T: Transport + Sync + 'static,
{
    tokio::spawn(async move {
        run_log_stream(transport.as_ref(), &stop, &msg_tx).await;
    });
}

/// Relay log lines until stopped, the stream ends or it fails.
///
/// The stop flag is checked once per received line; the line that observes
/// it is dropped. Exactly one `LogStreamStopped` is sent on every exit path.
pub async fn run_log_stream<T: Transport + Sync>(
    transport: &T,
    stop: &StopFlag,
    msg_tx: &mpsc::Sender<Message>,
) {
    match transport.log_stream().await {
        Ok(mut lines) => {
            info!("Syslog stream started for {}", transport.udid());
            while let Some(item) = lines.recv().await {
                match item {
                    Ok(line) => {
                        if stop.is_stopped() {
                            break;
                        }
                        if msg_tx.send(Message::LogLine { line }).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Syslog stream failed: {}", e);
                        let line = error_marker(&e);
                        let _ = msg_tx.send(Message::LogLine { line }).await;
                        break;
                    }
                }
            }
        }
        Err(e) => {
            warn!("Could not start syslog stream: {}", e);
            let _ = msg_tx.send(Message::LogLine { line: error_marker(&e) }).await;
        }
    }

    debug!("Syslog stream stopped");
    let _ = msg_tx.send(Message::LogStreamStopped).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use afcdeck_device::test_utils::{FakeLogItem, FakeTransport};

    fn lines(msgs: &[Message]) -> Vec<String> {
        msgs.iter()
            .filter_map(|m| match m {
                Message::LogLine { line } => Some(line.clone()),
                _ => None,
            })
            .collect()
    }

    fn stopped(msgs: &[Message]) -> usize {
        msgs.iter()
            .filter(|m| matches!(m, Message::LogStreamStopped))
            .count()
    }

    async fn collect(mut rx: mpsc::Receiver<Message>) -> Vec<Message> {
        let mut msgs = Vec::new();
        while let Some(msg) = rx.recv().await {
            msgs.push(msg);
        }
        msgs
    }

    #[tokio::test]
    async fn test_end_of_stream_sends_one_stop() {
        let t = FakeTransport::new("abc").with_log(
            vec![FakeLogItem::Line("a".into()), FakeLogItem::Line("b".into())],
            false,
        );
        let (tx, rx) = mpsc::channel(16);
        run_log_stream(&t, &StopFlag::new(), &tx).await;
        drop(tx);

        let msgs = collect(rx).await;
        assert_eq!(lines(&msgs), vec!["a", "b"]);
        assert_eq!(stopped(&msgs), 1);
        assert!(matches!(msgs.last(), Some(Message::LogStreamStopped)));
    }

    #[tokio::test]
    async fn test_stream_error_sends_marker_then_stop() {
        let t = FakeTransport::new("abc").with_log(
            vec![
                FakeLogItem::Line("a".into()),
                FakeLogItem::Fail("device went away".into()),
                FakeLogItem::Line("never".into()),
            ],
            false,
        );
        let (tx, rx) = mpsc::channel(16);
        run_log_stream(&t, &StopFlag::new(), &tx).await;
        drop(tx);

        let msgs = collect(rx).await;
        let lines = lines(&msgs);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("--- SYSLOG ERROR:"));
        assert!(lines[1].contains("device went away"));
        assert_eq!(stopped(&msgs), 1);
    }

    #[tokio::test]
    async fn test_stop_drops_the_observing_line() {
        let t = FakeTransport::new("abc").with_log(vec![FakeLogItem::Line("first".into())], true);
        let stop = StopFlag::new();
        let (tx, mut rx) = mpsc::channel(16);

        let task = {
            let t = t.clone();
            let stop = stop.clone();
            tokio::spawn(async move { run_log_stream(&t, &stop, &tx).await })
        };

        assert!(matches!(rx.recv().await, Some(Message::LogLine { line }) if line == "first"));
        stop.stop();
        assert!(t.push_log_line("after stop"));
        task.await.unwrap();

        let msgs = collect(rx).await;
        assert!(lines(&msgs).is_empty());
        assert_eq!(stopped(&msgs), 1);
    }

    #[tokio::test]
    async fn test_closing_the_session_ends_an_idle_stream() {
        let t = FakeTransport::new("abc").with_log(vec![FakeLogItem::Line("first".into())], true);
        let (tx, mut rx) = mpsc::channel(16);

        let task = {
            let t = t.clone();
            tokio::spawn(async move { run_log_stream(&t, &StopFlag::new(), &tx).await })
        };

        assert!(matches!(rx.recv().await, Some(Message::LogLine { line }) if line == "first"));
        // No further line arrives, so only the close can end the relay
        t.close().await;
        task.await.unwrap();

        let msgs = collect(rx).await;
        assert!(lines(&msgs).is_empty());
        assert_eq!(stopped(&msgs), 1);
    }

    #[tokio::test]
    async fn test_start_failure_still_reports_stop() {
        let t = FakeTransport::new("abc");
        t.close().await;
        let (tx, rx) = mpsc::channel(16);
        run_log_stream(&t, &StopFlag::new(), &tx).await;
        drop(tx);

        let msgs = collect(rx).await;
        assert_eq!(lines(&msgs).len(), 1);
        assert_eq!(stopped(&msgs), 1);
    }
}
