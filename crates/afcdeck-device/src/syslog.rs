//! Device syslog relay via `idevicesyslog`

use std::process::Stdio;

use afcdeck_core::prelude::*;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Child;
use tokio::sync::{mpsc, watch};

use crate::runner::{classify_failure, spawn_error, ToolRunner};
use crate::transport::LogLines;

const SYSLOG_TOOL: &str = "idevicesyslog";

/// Buffered lines between the reader task and the consumer
const LINE_BUFFER: usize = 256;

/// How a relay loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelayEnd {
    /// The tool closed its stdout
    Eof,
    /// The owning session was closed
    SessionClosed,
    /// The receiver went away or reading failed
    Abandoned,
}

/// Spawn `idevicesyslog` for a device and relay its stdout lines.
///
/// The child is killed when `closed` turns true, or once the returned
/// receiver is dropped and the reader task notices on its next send.
pub fn spawn_syslog(
    runner: &ToolRunner,
    udid: &str,
    closed: watch::Receiver<bool>,
) -> Result<LogLines> {
    let mut child = runner
        .command(SYSLOG_TOOL)
        .args(["-u", udid, "--no-colors"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| spawn_error(SYSLOG_TOOL, e))?;

    info!("{} started with PID: {:?}", SYSLOG_TOOL, child.id());

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::process("idevicesyslog stdout was not captured"))?;

    let (tx, rx) = mpsc::channel(LINE_BUFFER);
    tokio::spawn(supervise(child, stdout, closed, tx));
    Ok(rx)
}

/// Own the child for the lifetime of the relay and report how it ended
async fn supervise<R>(
    mut child: Child,
    stdout: R,
    mut closed: watch::Receiver<bool>,
    tx: mpsc::Sender<Result<String>>,
) where
    R: AsyncRead + Unpin,
{
    // Drained concurrently so a chatty stderr never blocks the tool
    let stderr = child.stderr.take().map(|s| tokio::spawn(drain(s)));

    match relay_lines(stdout, &mut closed, &tx).await {
        RelayEnd::Eof => {}
        RelayEnd::SessionClosed => {
            debug!("Session closed, stopping {}", SYSLOG_TOOL);
            let _ = child.kill().await;
            return;
        }
        RelayEnd::Abandoned => {
            let _ = child.kill().await;
            return;
        }
    }

    let stderr = match stderr {
        Some(task) => task.await.unwrap_or_default(),
        None => String::new(),
    };

    match child.wait().await {
        Ok(status) if status.success() => {
            debug!("{} exited cleanly", SYSLOG_TOOL);
        }
        Ok(status) => {
            warn!("{} exited with {:?}", SYSLOG_TOOL, status.code());
            let _ = tx.send(Err(classify_failure(SYSLOG_TOOL, &stderr, ""))).await;
        }
        Err(e) => {
            let _ = tx.send(Err(Error::Io(e))).await;
        }
    }
}

/// Forward lines until EOF, a read error, the receiver going away or the
/// session closing. A dropped session sender counts as closed.
async fn relay_lines<R>(
    stdout: R,
    closed: &mut watch::Receiver<bool>,
    tx: &mpsc::Sender<Result<String>>,
) -> RelayEnd
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stdout).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if tx.send(Ok(line)).await.is_err() {
                        debug!("syslog receiver dropped, stopping relay");
                        return RelayEnd::Abandoned;
                    }
                }
                Ok(None) => return RelayEnd::Eof,
                Err(e) => {
                    let _ = tx.send(Err(Error::Io(e))).await;
                    return RelayEnd::Abandoned;
                }
            },
            _ = async { let _ = closed.wait_for(|closed| *closed).await; } => return RelayEnd::SessionClosed,
        }
    }
}

async fn drain<R: AsyncRead + Unpin>(mut reader: R) -> String {
    let mut buf = Vec::new();
    let _ = reader.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).into_owned()
}
