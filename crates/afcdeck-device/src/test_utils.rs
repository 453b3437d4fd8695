//! Test utilities for device transports
//!
//! Provides a scripted [`FakeBackend`] / [`FakeTransport`] pair that records
//! every call, so orchestration code can be tested without a device.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use afcdeck_core::prelude::*;
use afcdeck_core::{normalize as device_path_key, AppRecord, BatteryInfo, PropertyMap};
use tokio::sync::mpsc;

use crate::transport::{DeviceBackend, FileInfo, LogLines, Transport};

/// A scripted failure: kind plus message
pub type FakeError = (DeviceErrorKind, String);

fn to_error(err: &FakeError) -> Error {
    Error::device(err.0, err.1.clone())
}

/// One recorded transport call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    Properties,
    Property(String),
    MountImage(PathBuf),
    StartFileService,
    ListDir(String),
    Stat(String),
    Pull(String, PathBuf),
    Push(PathBuf, String),
    ListApps,
    Install(PathBuf),
    Uninstall(String),
    ListDocuments(String),
    Screenshot(PathBuf),
    Battery,
    Restart,
    Shutdown,
    EnterRecovery,
    LogStream,
    Close,
}

/// One scripted item of a log stream
#[derive(Debug, Clone)]
pub enum FakeLogItem {
    Line(String),
    Fail(String),
}

#[derive(Default)]
struct FakeState {
    properties: Option<std::result::Result<PropertyMap, FakeError>>,
    mount_error: Option<FakeError>,
    file_service_error: Option<FakeError>,
    dirs: HashMap<String, Vec<String>>,
    files: HashMap<String, u64>,
    dir_errors: HashMap<String, FakeError>,
    stat_errors: HashSet<String>,
    pull_errors: HashSet<String>,
    push_errors: HashSet<String>,
    apps: Option<std::result::Result<Vec<AppRecord>, FakeError>>,
    install_error: Option<FakeError>,
    uninstall_error: Option<FakeError>,
    documents: HashMap<String, Vec<String>>,
    battery: Option<BatteryInfo>,
    power_error: Option<FakeError>,
    log_items: Vec<FakeLogItem>,
    hold_log_open: bool,
    log_senders: Vec<mpsc::Sender<Result<String>>>,
    calls: Vec<FakeCall>,
}

/// Scripted in-memory device session.
///
/// Clones share state, so a test can keep one handle while the code under
/// test owns another.
#[derive(Clone)]
pub struct FakeTransport {
    udid: String,
    state: Arc<Mutex<FakeState>>,
    closed: Arc<AtomicBool>,
}

impl std::fmt::Debug for FakeTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeTransport")
            .field("udid", &self.udid)
            .finish_non_exhaustive()
    }
}

impl FakeTransport {
    /// A device named "Test iPhone" with no directories and no apps
    pub fn new(udid: &str) -> Self {
        let mut properties = PropertyMap::new();
        properties.insert("DeviceName".into(), "Test iPhone".into());
        properties.insert("ProductType".into(), "iPhone15,2".into());
        properties.insert("ProductVersion".into(), "17.4".into());
        properties.insert("UniqueDeviceID".into(), udid.into());

        let state = FakeState {
            properties: Some(Ok(properties)),
            apps: Some(Ok(Vec::new())),
            ..Default::default()
        };

        Self {
            udid: udid.to_string(),
            state: Arc::new(Mutex::new(state)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: FakeCall) {
        self.state().calls.push(call);
    }

    fn check_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(Error::NotConnected)
        } else {
            Ok(())
        }
    }

    // ─────────────────────────────────────────────────────────
    // Scripting
    // ─────────────────────────────────────────────────────────

    pub fn with_properties(self, properties: PropertyMap) -> Self {
        self.state().properties = Some(Ok(properties));
        self
    }

    pub fn with_properties_error(self, kind: DeviceErrorKind, msg: &str) -> Self {
        self.state().properties = Some(Err((kind, msg.to_string())));
        self
    }

    pub fn with_mount_error(self, msg: &str) -> Self {
        self.state().mount_error = Some((DeviceErrorKind::Other, msg.to_string()));
        self
    }

    pub fn with_file_service_error(self, kind: DeviceErrorKind, msg: &str) -> Self {
        self.state().file_service_error = Some((kind, msg.to_string()));
        self
    }

    /// Add a directory with its child names
    pub fn with_dir(self, path: &str, children: &[&str]) -> Self {
        self.state().dirs.insert(
            device_path_key(path),
            children.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    /// Add a regular file
    pub fn with_file(self, path: &str, size: u64) -> Self {
        self.state().files.insert(device_path_key(path), size);
        self
    }

    /// Make listing a directory fail
    pub fn with_dir_error(self, path: &str, kind: DeviceErrorKind, msg: &str) -> Self {
        self.state()
            .dir_errors
            .insert(device_path_key(path), (kind, msg.to_string()));
        self
    }

    /// Make stat on a path fail
    pub fn with_stat_error(self, path: &str) -> Self {
        self.state().stat_errors.insert(device_path_key(path));
        self
    }

    pub fn with_pull_error(self, remote: &str) -> Self {
        self.state().pull_errors.insert(device_path_key(remote));
        self
    }

    pub fn with_push_error(self, remote: &str) -> Self {
        self.state().push_errors.insert(device_path_key(remote));
        self
    }

    pub fn with_apps(self, apps: Vec<AppRecord>) -> Self {
        self.state().apps = Some(Ok(apps));
        self
    }

    pub fn with_apps_error(self, msg: &str) -> Self {
        self.state().apps = Some(Err((DeviceErrorKind::Other, msg.to_string())));
        self
    }

    pub fn with_install_error(self, msg: &str) -> Self {
        self.state().install_error = Some((DeviceErrorKind::Other, msg.to_string()));
        self
    }

    pub fn with_uninstall_error(self, msg: &str) -> Self {
        self.state().uninstall_error = Some((DeviceErrorKind::Other, msg.to_string()));
        self
    }

    pub fn with_documents(self, bundle_id: &str, entries: &[&str]) -> Self {
        self.state().documents.insert(
            bundle_id.to_string(),
            entries.iter().map(|e| e.to_string()).collect(),
        );
        self
    }

    pub fn with_battery(self, battery: BatteryInfo) -> Self {
        self.state().battery = Some(battery);
        self
    }

    pub fn with_power_error(self, msg: &str) -> Self {
        self.state().power_error = Some((DeviceErrorKind::Other, msg.to_string()));
        self
    }

    /// Script the log stream. With `hold_open` the stream stays open after
    /// the scripted items, and [`push_log_line`](Self::push_log_line) can
    /// deliver more.
    pub fn with_log(self, items: Vec<FakeLogItem>, hold_open: bool) -> Self {
        {
            let mut state = self.state();
            state.log_items = items;
            state.hold_log_open = hold_open;
        }
        self
    }

    /// Deliver one more line on every open log stream
    pub fn push_log_line(&self, line: &str) -> bool {
        let senders = self.state().log_senders.clone();
        senders
            .iter()
            .any(|tx| tx.try_send(Ok(line.to_string())).is_ok())
    }

    /// Close every held log stream
    pub fn end_log(&self) {
        self.state().log_senders.clear();
    }

    // ─────────────────────────────────────────────────────────
    // Inspection
    // ─────────────────────────────────────────────────────────

    pub fn calls(&self) -> Vec<FakeCall> {
        self.state().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&FakeCall) -> bool) -> usize {
        self.state().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn power(&self, call: FakeCall) -> Result<()> {
        self.check_open()?;
        self.record(call);
        match &self.state().power_error {
            Some(err) => Err(to_error(err)),
            None => Ok(()),
        }
    }
}

fn write_local(path: &Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents)?;
    Ok(())
}

impl Transport for FakeTransport {
    fn udid(&self) -> &str {
        &self.udid
    }

    async fn properties(&self) -> Result<PropertyMap> {
        self.check_open()?;
        self.record(FakeCall::Properties);
        match &self.state().properties {
            Some(Ok(map)) => Ok(map.clone()),
            Some(Err(err)) => Err(to_error(err)),
            None => Ok(PropertyMap::new()),
        }
    }

    async fn property(&self, key: &str) -> Result<String> {
        self.check_open()?;
        self.record(FakeCall::Property(key.to_string()));
        match &self.state().properties {
            Some(Ok(map)) => map
                .get(key)
                .cloned()
                .ok_or_else(|| Error::not_found(format!("property {}", key))),
            Some(Err(err)) => Err(to_error(err)),
            None => Err(Error::not_found(key.to_string())),
        }
    }

    async fn mount_developer_image(&self, image: &Path, _signature: Option<&Path>) -> Result<()> {
        self.check_open()?;
        self.record(FakeCall::MountImage(image.to_path_buf()));
        match &self.state().mount_error {
            Some(err) => Err(to_error(err)),
            None => Ok(()),
        }
    }

    async fn start_file_service(&self) -> Result<()> {
        self.check_open()?;
        self.record(FakeCall::StartFileService);
        match &self.state().file_service_error {
            Some(err) => Err(to_error(err)),
            None => Ok(()),
        }
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<String>> {
        self.check_open()?;
        self.record(FakeCall::ListDir(path.to_string()));
        let key = device_path_key(path);
        let state = self.state();
        if let Some(err) = state.dir_errors.get(&key) {
            return Err(to_error(err));
        }
        state
            .dirs
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::not_found(path.to_string()))
    }

    async fn stat(&self, path: &str) -> Result<FileInfo> {
        self.check_open()?;
        self.record(FakeCall::Stat(path.to_string()));
        let key = device_path_key(path);
        let state = self.state();
        if state.stat_errors.contains(&key) {
            return Err(Error::invalid_data(format!("stat failed for {}", path)));
        }
        if let Some(size) = state.files.get(&key) {
            Ok(FileInfo::file(*size))
        } else if state.dirs.contains_key(&key) {
            Ok(FileInfo::dir())
        } else {
            Err(Error::not_found(path.to_string()))
        }
    }

    async fn pull(&self, remote: &str, local: &Path) -> Result<()> {
        self.check_open()?;
        self.record(FakeCall::Pull(remote.to_string(), local.to_path_buf()));
        let key = device_path_key(remote);
        let exists = {
            let state = self.state();
            if state.pull_errors.contains(&key) {
                return Err(Error::device(
                    DeviceErrorKind::Other,
                    format!("read error on {}", remote),
                ));
            }
            state.files.contains_key(&key)
        };
        if !exists {
            return Err(Error::not_found(remote.to_string()));
        }
        write_local(local, remote.as_bytes())
    }

    async fn push(&self, local: &Path, remote: &str) -> Result<()> {
        self.check_open()?;
        self.record(FakeCall::Push(local.to_path_buf(), remote.to_string()));
        let key = device_path_key(remote);
        let mut state = self.state();
        if state.push_errors.contains(&key) {
            return Err(Error::permission_denied(remote.to_string()));
        }
        state.files.insert(key, 0);
        Ok(())
    }

    async fn list_apps(&self) -> Result<Vec<AppRecord>> {
        self.check_open()?;
        self.record(FakeCall::ListApps);
        match &self.state().apps {
            Some(Ok(apps)) => Ok(apps.clone()),
            Some(Err(err)) => Err(to_error(err)),
            None => Ok(Vec::new()),
        }
    }

    async fn install(&self, package: &Path) -> Result<()> {
        self.check_open()?;
        self.record(FakeCall::Install(package.to_path_buf()));
        match &self.state().install_error {
            Some(err) => Err(to_error(err)),
            None => Ok(()),
        }
    }

    async fn uninstall(&self, bundle_id: &str) -> Result<()> {
        self.check_open()?;
        self.record(FakeCall::Uninstall(bundle_id.to_string()));
        let mut state = self.state();
        if let Some(err) = &state.uninstall_error {
            return Err(to_error(err));
        }
        if let Some(Ok(apps)) = &mut state.apps {
            apps.retain(|a| a.bundle_id != bundle_id);
        }
        Ok(())
    }

    async fn list_app_documents(&self, bundle_id: &str) -> Result<Vec<String>> {
        self.check_open()?;
        self.record(FakeCall::ListDocuments(bundle_id.to_string()));
        self.state()
            .documents
            .get(bundle_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{} has no Documents folder", bundle_id)))
    }

    async fn screenshot(&self, dest: &Path) -> Result<()> {
        self.check_open()?;
        self.record(FakeCall::Screenshot(dest.to_path_buf()));
        write_local(dest, b"PNG")
    }

    async fn battery(&self) -> Result<BatteryInfo> {
        self.check_open()?;
        self.record(FakeCall::Battery);
        Ok(self.state().battery.clone().unwrap_or_default())
    }

    async fn restart(&self) -> Result<()> {
        self.power(FakeCall::Restart)
    }

    async fn shutdown(&self) -> Result<()> {
        self.power(FakeCall::Shutdown)
    }

    async fn enter_recovery(&self) -> Result<()> {
        self.power(FakeCall::EnterRecovery)
    }

    async fn log_stream(&self) -> Result<LogLines> {
        self.check_open()?;
        self.record(FakeCall::LogStream);
        let mut state = self.state();
        let (tx, rx) = mpsc::channel(state.log_items.len() + 64);
        for item in &state.log_items {
            let msg = match item {
                FakeLogItem::Line(line) => Ok(line.clone()),
                FakeLogItem::Fail(msg) => {
                    Err(Error::device(DeviceErrorKind::NotConnected, msg.clone()))
                }
            };
            let _ = tx.try_send(msg);
        }
        if state.hold_log_open {
            state.log_senders.push(tx);
        }
        Ok(rx)
    }

    async fn close(&self) {
        self.record(FakeCall::Close);
        self.closed.store(true, Ordering::SeqCst);
        self.state().log_senders.clear();
    }
}

// ─────────────────────────────────────────────────────────────────
// Backend
// ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct BackendState {
    polls: VecDeque<std::result::Result<Vec<String>, FakeError>>,
    poll_count: usize,
    open_error: Option<FakeError>,
    opened: Vec<String>,
}

/// Scripted device backend handing out clones of one [`FakeTransport`]
#[derive(Clone)]
pub struct FakeBackend {
    transport: FakeTransport,
    state: Arc<Mutex<BackendState>>,
}

impl std::fmt::Debug for FakeBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeBackend")
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl FakeBackend {
    pub fn new(transport: FakeTransport) -> Self {
        Self {
            transport,
            state: Arc::new(Mutex::new(BackendState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue one poll result. Once the queue is empty every poll reports
    /// no device.
    pub fn with_poll(self, devices: &[&str]) -> Self {
        self.state()
            .polls
            .push_back(Ok(devices.iter().map(|d| d.to_string()).collect()));
        self
    }

    pub fn with_poll_error(self, msg: &str) -> Self {
        self.state()
            .polls
            .push_back(Err((DeviceErrorKind::Other, msg.to_string())));
        self
    }

    pub fn with_open_error(self, kind: DeviceErrorKind, msg: &str) -> Self {
        self.state().open_error = Some((kind, msg.to_string()));
        self
    }

    /// Queue a device as attached on the next poll
    pub fn attach(&self, udid: &str) {
        self.state().polls.push_back(Ok(vec![udid.to_string()]));
    }

    pub fn transport(&self) -> &FakeTransport {
        &self.transport
    }

    pub fn poll_count(&self) -> usize {
        self.state().poll_count
    }

    /// Identifiers passed to `open`, in order
    pub fn opened(&self) -> Vec<String> {
        self.state().opened.clone()
    }
}

impl DeviceBackend for FakeBackend {
    type Transport = FakeTransport;

    async fn list_devices(&self) -> Result<Vec<String>> {
        let mut state = self.state();
        state.poll_count += 1;
        match state.polls.pop_front() {
            Some(Ok(devices)) => Ok(devices),
            Some(Err(err)) => Err(to_error(&err)),
            None => Ok(Vec::new()),
        }
    }

    async fn open(&self, udid: &str) -> Result<FakeTransport> {
        let mut state = self.state();
        state.opened.push(udid.to_string());
        if let Some(err) = &state.open_error {
            return Err(to_error(err));
        }
        self.transport.closed.store(false, Ordering::SeqCst);
        Ok(self.transport.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_listing_and_stat() {
        let t = FakeTransport::new("abc")
            .with_dir("/", &["DCIM", "notes.txt"])
            .with_dir("/DCIM", &[])
            .with_file("/notes.txt", 12);

        assert_eq!(t.list_dir("/").await.unwrap(), vec!["DCIM", "notes.txt"]);
        assert!(t.stat("/DCIM").await.unwrap().is_dir);
        assert_eq!(t.stat("/notes.txt").await.unwrap(), FileInfo::file(12));
        assert!(t.stat("/missing").await.is_err());
    }

    #[tokio::test]
    async fn test_fake_dir_error_is_typed() {
        let t = FakeTransport::new("abc").with_dir_error(
            "/private",
            DeviceErrorKind::PermissionDenied,
            "PERM_DENIED",
        );
        assert!(t.list_dir("/private").await.unwrap_err().is_permission_denied());
    }

    #[tokio::test]
    async fn test_fake_close_rejects_calls() {
        let t = FakeTransport::new("abc");
        t.close().await;
        assert!(t.is_closed());
        assert!(matches!(t.properties().await, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn test_fake_backend_polls_in_order() {
        let backend = FakeBackend::new(FakeTransport::new("abc"))
            .with_poll(&[])
            .with_poll(&["abc"]);
        assert!(backend.list_devices().await.unwrap().is_empty());
        assert_eq!(backend.list_devices().await.unwrap(), vec!["abc"]);
        assert!(backend.list_devices().await.unwrap().is_empty());
        assert_eq!(backend.poll_count(), 3);
    }

    #[tokio::test]
    async fn test_fake_log_stream_held_open() {
        let t = FakeTransport::new("abc")
            .with_log(vec![FakeLogItem::Line("one".into())], true);
        let mut rx = t.log_stream().await.unwrap();
        assert_eq!(rx.recv().await.unwrap().unwrap(), "one");
        assert!(t.push_log_line("two"));
        assert_eq!(rx.recv().await.unwrap().unwrap(), "two");
        t.end_log();
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_fake_close_ends_log_stream() {
        let t = FakeTransport::new("abc").with_log(vec![], true);
        let mut rx = t.log_stream().await.unwrap();
        t.close().await;
        assert!(rx.recv().await.is_none());
        assert!(!t.push_log_line("late"));
    }
}
