//! libimobiledevice-backed device backend
//!
//! Every transport operation is one invocation of a libimobiledevice
//! command-line tool. Failed invocations are classified into typed
//! [`DeviceErrorKind`]s from the tool's diagnostic output.

use std::path::Path;

use afcdeck_core::prelude::*;
use afcdeck_core::{AppRecord, BatteryInfo, InstallType, PropertyMap};
use tokio::sync::watch;

use crate::parse;
use crate::runner::ToolRunner;
use crate::syslog::spawn_syslog;
use crate::transport::{DeviceBackend, FileInfo, LogLines, Transport};

const BATTERY_DOMAIN: &str = "com.apple.mobile.battery";

/// Device backend driving the libimobiledevice tools
#[derive(Debug, Clone, Default)]
pub struct ImobileBackend {
    runner: ToolRunner,
}

impl ImobileBackend {
    pub fn new(runner: ToolRunner) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &ToolRunner {
        &self.runner
    }
}

impl DeviceBackend for ImobileBackend {
    type Transport = ImobileTransport;

    async fn list_devices(&self) -> Result<Vec<String>> {
        match self.runner.run("idevice_id", ["-l"]).await {
            Ok(output) => Ok(parse::parse_device_ids(&output.stdout)),
            // Some versions exit non-zero when nothing is attached
            Err(e) if e.device_kind() == DeviceErrorKind::NotConnected => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn open(&self, udid: &str) -> Result<ImobileTransport> {
        // Cheapest call that needs a paired, reachable device
        self.runner
            .run("ideviceinfo", ["-u", udid, "-k", "DeviceName"])
            .await?;

        info!("Opened session with {}", udid);
        Ok(ImobileTransport::new(udid, self.runner.clone()))
    }
}

/// Session with one device reached through libimobiledevice tools.
///
/// Closing flips `closed`, which also ends every syslog relay started
/// from this session.
#[derive(Debug)]
pub struct ImobileTransport {
    udid: String,
    runner: ToolRunner,
    closed: watch::Sender<bool>,
}

impl ImobileTransport {
    fn new(udid: &str, runner: ToolRunner) -> Self {
        Self {
            udid: udid.to_string(),
            runner,
            closed: watch::Sender::new(false),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if *self.closed.borrow() {
            Err(Error::NotConnected)
        } else {
            Ok(())
        }
    }

    /// Run a tool with `-u UDID` prepended to its arguments
    async fn run_for_device(&self, tool: &str, args: &[&str]) -> Result<String> {
        self.ensure_open()?;
        let mut full = vec!["-u", self.udid.as_str()];
        full.extend_from_slice(args);
        Ok(self.runner.run(tool, full).await?.stdout)
    }

    async fn afc(&self, args: &[&str]) -> Result<String> {
        self.run_for_device("afcclient", args).await
    }
}

impl Transport for ImobileTransport {
    fn udid(&self) -> &str {
        &self.udid
    }

    async fn properties(&self) -> Result<PropertyMap> {
        let out = self.run_for_device("ideviceinfo", &[]).await?;
        Ok(parse::parse_properties(&out))
    }

    async fn property(&self, key: &str) -> Result<String> {
        let out = self.run_for_device("ideviceinfo", &["-k", key]).await?;
        let value = out.trim();
        if value.is_empty() {
            Err(Error::not_found(format!("property {}", key)))
        } else {
            Ok(value.to_string())
        }
    }

    async fn mount_developer_image(&self, image: &Path, signature: Option<&Path>) -> Result<()> {
        let image = image.to_string_lossy();
        let signature = signature.map(|s| s.to_string_lossy());
        let mut args = vec![&*image];
        if let Some(sig) = &signature {
            args.push(&**sig);
        }
        self.run_for_device("ideviceimagemounter", &args).await?;
        Ok(())
    }

    async fn start_file_service(&self) -> Result<()> {
        self.afc(&["devinfo"]).await?;
        Ok(())
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<String>> {
        let out = self.afc(&["ls", path]).await?;
        Ok(parse::parse_dir_entries(&out))
    }

    async fn stat(&self, path: &str) -> Result<FileInfo> {
        let out = self.afc(&["info", path]).await?;
        parse::parse_file_info(&out)
            .ok_or_else(|| Error::invalid_data(format!("no file type reported for {}", path)))
    }

    async fn pull(&self, remote: &str, local: &Path) -> Result<()> {
        let local = local.to_string_lossy();
        self.afc(&["get", remote, &*local]).await?;
        Ok(())
    }

    async fn push(&self, local: &Path, remote: &str) -> Result<()> {
        let local = local.to_string_lossy();
        self.afc(&["put", &*local, remote]).await?;
        Ok(())
    }

    async fn list_apps(&self) -> Result<Vec<AppRecord>> {
        let user = self
            .run_for_device("ideviceinstaller", &["list", "--user"])
            .await?;
        let system = self
            .run_for_device("ideviceinstaller", &["list", "--system"])
            .await?;

        let mut apps = parse::parse_app_list(&user, InstallType::User);
        apps.extend(parse::parse_app_list(&system, InstallType::System));
        AppRecord::sort(&mut apps);
        Ok(apps)
    }

    async fn install(&self, package: &Path) -> Result<()> {
        let package = package.to_string_lossy();
        self.run_for_device("ideviceinstaller", &["install", &*package])
            .await?;
        Ok(())
    }

    async fn uninstall(&self, bundle_id: &str) -> Result<()> {
        self.run_for_device("ideviceinstaller", &["uninstall", bundle_id])
            .await?;
        Ok(())
    }

    async fn list_app_documents(&self, bundle_id: &str) -> Result<Vec<String>> {
        let out = self
            .afc(&["--documents", bundle_id, "ls", "/Documents"])
            .await?;
        Ok(parse::parse_dir_entries(&out))
    }

    async fn screenshot(&self, dest: &Path) -> Result<()> {
        let dest = dest.to_string_lossy();
        self.run_for_device("idevicescreenshot", &[&*dest])
            .await?;
        Ok(())
    }

    async fn battery(&self) -> Result<BatteryInfo> {
        let out = self
            .run_for_device("ideviceinfo", &["-q", BATTERY_DOMAIN])
            .await?;
        Ok(parse::parse_battery(&parse::parse_properties(&out)))
    }

    async fn restart(&self) -> Result<()> {
        self.run_for_device("idevicediagnostics", &["restart"]).await?;
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.run_for_device("idevicediagnostics", &["shutdown"])
            .await?;
        Ok(())
    }

    async fn enter_recovery(&self) -> Result<()> {
        self.ensure_open()?;
        // Takes the identifier positionally rather than via -u
        self.runner
            .run("ideviceenterrecovery", [self.udid.as_str()])
            .await?;
        Ok(())
    }

    async fn log_stream(&self) -> Result<LogLines> {
        self.ensure_open()?;
        spawn_syslog(&self.runner, &self.udid, self.closed.subscribe())
    }

    async fn close(&self) {
        if !self.closed.send_replace(true) {
            info!("Closed session with {}", self.udid);
        }
    }
}
