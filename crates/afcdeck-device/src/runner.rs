//! Running libimobiledevice command-line tools

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use afcdeck_core::prelude::*;
use tokio::process::Command;
use tokio::time::timeout;

/// Default timeout for one tool invocation
const TOOL_TIMEOUT: Duration = Duration::from_secs(120);

/// Captured output of a successful tool run
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Locates and runs device tools, optionally from a fixed directory
#[derive(Debug, Clone)]
pub struct ToolRunner {
    bin_dir: Option<PathBuf>,
    timeout: Duration,
}

impl Default for ToolRunner {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ToolRunner {
    pub fn new(bin_dir: Option<PathBuf>) -> Self {
        Self {
            bin_dir,
            timeout: TOOL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn bin_dir(&self) -> Option<&Path> {
        self.bin_dir.as_deref()
    }

    /// Program path for a tool: inside `bin_dir` when configured, else the bare name
    pub fn program(&self, tool: &str) -> PathBuf {
        match &self.bin_dir {
            Some(dir) => dir.join(tool),
            None => PathBuf::from(tool),
        }
    }

    /// A `Command` for the tool with stdin closed
    pub fn command(&self, tool: &str) -> Command {
        let mut cmd = Command::new(self.program(tool));
        cmd.stdin(Stdio::null());
        cmd
    }

    /// Run a tool to completion and return its output.
    ///
    /// A non-zero exit status is turned into a typed device error by
    /// classifying the tool's diagnostic output.
    pub async fn run<I, S>(&self, tool: &str, args: I) -> Result<ToolOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
        debug!("Running {} {:?}", tool, args);

        let output = timeout(
            self.timeout,
            self.command(tool)
                .args(&args)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| Error::process(format!("{} timed out", tool)))?
        .map_err(|e| spawn_error(tool, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !stderr.trim().is_empty() {
            trace!("{} stderr: {}", tool, stderr.trim());
        }

        if !output.status.success() {
            let err = classify_failure(tool, &stderr, &stdout);
            debug!(
                "{} exited with {:?}: {}",
                tool,
                output.status.code(),
                err
            );
            return Err(err);
        }

        Ok(ToolOutput { stdout, stderr })
    }
}

/// Map a spawn failure to the tool-not-found error when the binary is missing
pub fn spawn_error(tool: &str, e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        Error::tool_not_found(tool)
    } else {
        Error::ProcessSpawn {
            tool: tool.to_string(),
            reason: e.to_string(),
        }
    }
}

/// Turn the diagnostic output of a failed tool into a typed device error
pub fn classify_failure(tool: &str, stderr: &str, stdout: &str) -> Error {
    let text = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };
    let message = if text.is_empty() {
        format!("{} failed", tool)
    } else {
        first_line(text).to_string()
    };

    Error::device(classify_text(text), message)
}

/// Classify tool output text into a device error kind
pub fn classify_text(text: &str) -> DeviceErrorKind {
    let lower = text.to_lowercase();

    if lower.contains("no device found")
        || lower.contains("device not found")
        || lower.contains("could not connect")
        || lower.contains("no device with udid")
    {
        DeviceErrorKind::NotConnected
    } else if lower.contains("permission denied")
        || lower.contains("perm_denied")
        || lower.contains("operation not permitted")
    {
        DeviceErrorKind::PermissionDenied
    } else if lower.contains("object_not_found")
        || lower.contains("object not found")
        || lower.contains("no such file")
        || lower.contains("does not exist")
        || lower.contains("not installed")
    {
        DeviceErrorKind::NotFound
    } else if lower.contains("invalid") || lower.contains("could not parse") {
        DeviceErrorKind::InvalidData
    } else {
        DeviceErrorKind::Other
    }
}

fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_permission_denied() {
        assert_eq!(
            classify_text("ERROR: Failed to read directory: PERM_DENIED (10)"),
            DeviceErrorKind::PermissionDenied
        );
        assert_eq!(
            classify_text("Permission denied"),
            DeviceErrorKind::PermissionDenied
        );
    }

    #[test]
    fn test_classify_not_found() {
        assert_eq!(
            classify_text("ERROR: OBJECT_NOT_FOUND"),
            DeviceErrorKind::NotFound
        );
        assert_eq!(
            classify_text("No such file or directory"),
            DeviceErrorKind::NotFound
        );
    }

    #[test]
    fn test_classify_afcclient_wording() {
        let err = classify_failure(
            "afcclient",
            "Error: Failed to list '/private': Object not found (8)",
            "",
        );
        assert_eq!(err.device_kind(), DeviceErrorKind::NotFound);
        assert_eq!(
            classify_text("Error: Failed to list '/private': Permission denied (10)"),
            DeviceErrorKind::PermissionDenied
        );
        assert_eq!(
            classify_text("ERROR: Operation not permitted"),
            DeviceErrorKind::PermissionDenied
        );
    }

    #[test]
    fn test_classify_not_connected() {
        assert_eq!(
            classify_text("ERROR: No device found!"),
            DeviceErrorKind::NotConnected
        );
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(classify_text("something odd"), DeviceErrorKind::Other);
    }

    #[test]
    fn test_classify_failure_uses_first_stderr_line() {
        let err = classify_failure("afcclient", "\nERROR: PERM_DENIED\nmore\n", "");
        assert!(err.is_permission_denied());
        assert_eq!(err.to_string(), "permission denied: ERROR: PERM_DENIED");
    }

    #[test]
    fn test_classify_failure_empty_output() {
        let err = classify_failure("idevicediagnostics", "", "");
        assert_eq!(err.to_string(), "device error: idevicediagnostics failed");
    }

    #[test]
    fn test_program_uses_bin_dir() {
        let runner = ToolRunner::new(Some(PathBuf::from("/opt/imd/bin")));
        assert_eq!(
            runner.program("afcclient"),
            PathBuf::from("/opt/imd/bin/afcclient")
        );
        assert_eq!(
            ToolRunner::default().program("afcclient"),
            PathBuf::from("afcclient")
        );
    }

    #[test]
    fn test_with_timeout_overrides_default() {
        assert_eq!(ToolRunner::default().timeout, TOOL_TIMEOUT);
        let runner = ToolRunner::default().with_timeout(Duration::from_secs(5));
        assert_eq!(runner.timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_run_missing_tool_is_tool_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ToolRunner::new(Some(dir.path().to_path_buf()));
        let err = runner
            .run("idevice_id", ["-l"])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }
}
