//! Tool availability checking for device management
//!
//! Reports which of the libimobiledevice command-line tools afcdeck drives
//! can be found, either in the configured tools directory or on `PATH`.

use std::path::PathBuf;

/// Tools used by the backend, with the feature each one enables
pub const REQUIRED_TOOLS: &[(&str, &str)] = &[
    ("idevice_id", "device detection"),
    ("ideviceinfo", "device properties and battery"),
    ("afcclient", "file browsing and transfer"),
    ("ideviceinstaller", "application management"),
    ("ideviceimagemounter", "developer image mount"),
    ("idevicescreenshot", "screenshots"),
    ("idevicediagnostics", "reboot and shutdown"),
    ("ideviceenterrecovery", "recovery mode"),
    ("idevicesyslog", "syslog stream"),
];

/// Location of one tool, if found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub name: &'static str,
    pub purpose: &'static str,
    pub path: Option<PathBuf>,
}

impl ToolStatus {
    pub fn is_available(&self) -> bool {
        self.path.is_some()
    }
}

/// Availability of every tool the backend needs
#[derive(Debug, Clone, Default)]
pub struct ToolAvailability {
    pub tools: Vec<ToolStatus>,
}

impl ToolAvailability {
    /// Check tool availability (run once at startup)
    pub fn check(bin_dir: Option<&std::path::Path>) -> Self {
        let tools = REQUIRED_TOOLS
            .iter()
            .map(|&(name, purpose)| ToolStatus {
                name,
                purpose,
                path: locate(name, bin_dir),
            })
            .collect();
        Self { tools }
    }

    /// Whether device detection can work at all
    pub fn can_detect(&self) -> bool {
        self.is_available("idevice_id")
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.tools
            .iter()
            .any(|t| t.name == name && t.is_available())
    }

    pub fn missing(&self) -> Vec<&ToolStatus> {
        self.tools.iter().filter(|t| !t.is_available()).collect()
    }

    /// Get user-friendly message when tools are missing
    pub fn unavailable_message(&self) -> Option<String> {
        let missing = self.missing();
        if missing.is_empty() {
            None
        } else {
            let names: Vec<&str> = missing.iter().map(|t| t.name).collect();
            Some(format!(
                "Missing libimobiledevice tools: {}. Install them or set [tools] bin_dir.",
                names.join(", ")
            ))
        }
    }
}

fn locate(name: &str, bin_dir: Option<&std::path::Path>) -> Option<PathBuf> {
    let found = match bin_dir {
        Some(dir) => which::which_in(name, Some(dir), dir),
        None => which::which(name),
    };
    found
        .inspect_err(|e| tracing::debug!("{} not found: {}", name, e))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_availability_default() {
        let availability = ToolAvailability::default();
        assert!(!availability.can_detect());
        assert!(availability.unavailable_message().is_none());
    }

    #[test]
    fn test_empty_bin_dir_reports_all_missing() {
        let dir = tempfile::tempdir().unwrap();
        let availability = ToolAvailability::check(Some(dir.path()));
        assert_eq!(availability.tools.len(), REQUIRED_TOOLS.len());
        assert_eq!(availability.missing().len(), REQUIRED_TOOLS.len());
        let msg = availability.unavailable_message().unwrap();
        assert!(msg.contains("idevice_id"));
        assert!(msg.contains("afcclient"));
    }

    #[cfg(unix)]
    #[test]
    fn test_executable_in_bin_dir_is_found() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("idevice_id");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let availability = ToolAvailability::check(Some(dir.path()));
        assert!(availability.can_detect());
        assert!(!availability.is_available("afcclient"));
    }
}
