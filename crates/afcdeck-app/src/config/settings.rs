//! Settings parser for config.toml

use super::types::Settings;
use afcdeck_core::prelude::*;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.toml";
const APP_DIR: &str = "afcdeck";

/// Default config file location: `<config_dir>/afcdeck/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}

/// Load settings, falling back to defaults.
///
/// A missing file is not an error. A file that cannot be read or parsed is
/// logged and replaced by defaults.
pub fn load_settings(config_path: Option<&Path>) -> Settings {
    let Some(config_path) = config_path
        .map(Path::to_path_buf)
        .or_else(default_config_path)
    else {
        debug!("No config directory available, using defaults");
        return Settings::default();
    };

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match load_settings_from(&config_path) {
        Ok(settings) => {
            debug!("Loaded settings from {:?}", config_path);
            settings
        }
        Err(e) => {
            warn!("{}", e);
            Settings::default()
        }
    }
}

/// Strictly load settings from a file
pub fn load_settings_from(config_path: &Path) -> Result<Settings> {
    if !config_path.exists() {
        return Err(Error::ConfigNotFound {
            path: config_path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(config_path)
        .map_err(|e| Error::config(format!("Failed to read {:?}: {}", config_path, e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {:?}: {}", config_path, e)))
}

/// Write a commented default config file if none exists
pub fn init_config_file(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        return Ok(());
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::config(format!("Failed to create {:?}: {}", parent, e)))?;
    }

    let default_content = r#"# afcdeck configuration

[watcher]
poll_interval_ms = 2000        # How often to look for an attached device
retry_after_failure = false    # Keep looking after a failed handshake

[connect]
stabilize_ms = 1000            # Pause after opening a session
root_probe_path = "/private"   # Listing this succeeds only with root file access
non_root_base_path = "/var/mobile/Media"
# developer_image = "/path/to/DeveloperDiskImage.dmg"
# developer_image_signature = "/path/to/DeveloperDiskImage.dmg.signature"

[transfer]
# download_dir = "~/Downloads"
# screenshot_dir = "~/Pictures"

[ui]
log_buffer_size = 10000        # Syslog lines kept in the log view

[tools]
# bin_dir = "/opt/libimobiledevice/bin"
timeout_secs = 120             # Longest a single tool call may run
"#;

    std::fs::write(config_path, default_content)
        .map_err(|e| Error::config(format!("Failed to write {:?}: {}", config_path, e)))?;

    info!("Created default config at {:?}", config_path);
    Ok(())
}
