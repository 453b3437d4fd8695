//! Parsers for libimobiledevice tool output

use std::sync::LazyLock;

use afcdeck_core::{AppRecord, BatteryInfo, InstallType, PropertyMap};
use regex::Regex;

use crate::transport::FileInfo;

/// `com.example.app, "1.2.3", "Example"` rows from `ideviceinstaller list`
static APP_ROW_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*([^,\s"]+)\s*,\s*"([^"]*)"\s*,\s*"([^"]*)"\s*$"#)
        .expect("app row regex is valid")
});

/// Older `com.example.app - Example 1.2.3` rows
static LEGACY_APP_ROW_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z0-9][\w.\-]*)\s+-\s+(.*?)\s+(\S+)\s*$")
        .expect("legacy app row regex is valid")
});

/// Device identifiers from `idevice_id -l`, one per line
pub fn parse_device_ids(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| l.split_whitespace().next().unwrap_or(l).to_string())
        .collect()
}

/// Top-level `Key: Value` lines from `ideviceinfo`.
///
/// Indented lines belong to nested dictionaries and are skipped, as are
/// keys without a scalar value.
pub fn parse_properties(output: &str) -> PropertyMap {
    let mut map = PropertyMap::new();
    for line in output.lines() {
        if line.starts_with(char::is_whitespace) {
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            let value = value.trim();
            if !key.is_empty() && !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Application rows from `ideviceinstaller list`
pub fn parse_app_list(output: &str, install_type: InstallType) -> Vec<AppRecord> {
    output
        .lines()
        .filter(|l| !l.trim_start().starts_with("CFBundleIdentifier"))
        .filter_map(|line| {
            if let Some(caps) = APP_ROW_REGEX.captures(line) {
                Some(AppRecord::new(
                    &caps[1],
                    Some(caps[3].to_string()),
                    Some(caps[2].to_string()),
                    install_type.clone(),
                ))
            } else {
                LEGACY_APP_ROW_REGEX.captures(line).map(|caps| {
                    AppRecord::new(
                        &caps[1],
                        Some(caps[2].to_string()),
                        Some(caps[3].to_string()),
                        install_type.clone(),
                    )
                })
            }
        })
        .collect()
}

/// Entry names from `afcclient ls`, without `.` and `..`
pub fn parse_dir_entries(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|l| l.trim_end_matches(['\r', '\n']))
        .map(str::trim)
        .filter(|l| !l.is_empty() && *l != "." && *l != "..")
        .map(|l| l.trim_end_matches('/').to_string())
        .collect()
}

/// Path metadata from `afcclient info`.
///
/// Accepts both the raw `st_ifmt`/`st_size` keys and the labelled
/// `Type`/`Size` form. Returns `None` when no type is present.
pub fn parse_file_info(output: &str) -> Option<FileInfo> {
    let props = parse_properties(output);

    let is_dir = match props.get("st_ifmt").or_else(|| props.get("Type")) {
        Some(kind) => {
            let kind = kind.to_lowercase();
            kind.contains("s_ifdir") || kind.contains("directory")
        }
        None => return None,
    };

    let size = props
        .get("st_size")
        .or_else(|| props.get("Size"))
        .and_then(|s| s.split_whitespace().next())
        .and_then(|s| s.parse().ok());

    Some(FileInfo { is_dir, size })
}

/// Battery state from the `com.apple.mobile.battery` domain
pub fn parse_battery(props: &PropertyMap) -> BatteryInfo {
    let level = props
        .get("BatteryCurrentCapacity")
        .and_then(|v| v.parse().ok());

    let flag = |key: &str| props.get(key).map(|v| v == "true" || v == "1");

    let status = if let Some(status) = props.get("BatteryChargeStatus") {
        Some(status.clone())
    } else if flag("FullyCharged") == Some(true) {
        Some("Fully Charged".to_string())
    } else {
        flag("BatteryIsCharging").map(|charging| {
            if charging {
                "Charging".to_string()
            } else {
                "Not Charging".to_string()
            }
        })
    };

    BatteryInfo { level, status }
}
