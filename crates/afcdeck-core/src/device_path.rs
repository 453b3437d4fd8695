//! Forward-slash path helpers for paths on the device.
//!
//! Device paths are always absolute and `/`-separated regardless of the host
//! platform, so `std::path` is deliberately not used here.

/// Join a directory and an entry name.
pub fn join(dir: &str, name: &str) -> String {
    let name = name.trim_start_matches('/');
    if dir.is_empty() || dir == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), name)
    }
}

/// Parent directory of a device path. The parent of `/` is `/`.
pub fn parent(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => trimmed[..idx].to_string(),
    }
}

/// Normalize user input into an absolute device path.
///
/// Backslashes become forward slashes, repeated separators collapse, `.`
/// segments are dropped and `..` pops a segment (never above `/`).
pub fn normalize(input: &str) -> String {
    let replaced = input.trim().replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in replaced.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Last segment of a device path.
pub fn file_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_root() {
        assert_eq!(join("/", "DCIM"), "/DCIM");
        assert_eq!(join("", "DCIM"), "/DCIM");
    }

    #[test]
    fn test_join_nested() {
        assert_eq!(join("/var/mobile/Media", "DCIM"), "/var/mobile/Media/DCIM");
        assert_eq!(join("/var/mobile/Media/", "/DCIM"), "/var/mobile/Media/DCIM");
    }

    #[test]
    fn test_parent() {
        assert_eq!(parent("/var/mobile/Media"), "/var/mobile");
        assert_eq!(parent("/var"), "/");
        assert_eq!(parent("/"), "/");
        assert_eq!(parent("/DCIM/"), "/");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("var//mobile/./Media/"), "/var/mobile/Media");
        assert_eq!(normalize("\\DCIM\\100APPLE"), "/DCIM/100APPLE");
        assert_eq!(normalize("/a/b/../c"), "/a/c");
        assert_eq!(normalize("/../.."), "/");
        assert_eq!(normalize(""), "/");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("/DCIM/IMG_0001.JPG"), "IMG_0001.JPG");
        assert_eq!(file_name("/DCIM/"), "DCIM");
    }
}
