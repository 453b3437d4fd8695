//! Directory listing fetch shared by the connector and the file browser

use afcdeck_core::prelude::*;
use afcdeck_core::{join, DirectoryListing};
use afcdeck_device::Transport;

/// List `path` on the device and split the entries into folders and files.
///
/// Each child is stat'ed. When stat fails the child is treated as a folder
/// only if it can itself be listed.
pub async fn fetch_listing<T: Transport + Sync>(
    transport: &T,
    path: &str,
) -> Result<DirectoryListing> {
    let names = transport.list_dir(path).await?;

    let mut folders = Vec::new();
    let mut files = Vec::new();
    for name in names {
        if name.is_empty() || name == "." || name == ".." {
            continue;
        }
        let child = join(path, &name);
        let is_dir = match transport.stat(&child).await {
            Ok(info) => info.is_dir,
            Err(e) => {
                trace!("stat {} failed ({}), probing with a listing", child, e);
                transport.list_dir(&child).await.is_ok()
            }
        };
        if is_dir {
            folders.push(name);
        } else {
            files.push(name);
        }
    }

    Ok(DirectoryListing::new(path, folders, files))
}
