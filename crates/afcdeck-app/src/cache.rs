//! Last-fetched directory listing and application list.
//!
//! Both caches live in the device session and let tab switches reuse data
//! instead of asking the device again.

use afcdeck_core::{AppRecord, DirectoryListing};

/// Listing of the directory currently shown in the file browser
#[derive(Debug, Clone, Default)]
pub struct DirectoryCache {
    listing: Option<DirectoryListing>,
    stale: bool,
}

impl DirectoryCache {
    pub fn new(listing: DirectoryListing) -> Self {
        Self {
            listing: Some(listing),
            stale: false,
        }
    }

    /// Replace the cached listing wholesale
    pub fn store(&mut self, listing: DirectoryListing) {
        self.listing = Some(listing);
        self.stale = false;
    }

    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Whether the cached listing can be shown without refetching
    pub fn is_fresh(&self) -> bool {
        self.listing.is_some() && !self.stale
    }

    pub fn listing(&self) -> Option<&DirectoryListing> {
        self.listing.as_ref()
    }

    /// Path of the cached listing, `/` when nothing has been loaded
    pub fn path(&self) -> &str {
        self.listing.as_ref().map(|l| l.path.as_str()).unwrap_or("/")
    }
}

/// Installed applications, invalidated by install and uninstall
#[derive(Debug, Clone, Default)]
pub struct AppCache {
    apps: Option<Vec<AppRecord>>,
    error: Option<String>,
}

impl AppCache {
    pub fn new(apps: Vec<AppRecord>, error: Option<String>) -> Self {
        let mut cache = Self::default();
        cache.store(apps, error);
        cache
    }

    /// Store a fetch result. A failed fetch is not cached as valid.
    pub fn store(&mut self, mut apps: Vec<AppRecord>, error: Option<String>) {
        AppRecord::sort(&mut apps);
        self.apps = if error.is_some() { None } else { Some(apps) };
        self.error = error;
    }

    pub fn invalidate(&mut self) {
        self.apps = None;
        self.error = None;
    }

    pub fn is_valid(&self) -> bool {
        self.apps.is_some()
    }

    pub fn apps(&self) -> &[AppRecord] {
        self.apps.as_deref().unwrap_or(&[])
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
