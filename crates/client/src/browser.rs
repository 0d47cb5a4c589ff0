//! Remote directory navigation.
//!
//! [`DirectoryBrowser`] keeps the currently browsed path and turns
//! navigation actions into browse requests. A failed request never
//! moves the browser; the error is kept as the listing so the operator
//! can retry or go elsewhere.

use std::sync::Arc;

use seqconv_core::browse::{BrowseEntry, BrowsePath};

use crate::api::ConverterBackend;

/// What the listing area currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    NotLoaded,
    Entries(Vec<BrowseEntry>),
    Failed(String),
}

pub struct DirectoryBrowser {
    backend: Arc<dyn ConverterBackend>,
    current: BrowsePath,
    listing: Listing,
}

impl DirectoryBrowser {
    pub fn new(backend: Arc<dyn ConverterBackend>) -> Self {
        Self {
            backend,
            current: BrowsePath::parse("."),
            listing: Listing::NotLoaded,
        }
    }

    pub fn current_path(&self) -> &BrowsePath {
        &self.current
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    /// Start browsing at `start_path`, else `last_known`, else `"."`.
    pub async fn open(&mut self, start_path: &str, last_known: &str) {
        let start = [start_path, last_known]
            .into_iter()
            .map(str::trim)
            .find(|p| !p.is_empty())
            .unwrap_or(".");
        self.current = BrowsePath::parse(start);
        self.refresh().await;
    }

    /// Re-list the current path and adopt the server's canonical form.
    pub async fn refresh(&mut self) {
        self.navigate(self.current.to_string()).await;
    }

    /// Descend into `entry`, requesting its path as listed. Files are
    /// ignored.
    pub async fn enter(&mut self, entry: &BrowseEntry) {
        if !entry.is_directory {
            return;
        }
        self.navigate(entry.path.clone()).await;
    }

    /// Go to the parent directory; from a single segment that is the
    /// root. At the root this does nothing and issues no request.
    pub async fn up(&mut self) {
        let Some(parent) = self.current.parent() else {
            return;
        };
        self.navigate(parent.to_string()).await;
    }

    /// The chosen directory.
    pub fn select(&self) -> String {
        self.current.to_string()
    }

    /// List `requested`; only a successful listing moves the browser.
    async fn navigate(&mut self, requested: String) {
        match self.backend.browse(&requested).await {
            Ok(result) => {
                tracing::debug!(
                    requested = %requested,
                    current_path = %result.current_path,
                    entries = result.entries.len(),
                    "Directory listed",
                );
                self.current = BrowsePath::parse(&result.current_path);
                self.listing = Listing::Entries(result.entries);
            }
            Err(e) => {
                tracing::warn!(path = %requested, error = %e, "Browse failed");
                self.listing = Listing::Failed(e.to_string());
            }
        }
    }
}
