//! Folder catalog.
//!
//! Builds the flat, pre-order list of folders below a base path on the share,
//! each with the number of images it directly contains. Crawling a share is
//! slow, so complete crawls are stored as snapshots and served from the cache
//! until they are explicitly invalidated.
//!
//! The primary entry point is [`Catalog::list_folders`].

mod crawl;
pub mod error;

use crate::catalog::crawl::Crawler;
use crate::catalog::error::{ErrorKind, Result};
use exn::ResultExt;
use gallery_cache::{CatalogSnapshot, FolderDescriptor, SnapshotKey, StoreHandle};
use gallery_share::ShareHandle;
use serde::Serialize;
use std::path::PathBuf;
use tracing::instrument;

/// Default upper bound on the number of folders a single crawl may produce.
pub const DEFAULT_MAX_FOLDERS: usize = 10_000;
/// Default number of sibling folders listed at the same time.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Settings for crawling the share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Folder on the share that catalog paths are relative to.
    pub base_folder: PathBuf,
    /// A crawl that finds more folders than this fails instead.
    pub max_folders: usize,
    /// Number of sibling folders listed at the same time.
    pub concurrency: usize,
}
impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            base_folder: PathBuf::new(),
            max_folders: DEFAULT_MAX_FOLDERS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Where the folders of a [`FolderListing`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingSource {
    /// Served from a stored snapshot; the share was not contacted.
    Cached,
    /// Crawled from the share and stored as a snapshot.
    Crawled,
    /// Crawled from the share, but some subfolders could not be listed and
    /// are missing. Not stored.
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderListing {
    pub folders: Vec<FolderDescriptor>,
    pub source: ListingSource,
}

/// Catalog of the folders on a share, backed by a snapshot cache.
///
/// # Examples
///
/// ```no_run
/// use gallery_cache::JsonFileStore;
/// use gallery_catalog::catalog::{Catalog, CrawlOptions};
/// use gallery_share::MountedShare;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let share = Arc::new(MountedShare::new("nas", "/mnt/nas")?);
/// let store = Arc::new(JsonFileStore::new("/var/cache/nas-gallery"));
/// let catalog = Catalog::new(share, store, CrawlOptions { base_folder: "PHOTO".into(), ..Default::default() });
/// for folder in catalog.list_folders("", 0).await?.folders {
///     println!("{} ({} images)", folder.path, folder.image_count);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Catalog {
    share: ShareHandle,
    store: StoreHandle,
    options: CrawlOptions,
}

impl Catalog {
    pub fn new(share: ShareHandle, store: StoreHandle, options: CrawlOptions) -> Self {
        Self { share, store, options }
    }

    /// List the folders below `base_path` (relative to the base folder; empty
    /// for the base folder itself), descending `max_depth` levels past its
    /// immediate subfolders.
    ///
    /// A stored snapshot for the same base path and depth is returned without
    /// contacting the share. Otherwise the share is crawled over a single
    /// session, and a complete crawl is stored for next time.
    ///
    /// # Notes
    /// - The cache never fails a call: an unreadable snapshot counts as a
    ///   miss, and a failed write is only logged.
    /// - A subfolder that can't be listed is left out (with its subfolders)
    ///   and the listing is marked [`Degraded`](ListingSource::Degraded)
    ///   instead of being stored.
    #[instrument(skip(self), fields(share = %self.share.name()))]
    pub async fn list_folders(&self, base_path: &str, max_depth: u32) -> Result<FolderListing> {
        let key = SnapshotKey::new(base_path, max_depth);
        match self.store.get(&key).await {
            Ok(Some(snapshot)) => {
                tracing::debug!(folders = snapshot.folders.len(), "Serving folders from cache");
                return Ok(FolderListing { folders: snapshot.folders, source: ListingSource::Cached });
            },
            Ok(None) => {},
            Err(e) => tracing::warn!(store = %self.store.name(), error = ?e, "Could not read catalog cache; crawling"),
        }
        self.crawl(key).await
    }

    /// Drop any stored snapshot for this query and crawl the share again.
    #[instrument(skip(self), fields(share = %self.share.name()))]
    pub async fn refresh_folders(&self, base_path: &str, max_depth: u32) -> Result<FolderListing> {
        let key = SnapshotKey::new(base_path, max_depth);
        if let Err(e) = self.store.invalidate(&key).await {
            tracing::warn!(store = %self.store.name(), error = ?e, "Could not invalidate cached snapshot");
        }
        self.crawl(key).await
    }

    /// Remove the stored snapshot for one query. Returns whether there was one.
    pub async fn invalidate(&self, base_path: &str, max_depth: u32) -> Result<bool> {
        let key = SnapshotKey::new(base_path, max_depth);
        self.store.invalidate(&key).await.or_raise(|| ErrorKind::Cache)
    }

    /// Remove every stored snapshot. Returns how many were removed.
    pub async fn clear(&self) -> Result<u64> {
        self.store.clear().await.or_raise(|| ErrorKind::Cache)
    }

    async fn crawl(&self, key: SnapshotKey) -> Result<FolderListing> {
        if key.base_path.split('/').any(|segment| segment == "..") {
            exn::bail!(ErrorKind::Listing(self.options.base_folder.join(&key.base_path)));
        }
        let session = self.share.connect().await.or_raise(|| ErrorKind::Connectivity)?;
        let crawler = Crawler {
            session: session.as_ref(),
            root: &self.options.base_folder,
            max_depth: key.max_depth,
            options: &self.options,
        };
        let result = crawler.run(&key.base_path).await;
        session.close().await;
        let result = result?;

        if result.degraded {
            tracing::warn!(folders = result.folders.len(), "Crawl was incomplete; not caching it");
            return Ok(FolderListing { folders: result.folders, source: ListingSource::Degraded });
        }
        tracing::info!(folders = result.folders.len(), "Crawled share");
        let snapshot = CatalogSnapshot::new(key, result.folders);
        if let Err(e) = self.store.put(&snapshot).await {
            tracing::warn!(store = %self.store.name(), error = ?e, "Could not write catalog cache");
        }
        Ok(FolderListing { folders: snapshot.folders, source: ListingSource::Crawled })
    }
}
