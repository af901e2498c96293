//! Wiring the configuration into a catalog and a retriever.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use gallery_cache::{Database, JsonFileStore, SqliteStore, StoreHandle};
use gallery_catalog::{Catalog, CrawlOptions, RetrieveOptions, Retriever, Staging};
use gallery_config::{CacheBackend, Config};
use gallery_share::{MountedShare, ShareHandle, TimeoutShare};
use std::path::PathBuf;
use std::sync::Arc;

pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The mounted share, with every operation bounded by the configured
    /// timeout.
    pub fn share(&self) -> Result<ShareHandle> {
        let share = &self.config.share;
        let mounted = MountedShare::new(&share.name, &share.root).or_raise(|| ErrorKind::Share)?;
        Ok(Arc::new(TimeoutShare::new(Arc::new(mounted), share.timeout())))
    }

    pub async fn store(&self) -> Result<StoreHandle> {
        let path = self.config.cache_path().or_raise(|| ErrorKind::Config)?;
        tracing::debug!(backend = ?self.config.cache.backend, path = %path.display(), "Opening snapshot cache");
        Ok(match self.config.cache.backend {
            CacheBackend::Json => Arc::new(JsonFileStore::new(path)),
            CacheBackend::Sqlite => {
                let db = Database::connect(&path).await.or_raise(|| ErrorKind::Cache)?;
                Arc::new(SqliteStore::from(&db))
            },
        })
    }

    pub async fn catalog(&self) -> Result<Catalog> {
        let options = CrawlOptions {
            base_folder: self.base_folder(),
            max_folders: self.config.crawl.max_folders,
            concurrency: self.config.crawl.concurrency,
        };
        Ok(Catalog::new(self.share()?, self.store().await?, options))
    }

    pub fn retriever(&self) -> Result<Retriever> {
        let options = RetrieveOptions { base_folder: self.base_folder(), concurrency: self.config.retrieve.concurrency };
        Ok(Retriever::new(self.share()?, Staging::new(&self.config.staging.dir), options))
    }

    fn base_folder(&self) -> PathBuf {
        PathBuf::from(&self.config.share.base_folder)
    }
}
