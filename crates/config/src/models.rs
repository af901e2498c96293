//! Configuration sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// How to reach the share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Name of the share, used in logs.
    pub name: String,
    /// Mount point of the share on this machine. Must be absolute.
    pub root: PathBuf,
    /// Folder on the share that every catalog path is relative to.
    pub base_folder: String,
    /// Seconds a single remote operation may take before the share is
    /// considered unreachable.
    pub timeout: u64,
}
impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            name: "nas".to_string(),
            root: PathBuf::from("/mnt/nas"),
            base_folder: "PHOTO".to_string(),
            timeout: 30,
        }
    }
}
impl ShareConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// One JSON document per snapshot in a directory.
    #[default]
    Json,
    /// A SQLite database file.
    Sqlite,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Directory (JSON) or database file (SQLite). Defaults to a location in
    /// the platform cache directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Local directory images are copied into.
    pub dir: PathBuf,
}
impl Default for StagingConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("static/images") }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Levels to descend past the immediate subfolders of the base path.
    pub max_depth: u32,
    /// A crawl that finds more folders than this fails.
    pub max_folders: usize,
    /// Sibling folders listed at the same time.
    pub concurrency: usize,
}
impl Default for CrawlConfig {
    fn default() -> Self {
        Self { max_depth: 0, max_folders: 10_000, concurrency: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieveConfig {
    /// Files staged at the same time.
    pub concurrency: usize,
}
impl Default for RetrieveConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}
