//! Snapshot models.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One folder found by a crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderDescriptor {
    /// Path relative to the base folder of the share, `/`-joined.
    pub path: String,
    /// Number of image files directly inside the folder.
    pub image_count: u64,
}
impl FolderDescriptor {
    pub fn new(path: impl Into<String>, image_count: u64) -> Self {
        Self { path: path.into(), image_count }
    }
}

/// The query a snapshot answers.
///
/// Base paths are normalized on construction, so `"/2023/"`, `"2023"` and
/// `"./2023"` all refer to the same snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotKey {
    pub base_path: String,
    pub max_depth: u32,
}
impl SnapshotKey {
    pub fn new(base_path: impl AsRef<str>, max_depth: u32) -> Self {
        let base_path = base_path
            .as_ref()
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect::<Vec<_>>()
            .join("/");
        Self { base_path, max_depth }
    }

    /// Stable hex digest identifying this key, safe for use in file names.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.base_path.as_bytes());
        hasher.update(&[0]);
        hasher.update(&self.max_depth.to_le_bytes());
        hasher.finalize().to_hex().to_string()
    }
}

/// The ordered result of one complete crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub key: SnapshotKey,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub folders: Vec<FolderDescriptor>,
}
impl CatalogSnapshot {
    /// Create a snapshot of a crawl that has just finished.
    pub fn new(key: SnapshotKey, folders: Vec<FolderDescriptor>) -> Self {
        Self { key, created_at: OffsetDateTime::now_utc(), folders }
    }
}
