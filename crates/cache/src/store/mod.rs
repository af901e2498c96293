//! Snapshot stores.
//!
//! A [`SnapshotStore`] keeps the result of the last complete crawl for each
//! [`SnapshotKey`]. Snapshots never expire on their own; they are replaced by
//! the next successful crawl for the same key, or removed on request.

mod json;
#[cfg(any(test, feature = "mock"))]
mod memory;
mod sqlite;

pub use self::json::JsonFileStore;
#[cfg(any(test, feature = "mock"))]
pub use self::memory::MemoryStore;
pub use self::sqlite::SqliteStore;
use crate::error::Result;
use crate::models::{CatalogSnapshot, SnapshotKey};
use async_trait::async_trait;

/// Durable storage for catalog snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Name of the store (used for logging only).
    fn name(&self) -> &str;

    /// Fetch the snapshot stored under `key`, if any.
    async fn get(&self, key: &SnapshotKey) -> Result<Option<CatalogSnapshot>>;

    /// Store a snapshot under its own key, replacing any previous snapshot for
    /// that key. Either the whole snapshot is stored or nothing is.
    async fn put(&self, snapshot: &CatalogSnapshot) -> Result<()>;

    /// Remove the snapshot stored under `key`. Returns whether there was one.
    async fn invalidate(&self, key: &SnapshotKey) -> Result<bool>;

    /// Remove every snapshot. Returns how many were removed.
    async fn clear(&self) -> Result<u64>;
}
