//! Persistent cache of folder catalog snapshots.
//!
//! Crawling a share is slow, so the result of the last complete crawl is kept
//! around and served until it is explicitly invalidated. The cache is never
//! the source of truth: deleting it only means the next request crawls again.
//!
//! # Architecture
//! - **Snapshots** are keyed by the query they answer ([`SnapshotKey`]: the
//!   base path and the crawl depth), and hold folders in crawl order.
//! - **Stores** ([`SnapshotStore`]) persist snapshots either as JSON
//!   documents in a directory ([`JsonFileStore`]) or in a SQLite database
//!   ([`SqliteStore`]).

mod db;
pub mod error;
mod models;
pub mod store;

pub use crate::db::Database;
pub use crate::models::{CatalogSnapshot, FolderDescriptor, SnapshotKey};
#[cfg(any(test, feature = "mock"))]
pub use crate::store::MemoryStore;
pub use crate::store::{JsonFileStore, SnapshotStore, SqliteStore};
use std::sync::Arc;

pub type StoreHandle = Arc<dyn SnapshotStore + Send + Sync>;
