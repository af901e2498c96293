//! In-memory snapshot store for testing.

use crate::error::{ErrorKind, Result};
use crate::models::{CatalogSnapshot, SnapshotKey};
use crate::store::SnapshotStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory snapshot store.
///
/// Counts writes and can be told to fail reads or writes, to exercise the
/// paths where the cache is unavailable.
#[derive(Default)]
pub struct MemoryStore {
    snapshots: Mutex<HashMap<SnapshotKey, CatalogSnapshot>>,
    puts: AtomicUsize,
    fail_get: AtomicBool,
    fail_put: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent read fail (or succeed again).
    pub fn set_fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_fail_put(&self, fail: bool) {
        self.fail_put.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Number of snapshots currently stored.
    pub fn len(&self) -> usize {
        self.snapshots.lock().map(|snapshots| snapshots.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<SnapshotKey, CatalogSnapshot>>> {
        self.snapshots.lock().map_err(|_| exn::Exn::from(ErrorKind::Io))
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &SnapshotKey) -> Result<Option<CatalogSnapshot>> {
        if self.fail_get.load(Ordering::SeqCst) {
            exn::bail!(ErrorKind::Io);
        }
        Ok(self.lock()?.get(key).cloned())
    }

    async fn put(&self, snapshot: &CatalogSnapshot) -> Result<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            exn::bail!(ErrorKind::Io);
        }
        self.lock()?.insert(snapshot.key.clone(), snapshot.clone());
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn invalidate(&self, key: &SnapshotKey) -> Result<bool> {
        Ok(self.lock()?.remove(key).is_some())
    }

    async fn clear(&self) -> Result<u64> {
        let mut snapshots = self.lock()?;
        let removed = snapshots.len() as u64;
        snapshots.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FolderDescriptor;

    #[tokio::test]
    async fn test_round_trip_and_counters() {
        let store = MemoryStore::new();
        let snapshot = CatalogSnapshot::new(SnapshotKey::new("", 0), vec![FolderDescriptor::new("a", 1)]);
        store.put(&snapshot).await.unwrap();
        assert_eq!(store.get(&snapshot.key).await.unwrap(), Some(snapshot.clone()));
        assert_eq!(store.puts(), 1);
        assert_eq!(store.clear().await.unwrap(), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = MemoryStore::new();
        let snapshot = CatalogSnapshot::new(SnapshotKey::new("", 0), vec![]);
        store.set_fail_put(true);
        assert!(store.put(&snapshot).await.is_err());
        assert_eq!(store.puts(), 0);
        store.set_fail_put(false);
        store.put(&snapshot).await.unwrap();
        store.set_fail_get(true);
        assert!(store.get(&snapshot.key).await.is_err());
    }
}
