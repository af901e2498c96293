//! SQLite snapshot store.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{CatalogSnapshot, FolderDescriptor, SnapshotKey};
use crate::store::SnapshotStore;
use async_trait::async_trait;
use exn::ResultExt;
use sqlx::SqlitePool;
use time::OffsetDateTime;

#[derive(sqlx::FromRow)]
struct SnapshotRow {
    id: i64,
    base_path: String,
    max_depth: i64,
    created_at: i64,
}

#[derive(sqlx::FromRow)]
struct FolderRow {
    path: String,
    image_count: i64,
}
impl TryFrom<FolderRow> for FolderDescriptor {
    type Error = crate::error::Error;
    fn try_from(row: FolderRow) -> Result<Self> {
        Ok(Self {
            path: row.path,
            image_count: u64::try_from(row.image_count).or_raise(|| ErrorKind::InvalidData("image count"))?,
        })
    }
}

/// Snapshot store backed by the SQLite cache database.
///
/// Creation times are stored as Unix timestamps, so they come back without
/// their sub-second part.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}
impl From<&Database> for SqliteStore {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn bind_depth(key: &SnapshotKey) -> i64 {
        i64::from(key.max_depth)
    }
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, key: &SnapshotKey) -> Result<Option<CatalogSnapshot>> {
        let row: Option<SnapshotRow> = sqlx::query_as(include_str!("../../queries/get_snapshot.sql"))
            .bind(&key.base_path)
            .bind(Self::bind_depth(key))
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let folders: Vec<FolderRow> = sqlx::query_as(include_str!("../../queries/get_snapshot_folders.sql"))
            .bind(row.id)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(Some(CatalogSnapshot {
            key: SnapshotKey {
                base_path: row.base_path,
                max_depth: u32::try_from(row.max_depth).or_raise(|| ErrorKind::InvalidData("max depth"))?,
            },
            created_at: OffsetDateTime::from_unix_timestamp(row.created_at)
                .or_raise(|| ErrorKind::InvalidData("creation date"))?,
            folders: folders.into_iter().map(FolderDescriptor::try_from).collect::<Result<_>>()?,
        }))
    }

    async fn put(&self, snapshot: &CatalogSnapshot) -> Result<()> {
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        sqlx::query(include_str!("../../queries/delete_snapshot.sql"))
            .bind(&snapshot.key.base_path)
            .bind(Self::bind_depth(&snapshot.key))
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let (id,): (i64,) = sqlx::query_as(include_str!("../../queries/insert_snapshot.sql"))
            .bind(&snapshot.key.base_path)
            .bind(Self::bind_depth(&snapshot.key))
            .bind(snapshot.created_at.unix_timestamp())
            .fetch_one(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        for (position, folder) in snapshot.folders.iter().enumerate() {
            sqlx::query(include_str!("../../queries/insert_snapshot_folder.sql"))
                .bind(id)
                .bind(i64::try_from(position).or_raise(|| ErrorKind::InvalidData("folder position"))?)
                .bind(&folder.path)
                .bind(i64::try_from(folder.image_count).or_raise(|| ErrorKind::InvalidData("image count"))?)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    async fn invalidate(&self, key: &SnapshotKey) -> Result<bool> {
        let result = sqlx::query(include_str!("../../queries/delete_snapshot.sql"))
            .bind(&key.base_path)
            .bind(Self::bind_depth(key))
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> Result<u64> {
        let result = sqlx::query(include_str!("../../queries/clear_snapshots.sql"))
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteStore {
        SqliteStore::from(&Database::connect_in_memory().await.unwrap())
    }

    fn snapshot(base_path: &str, max_depth: u32, folders: &[(&str, u64)]) -> CatalogSnapshot {
        let folders = folders.iter().map(|(path, count)| FolderDescriptor::new(*path, *count)).collect();
        CatalogSnapshot::new(SnapshotKey::new(base_path, max_depth), folders)
    }

    #[tokio::test]
    async fn test_put_then_get_preserves_order() {
        let store = store().await;
        // Deliberately not in alphabetical order.
        let snapshot = snapshot("", 1, &[("b", 1), ("b/z", 0), ("b/a", 4), ("a", 2)]);
        store.put(&snapshot).await.unwrap();
        let stored = store.get(&snapshot.key).await.unwrap().unwrap();
        assert_eq!(stored.key, snapshot.key);
        assert_eq!(stored.folders, snapshot.folders);
        // Converting to a Unix timestamp (measured in seconds) inherently strips the nanoseconds component.
        assert_eq!(stored.created_at, snapshot.created_at.replace_nanosecond(0).unwrap());
    }

    #[tokio::test]
    async fn test_get_is_keyed() {
        let store = store().await;
        store.put(&snapshot("", 0, &[("2023", 1)])).await.unwrap();
        assert!(store.get(&SnapshotKey::new("", 1)).await.unwrap().is_none());
        assert!(store.get(&SnapshotKey::new("2023", 0)).await.unwrap().is_none());
        assert!(store.get(&SnapshotKey::new("/", 0)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_put_replaces_previous_snapshot() {
        let store = store().await;
        store.put(&snapshot("", 0, &[("2023", 1), ("2024", 2)])).await.unwrap();
        store.put(&snapshot("", 0, &[("2025", 3)])).await.unwrap();
        let stored = store.get(&SnapshotKey::new("", 0)).await.unwrap().unwrap();
        assert_eq!(stored.folders, vec![FolderDescriptor::new("2025", 3)]);
    }

    #[tokio::test]
    async fn test_empty_snapshot_is_a_hit() {
        let store = store().await;
        store.put(&snapshot("", 0, &[])).await.unwrap();
        let stored = store.get(&SnapshotKey::new("", 0)).await.unwrap().unwrap();
        assert!(stored.folders.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let store = store().await;
        store.put(&snapshot("", 0, &[("a", 1)])).await.unwrap();
        store.put(&snapshot("", 1, &[("a", 1)])).await.unwrap();
        store.put(&snapshot("a", 0, &[])).await.unwrap();
        assert!(store.invalidate(&SnapshotKey::new("", 0)).await.unwrap());
        assert!(!store.invalidate(&SnapshotKey::new("", 0)).await.unwrap());
        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(store.get(&SnapshotKey::new("", 1)).await.unwrap().is_none());
        let (orphans,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM snapshot_folders").fetch_one(&store.pool).await.unwrap();
        assert_eq!(orphans, 0);
    }
}
