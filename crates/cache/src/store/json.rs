//! JSON file snapshot store.
//!
//! Every snapshot is one JSON document in the cache directory, named after the
//! digest of its key. Writes go to a temporary file in the same directory that
//! is then renamed over the target, so readers only ever see complete
//! documents.

use crate::error::{ErrorKind, Result};
use crate::models::{CatalogSnapshot, SnapshotKey};
use crate::store::SnapshotStore;
use async_trait::async_trait;
use exn::ResultExt;
use std::io::{BufWriter, ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use tokio::fs;

const FILE_PREFIX: &str = "snapshot-";
const FILE_EXTENSION: &str = "json";

/// Snapshot store backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}
impl JsonFileStore {
    /// Create a store in the given directory. The directory is created on the
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, key: &SnapshotKey) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{}.{FILE_EXTENSION}", key.digest()))
    }

    fn is_snapshot_file(path: &Path) -> bool {
        path.extension().is_some_and(|extension| extension == FILE_EXTENSION)
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(FILE_PREFIX))
    }

    fn write_atomically(dir: &Path, target: &Path, snapshot: &CatalogSnapshot) -> Result<()> {
        std::fs::create_dir_all(dir).or_raise(|| ErrorKind::Io)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).or_raise(|| ErrorKind::Io)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, snapshot).or_raise(|| ErrorKind::InvalidData("snapshot"))?;
            writer.flush().or_raise(|| ErrorKind::Io)?;
        }
        tmp.as_file().sync_all().or_raise(|| ErrorKind::Io)?;
        tmp.persist(target).or_raise(|| ErrorKind::Io)?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn get(&self, key: &SnapshotKey) -> Result<Option<CatalogSnapshot>> {
        let path = self.file_path(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).or_raise(|| ErrorKind::Io),
        };
        let snapshot: CatalogSnapshot =
            serde_json::from_slice(&bytes).or_raise(|| ErrorKind::InvalidData("snapshot"))?;
        if snapshot.key != *key {
            tracing::warn!(path = %path.display(), "Snapshot file holds a different key; ignoring it");
            return Ok(None);
        }
        Ok(Some(snapshot))
    }

    async fn put(&self, snapshot: &CatalogSnapshot) -> Result<()> {
        let dir = self.dir.clone();
        let target = self.file_path(&snapshot.key);
        let snapshot = snapshot.clone();
        tokio::task::spawn_blocking(move || Self::write_atomically(&dir, &target, &snapshot))
            .await
            .or_raise(|| ErrorKind::Io)?
    }

    async fn invalidate(&self, key: &SnapshotKey) -> Result<bool> {
        match fs::remove_file(self.file_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).or_raise(|| ErrorKind::Io),
        }
    }

    async fn clear(&self) -> Result<u64> {
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e).or_raise(|| ErrorKind::Io),
        };
        let mut removed = 0;
        while let Some(entry) = dir.next_entry().await.or_raise(|| ErrorKind::Io)? {
            let path = entry.path();
            if !Self::is_snapshot_file(&path) {
                continue;
            }
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == IoErrorKind::NotFound => {},
                Err(e) => return Err(e).or_raise(|| ErrorKind::Io),
            }
        }
        Ok(removed)
    }
}
