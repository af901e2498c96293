//! Mounted share backend.
//!
//! The share is reachable as a directory on this machine (a CIFS/SMB or NFS
//! mount, or simply a local folder). Folders are read with `tokio::fs`, so the
//! operating system's share client does the network work.

use crate::backend::{ByteStream, SessionHandle, ShareClient, ShareSession};
use crate::error::{ErrorKind, Result};
use crate::models::ShareEntry;
use crate::path::{normalize as normalize_path, validate as validate_path};
use async_stream::stream;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tokio::io::AsyncReadExt;

/// Size of the chunks yielded by [`ShareSession::open`].
const CHUNK_SIZE: usize = 64 * 1024;

/// Share mounted into the local filesystem.
///
/// # Examples
///
/// ```no_run
/// use gallery_share::MountedShare;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let share = MountedShare::new("nas", "/mnt/nas")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MountedShare {
    name: String,
    /// Mount point of the share.
    root: PathBuf,
}
impl MountedShare {
    /// Create a new mounted share.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute. Whether the mount point
    /// actually exists is only checked on [`connect`](ShareClient::connect),
    /// since a share can be mounted after the application has started.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        Ok(Self { name: name.into(), root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ShareClient for MountedShare {
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self) -> Result<SessionHandle> {
        match fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => {},
            Ok(_) => exn::bail!(ErrorKind::Connect(format!("`{}` is not a directory", self.root.display()))),
            Err(e) => exn::bail!(ErrorKind::Connect(format!("`{}` is not reachable: {e}", self.root.display()))),
        }
        tracing::debug!(share = %self.name, root = %self.root.display(), "Opened session to mounted share");
        Ok(Box::new(MountedSession {
            root: self.root.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

struct MountedSession {
    root: PathBuf,
    closed: AtomicBool,
}
impl MountedSession {
    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            exn::bail!(ErrorKind::Disconnected);
        }
        Ok(())
    }

    /// A missing path is only a missing path while the mount point is still
    /// there. Once the mount itself has gone away the session is dead.
    async fn map_io_error(&self, e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => match fs::try_exists(&self.root).await {
                Ok(true) => ErrorKind::NotFound(path.to_path_buf()),
                _ => ErrorKind::Disconnected,
            },
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            std::io::ErrorKind::NotADirectory => ErrorKind::NotADirectory(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }
}

#[async_trait]
impl ShareSession for MountedSession {
    async fn list(&self, path: &Path) -> Result<Vec<ShareEntry>> {
        self.ensure_open()?;
        let relative = normalize_path(path)?;
        let absolute = self.root.join(&relative);
        let mut dir = match fs::read_dir(&absolute).await {
            Ok(dir) => dir,
            Err(e) => exn::bail!(self.map_io_error(e, &relative).await),
        };
        let mut entries = Vec::new();
        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => exn::bail!(self.map_io_error(e, &relative).await),
            };
            let Ok(name) = entry.file_name().into_string() else {
                tracing::debug!(path = %entry.path().display(), "Skipping entry with non UTF-8 name");
                continue;
            };
            // Follow symlinks, the same way the share's own client would.
            let Ok(metadata) = fs::metadata(entry.path()).await else {
                tracing::debug!(path = %entry.path().display(), "Skipping broken symlink");
                continue;
            };
            entries.push(ShareEntry { name, is_directory: metadata.is_dir() });
        }
        // Directory iteration order is whatever the filesystem feels like.
        // Sort so that listings (and therefore catalogs) are deterministic.
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn open<'a>(&'a self, path: &'a Path) -> Result<ByteStream<'a>> {
        self.ensure_open()?;
        let relative = validate_path(path)?;
        let absolute = self.root.join(&relative);
        let mut file = match fs::File::open(&absolute).await {
            Ok(file) => file,
            Err(e) => exn::bail!(self.map_io_error(e, &relative).await),
        };
        let metadata = file.metadata().await.map_err(ErrorKind::Io)?;
        if metadata.is_dir() {
            exn::bail!(ErrorKind::InvalidPath(relative));
        }
        Ok(Box::pin(stream! {
            loop {
                let mut buffer = vec![0; CHUNK_SIZE];
                match file.read(&mut buffer).await {
                    Ok(0) => break,
                    Ok(read) => {
                        buffer.truncate(read);
                        yield Ok(buffer);
                    },
                    Err(e) => {
                        yield Err(exn::Exn::from(ErrorKind::Io(e)));
                        break;
                    },
                }
            }
        }))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
