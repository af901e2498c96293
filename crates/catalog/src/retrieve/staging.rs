//! Local staging directory.

use crate::retrieve::error::{ErrorKind, Result};
use exn::ResultExt;
use futures::StreamExt;
use gallery_share::{ByteStream, is_plain_name};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// The single local directory that images are staged into, named exactly by
/// their remote file name.
///
/// Files are first written to a hidden `.<name>.part` sibling and renamed into
/// place once complete, so a failed transfer never leaves a truncated file
/// under the final name. Same-named files from different folders overwrite each
/// other, and nothing is ever cleaned up.
#[derive(Debug, Clone)]
pub struct Staging {
    dir: PathBuf,
}

impl Staging {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the staging directory if it doesn't exist yet.
    pub async fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await.or_raise(|| ErrorKind::Staging)
    }

    /// Local path a file with this remote name is staged at.
    pub fn path_for(&self, filename: &str) -> Result<PathBuf> {
        if !is_plain_name(filename) {
            exn::bail!(ErrorKind::InvalidFilename(filename.to_string()));
        }
        Ok(self.dir.join(filename))
    }

    /// Stream a remote file into the staging directory. Returns the local path.
    pub async fn stage(&self, filename: &str, chunks: ByteStream<'_>) -> Result<PathBuf> {
        let target = self.path_for(filename)?;
        let part = self.dir.join(format!(".{filename}.part"));
        if let Err(e) = Self::write(filename, &part, chunks).await {
            if let Err(cleanup) = fs::remove_file(&part).await {
                tracing::debug!(path = %part.display(), error = %cleanup, "Could not remove partial file");
            }
            return Err(e);
        }
        fs::rename(&part, &target).await.or_raise(|| ErrorKind::Staging)?;
        Ok(target)
    }

    async fn write(filename: &str, part: &Path, mut chunks: ByteStream<'_>) -> Result<()> {
        let mut file = fs::File::create(part).await.or_raise(|| ErrorKind::Staging)?;
        while let Some(chunk) = chunks.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) if e.is_connectivity() => return Err(e.raise(ErrorKind::Connectivity)),
                Err(e) => return Err(e.raise(ErrorKind::Retrieval(filename.to_string()))),
            };
            file.write_all(&chunk).await.or_raise(|| ErrorKind::Staging)?;
        }
        file.flush().await.or_raise(|| ErrorKind::Staging)?;
        Ok(())
    }
}
