//! Image retrieval.
//!
//! Copies the images of one folder from the share into the local
//! [`Staging`] directory and reads the capture time of each staged copy.
//!
//! A file that fails to stage is logged and skipped; the rest of the folder
//! continues. Only losing the share, or failing to list the folder at all,
//! fails the whole retrieval.

pub mod error;
mod staging;

pub use self::staging::Staging;
use crate::filter::is_image_name;
use crate::metadata::extract_capture_time;
use crate::retrieve::error::{ErrorKind, Result};
use exn::ResultExt;
use futures::{StreamExt, TryStreamExt, stream};
use gallery_share::{ShareHandle, ShareSession};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Default number of files staged at the same time.
pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveOptions {
    /// Folder on the share that folder paths are relative to.
    pub base_folder: PathBuf,
    /// Number of files staged at the same time.
    pub concurrency: usize,
}
impl Default for RetrieveOptions {
    fn default() -> Self {
        Self { base_folder: PathBuf::new(), concurrency: DEFAULT_CONCURRENCY }
    }
}

/// One staged image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRecord {
    pub filename: String,
    /// Raw `DateTimeOriginal` text, e.g. `"2023:01:02 03:04:05"`.
    pub shooting_date: Option<String>,
}

/// Outcome of retrieving a folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Retrieval {
    /// Staged images, in the order the share listed them.
    pub images: Vec<ImageRecord>,
    /// Names of the images that could not be staged.
    pub skipped: Vec<String>,
}

pub struct Retriever {
    share: ShareHandle,
    staging: Staging,
    options: RetrieveOptions,
}

impl Retriever {
    pub fn new(share: ShareHandle, staging: Staging, options: RetrieveOptions) -> Self {
        Self { share, staging, options }
    }

    pub fn staging(&self) -> &Staging {
        &self.staging
    }

    /// Stage every image directly inside `folder_path` (relative to the base
    /// folder) and read its capture time.
    ///
    /// Files may be staged concurrently, but the returned records are always
    /// in listing order.
    #[instrument(skip(self), fields(share = %self.share.name()))]
    pub async fn fetch_folder_images(&self, folder_path: &str) -> Result<Retrieval> {
        let remote = self.remote_path(folder_path);
        if folder_path.split('/').any(|segment| segment == "..") {
            exn::bail!(ErrorKind::Listing(remote));
        }
        self.staging.prepare().await?;
        let session = self.share.connect().await.or_raise(|| ErrorKind::Connectivity)?;
        let result = self.fetch(session.as_ref(), &remote).await;
        session.close().await;
        let retrieval = result?;
        tracing::info!(images = retrieval.images.len(), skipped = retrieval.skipped.len(), "Retrieved folder");
        Ok(retrieval)
    }

    fn remote_path(&self, folder_path: &str) -> PathBuf {
        let folder_path = folder_path.trim_matches('/');
        if folder_path.is_empty() { self.options.base_folder.clone() } else { self.options.base_folder.join(folder_path) }
    }

    async fn fetch(&self, session: &dyn ShareSession, remote: &Path) -> Result<Retrieval> {
        let entries = match session.list(remote).await {
            Ok(entries) => entries,
            Err(e) if e.is_connectivity() => return Err(e.raise(ErrorKind::Connectivity)),
            Err(e) => return Err(e.raise(ErrorKind::Listing(remote.to_path_buf()))),
        };
        let names = entries.into_iter().filter(|entry| !entry.is_directory && is_image_name(&entry.name)).map(|entry| entry.name);

        let outcomes: Vec<(String, Result<ImageRecord>)> = stream::iter(names)
            .map(|name| async move {
                match self.retrieve_one(session, remote, &name).await {
                    Err(e) if matches!(*e, ErrorKind::Connectivity) => Err(e),
                    outcome => Ok((name, outcome)),
                }
            })
            .buffered(self.options.concurrency.max(1))
            .try_collect()
            .await?;

        let mut retrieval = Retrieval::default();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(record) => retrieval.images.push(record),
                Err(e) => {
                    tracing::warn!(file = %name, error = ?e, "Could not stage image; skipping it");
                    retrieval.skipped.push(name);
                },
            }
        }
        Ok(retrieval)
    }

    async fn retrieve_one(&self, session: &dyn ShareSession, folder: &Path, name: &str) -> Result<ImageRecord> {
        // Checked before anything is read from the share.
        self.staging.path_for(name)?;
        let remote = folder.join(name);
        let chunks = match session.open(&remote).await {
            Ok(chunks) => chunks,
            Err(e) if e.is_connectivity() => return Err(e.raise(ErrorKind::Connectivity)),
            Err(e) => return Err(e.raise(ErrorKind::Retrieval(name.to_string()))),
        };
        let local = self.staging.stage(name, chunks).await?;
        let shooting_date = match tokio::task::spawn_blocking(move || extract_capture_time(&local)).await {
            Ok(shooting_date) => shooting_date,
            Err(e) => {
                tracing::debug!(file = %name, error = %e, "Metadata extraction task failed");
                None
            },
        };
        Ok(ImageRecord { filename: name.to_string(), shooting_date })
    }
}
