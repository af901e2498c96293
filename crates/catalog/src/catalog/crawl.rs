use crate::catalog::CrawlOptions;
use crate::catalog::error::{ErrorKind, Result};
use crate::filter::{is_hidden_folder, is_image_name};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt, stream};
use gallery_cache::FolderDescriptor;
use gallery_share::{ShareEntry, ShareSession};
use std::path::{Path, PathBuf};

/// Number of images directly inside a folder, given its listing.
fn count_images(entries: &[ShareEntry]) -> u64 {
    entries.iter().filter(|entry| !entry.is_directory && is_image_name(&entry.name)).count() as u64
}

/// Catalog paths are `/`-joined whatever the platform.
fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() { child.to_string() } else { format!("{parent}/{child}") }
}

#[derive(Debug, Default)]
pub(super) struct CrawlResult {
    pub(super) folders: Vec<FolderDescriptor>,
    /// Some subfolder could not be listed and was left out.
    pub(super) degraded: bool,
}

/// One depth-first walk over an open session.
pub(super) struct Crawler<'a> {
    pub(super) session: &'a dyn ShareSession,
    /// Remote folder that catalog paths are relative to.
    pub(super) root: &'a Path,
    pub(super) max_depth: u32,
    pub(super) options: &'a CrawlOptions,
}

impl Crawler<'_> {
    fn remote_path(&self, path: &str) -> PathBuf {
        if path.is_empty() { self.root.to_path_buf() } else { self.root.join(path) }
    }

    pub(super) async fn run(&self, base_path: &str) -> Result<CrawlResult> {
        let remote = self.remote_path(base_path);
        let entries = match self.session.list(&remote).await {
            Ok(entries) => entries,
            Err(e) if e.is_connectivity() => return Err(e.raise(ErrorKind::Connectivity)),
            Err(e) => return Err(e.raise(ErrorKind::Listing(remote))),
        };
        let mut result = CrawlResult::default();
        self.walk(base_path.to_string(), entries, 0, &mut result).await?;
        Ok(result)
    }

    /// Catalog the subfolders of `parent`, whose listing has already been
    /// fetched, and recurse into them while the depth allows.
    ///
    /// Sibling listings are fetched concurrently but consumed in listing
    /// order, so the output is the same pre-order sequence a sequential walk
    /// produces. Each folder is listed exactly once: the listing that counts
    /// its images is the one its children are discovered from.
    fn walk<'b>(
        &'b self,
        parent: String,
        entries: Vec<ShareEntry>,
        depth: u32,
        result: &'b mut CrawlResult,
    ) -> BoxFuture<'b, Result<()>> {
        async move {
            let children: Vec<String> = entries
                .into_iter()
                .filter(|entry| entry.is_directory && !is_hidden_folder(&entry.name))
                .map(|entry| join(&parent, &entry.name))
                .collect();
            let listings: Vec<_> = stream::iter(children)
                .map(|path| async move {
                    let listing = self.session.list(&self.remote_path(&path)).await;
                    (path, listing)
                })
                .buffered(self.options.concurrency.max(1))
                .collect()
                .await;

            for (path, listing) in listings {
                let entries = match listing {
                    Ok(entries) => entries,
                    Err(e) if e.is_connectivity() => return Err(e.raise(ErrorKind::Connectivity)),
                    Err(e) => {
                        tracing::warn!(folder = %path, error = ?e, "Could not list folder; leaving it out of the catalog");
                        result.degraded = true;
                        continue;
                    },
                };
                if result.folders.len() >= self.options.max_folders {
                    exn::bail!(ErrorKind::FolderLimit(self.options.max_folders));
                }
                result.folders.push(FolderDescriptor::new(path.clone(), count_images(&entries)));
                if depth < self.max_depth {
                    self.walk(path, entries, depth + 1, result).await?;
                }
            }
            Ok(())
        }
        .boxed()
    }
}
