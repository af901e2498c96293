//! Share client traits and implementations.
//!
//! A [`ShareClient`] knows *where* a share lives and how to open a session to
//! it. A [`ShareSession`] is one open connection: folders are listed and files
//! are streamed through it, and it is closed again when the caller is done.
//! Callers open one session per top-level operation; nothing here pools
//! connections.

#[cfg(any(test, feature = "mock"))]
mod mock;
mod mounted;
mod timeout;

#[cfg(any(test, feature = "mock"))]
pub use self::mock::{Fault, MockShare, MockStats};
pub use self::mounted::MountedShare;
pub use self::timeout::TimeoutShare;
use crate::error::Result;
use crate::models::ShareEntry;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::path::Path;
use std::pin::Pin;

/// Chunked contents of a remote file.
pub type ByteStream<'a> = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send + 'a>>;
/// An open session, as handed out by [`ShareClient::connect`].
pub type SessionHandle = Box<dyn ShareSession>;

/// Access to one remote share.
///
/// # Examples
///
/// ```no_run
/// use gallery_share::{ShareClient, error::Result};
/// use std::path::Path;
///
/// async fn count_entries(client: &dyn ShareClient) -> Result<usize> {
///     let session = client.connect().await?;
///     let listing = session.list(Path::new("PHOTO")).await;
///     session.close().await;
///     Ok(listing?.len())
/// }
/// ```
#[async_trait]
pub trait ShareClient: Send + Sync {
    /// Name of the configured share (used for logging only).
    fn name(&self) -> &str;

    /// Open a new session to the share.
    ///
    /// Returns [`Connect`](crate::error::ErrorKind::Connect) when the share
    /// cannot be reached.
    async fn connect(&self) -> Result<SessionHandle>;
}

/// One open connection to a share.
///
/// All paths are relative to the share root and are validated with
/// [`normalize_path`](crate::normalize_path) (folders) or
/// [`validate_path`](crate::validate_path) (files) by implementations.
#[async_trait]
pub trait ShareSession: Send + Sync {
    /// List the immediate entries of a folder, in the order the share reports
    /// them. The empty path lists the share root.
    ///
    /// # Notes
    /// - Returns [`NotFound`](crate::error::ErrorKind::NotFound) for a
    ///   missing folder and [`NotADirectory`](crate::error::ErrorKind::NotADirectory)
    ///   when the path names a file.
    async fn list(&self, path: &Path) -> Result<Vec<ShareEntry>>;

    /// Open a file for streaming reads.
    ///
    /// The setup (opening the remote file) happens before returning; the
    /// returned stream yields the contents in chunks and borrows the session.
    async fn open<'a>(&'a self, path: &'a Path) -> Result<ByteStream<'a>>;

    /// Read a whole file into memory.
    ///
    /// Default implementation of this method is to collect all the chunks
    /// from [`open()`](Self::open) into a single [`Vec`] before returning.
    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let chunks: Vec<Vec<u8>> = self.open(path).await?.try_collect().await?;
        Ok(chunks.concat())
    }

    /// Close the session. Operations after closing fail with
    /// [`Disconnected`](crate::error::ErrorKind::Disconnected).
    ///
    /// Closing is best-effort and never fails; implementations must also
    /// release their resources when dropped without being closed.
    async fn close(&self);
}
