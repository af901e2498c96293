//! Error types for the [`catalog`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A catalog error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies why a crawl could not produce a catalog.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The share could not be reached, or the session was lost part way
    /// through. No partial catalog is returned.
    #[display("share is unreachable")]
    Connectivity,
    /// The base folder of the crawl could not be listed.
    #[display("could not list {}", _0.display())]
    Listing(#[error(not(source))] PathBuf),
    /// The crawl found more folders than it is allowed to catalog.
    #[display("more than {_0} folders found")]
    FolderLimit(#[error(not(source))] usize),
    /// Removing snapshots from the cache failed.
    #[display("catalog cache is unavailable")]
    Cache,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connectivity | Self::Cache)
    }
}
