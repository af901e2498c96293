//! Error types for the [`retrieve`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A retrieval error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a retrieval failure.
///
/// ### Fatal (the whole folder fails)
/// - [`ErrorKind::Connectivity`]
/// - [`ErrorKind::Listing`]
///
/// ### Per file (the file is skipped, the folder continues)
/// - [`ErrorKind::Retrieval`]
/// - [`ErrorKind::InvalidFilename`]
/// - [`ErrorKind::Staging`] - unless the staging directory itself can't be
///   created, which fails the whole folder.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The share could not be reached, or the session was lost.
    #[display("share is unreachable")]
    Connectivity,
    /// The folder could not be listed.
    #[display("could not list {}", _0.display())]
    Listing(#[error(not(source))] PathBuf),
    /// Writing to the local staging directory failed.
    #[display("could not write to staging directory")]
    Staging,
    /// The contents of a remote file could not be read.
    #[display("could not read `{_0}` from share")]
    Retrieval(#[error(not(source))] String),
    /// A listed file name is not safe to use as a local file name.
    #[display("refusing to stage file named `{_0}`")]
    InvalidFilename(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connectivity | Self::Retrieval(_))
    }
}
