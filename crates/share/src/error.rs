//! Share Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;
use std::time::Duration;

/// A share error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for share operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Could not establish a session with the share (unreachable server,
    /// unmounted share, rejected credentials).
    #[display("could not connect to share: {_0}")]
    Connect(#[error(not(source))] String),
    /// The session was lost or closed while in use.
    #[display("share session disconnected")]
    Disconnected,
    /// A remote operation did not complete in time.
    #[display("share operation timed out after {}s", _0.as_secs())]
    Timeout(#[error(not(source))] Duration),
    /// File or folder does not exist
    #[display("not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied (permissions or credentials)
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Listing was requested for something that is not a folder.
    #[display("not a directory: {}", _0.display())]
    NotADirectory(#[error(not(source))] PathBuf),
    /// Path contains invalid characters or escapes the share root
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Disconnected | Self::Timeout(_) | Self::Connect(_))
    }

    /// Returns `true` when the failure concerns the session with the share as
    /// a whole, rather than one particular path on it. Callers abort the
    /// enclosing operation on these.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Disconnected | Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorKind::Connect("refused".to_string()), true)]
    #[case(ErrorKind::Disconnected, true)]
    #[case(ErrorKind::Timeout(Duration::from_secs(3)), true)]
    #[case(ErrorKind::NotFound(PathBuf::from("a")), false)]
    #[case(ErrorKind::PermissionDenied(PathBuf::from("a")), false)]
    #[case(ErrorKind::NotADirectory(PathBuf::from("a")), false)]
    #[case(ErrorKind::InvalidPath(PathBuf::from("..")), false)]
    fn test_is_connectivity(#[case] kind: ErrorKind, #[case] expected: bool) {
        assert_eq!(kind.is_connectivity(), expected);
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorKind::Timeout(Duration::from_secs(30)).to_string(), "share operation timed out after 30s");
        assert_eq!(ErrorKind::NotFound(PathBuf::from("PHOTO/2023")).to_string(), "not found: PHOTO/2023");
    }
}
