//! Path validation and security utilities.
//!
//! Share paths are always relative to the share root. These functions make
//! sure a path can never escape that root, whatever the caller passes in.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Normalizes a share path, allowing the empty path (the share root).
///
/// Leading slashes, `.` components and repeated separators are dropped, and
/// `..` is resolved as long as it never leaves the root.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use gallery_share::normalize_path;
/// assert_eq!(normalize_path("/PHOTO//2023/").unwrap(), Path::new("PHOTO/2023"));
/// assert_eq!(normalize_path("").unwrap(), Path::new(""));
/// assert!(normalize_path("../etc").is_err());
/// ```
pub fn normalize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(s) => {
                // Path::components() lets NUL through; the OS would truncate at it.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
            },
        }
    }
    Ok(components.into_iter().collect())
}

/// Validates a share path that must name something below the root.
///
/// Same as [`normalize`] but the root itself (an empty path after
/// normalization) is rejected.
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let normalized = normalize(path.as_ref())?;
    if normalized.as_os_str().is_empty() {
        exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
    }
    Ok(normalized)
}

/// Checks that a name reported by a listing is a single, plain path component
/// that is safe to join onto a local directory.
///
/// # Examples
///
/// ```
/// use gallery_share::is_plain_name;
/// assert!(is_plain_name("IMG_0001.JPG"));
/// assert!(!is_plain_name("../IMG_0001.JPG"));
/// assert!(!is_plain_name("a/b.jpg"));
/// ```
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
        && matches!(Path::new(name).components().next(), Some(Component::Normal(_)))
}
