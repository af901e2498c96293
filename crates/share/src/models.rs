//! Share models.

/// One entry of a folder listing, as reported by the share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareEntry {
    /// Name of the entry inside its folder (no path separators).
    pub name: String,
    /// Whether the entry is a folder.
    pub is_directory: bool,
}
impl ShareEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_directory: false }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_directory: true }
    }
}
