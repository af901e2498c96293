//! Name filters shared by the crawler and the retrieval pipeline.

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Folders whose name starts with a dot are never catalogued.
pub fn is_hidden_folder(name: &str) -> bool {
    name.starts_with('.')
}

/// Whether a file name looks like a displayable image.
///
/// The extension (after the last dot) must be `jpg`, `jpeg` or `png` in any
/// case. macOS resource fork companions (`._IMG_0001.JPG`) and names that are
/// nothing but an extension (`.jpg`) are rejected.
///
/// # Examples
///
/// ```
/// use gallery_catalog::filter::is_image_name;
/// assert!(is_image_name("IMG_0001.JPG"));
/// assert!(!is_image_name("._IMG_0001.JPG"));
/// assert!(!is_image_name("notes.txt"));
/// ```
pub fn is_image_name(name: &str) -> bool {
    if name.starts_with("._") {
        return false;
    }
    match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => {
            IMAGE_EXTENSIONS.iter().any(|known| extension.eq_ignore_ascii_case(known))
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a.jpg", true)]
    #[case("a.JPG", true)]
    #[case("a.JpEg", true)]
    #[case("a.png", true)]
    #[case("archive.tar.png", true)]
    #[case(".hidden.jpg", true)]
    #[case("._a.jpg", false)]
    #[case(".jpg", false)]
    #[case("jpg", false)]
    #[case("a.gif", false)]
    #[case("a.jpg.txt", false)]
    #[case("a.", false)]
    #[case("", false)]
    fn test_is_image_name(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_image_name(name), expected);
    }

    #[rstest]
    #[case(".trash", true)]
    #[case(".", true)]
    #[case("@eaDir", false)]
    #[case("2023", false)]
    fn test_is_hidden_folder(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_hidden_folder(name), expected);
    }
}
