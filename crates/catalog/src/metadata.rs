//! Capture time extraction from embedded image metadata.

use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read the `DateTimeOriginal` tag of a local image file.
///
/// Returns the raw tag text (e.g. `"2023:01:02 03:04:05"`) or `None` when the
/// file can't be read, isn't an image with embedded EXIF data (JPEG, PNG,
/// TIFF, HEIF, WebP), or doesn't carry the tag. Failures are only logged at
/// `debug` level.
///
/// This performs blocking I/O; call it from a blocking task.
pub fn extract_capture_time(path: &Path) -> Option<String> {
    match read_capture_time(path) {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            tracing::debug!(path = %path.display(), "Image has no capture time");
            None
        },
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Could not read image metadata");
            None
        },
    }
}

fn read_capture_time(path: &Path) -> Result<Option<String>, exif::Error> {
    let mut reader = BufReader::new(File::open(path)?);
    let exif = Reader::new().read_from_container(&mut reader)?;
    // Fields of the Exif sub-IFD are reported as part of the primary image.
    let Some(field) = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY) else {
        return Ok(None);
    };
    let Value::Ascii(ref values) = field.value else {
        return Ok(None);
    };
    let text = values
        .first()
        .and_then(|value| std::str::from_utf8(value).ok())
        .map(|value| value.trim_matches(|c: char| c == '\0' || c.is_whitespace()))
        .filter(|value| !value.is_empty())
        .map(str::to_string);
    Ok(text)
}
