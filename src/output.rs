//! What the commands print on stdout. Logs go to stderr, so JSON output can
//! be piped as is.

use gallery_catalog::{FolderDescriptor, ImageRecord};
use std::io::{self, Write};

pub fn write_folders(out: &mut impl Write, folders: &[FolderDescriptor], json: bool) -> io::Result<()> {
    if json {
        return write_json(out, folders);
    }
    for folder in folders {
        writeln!(out, "{}\t{}", folder.path, folder.image_count)?;
    }
    Ok(())
}

pub fn write_images(out: &mut impl Write, images: &[ImageRecord], json: bool) -> io::Result<()> {
    if json {
        return write_json(out, images);
    }
    for image in images {
        writeln!(out, "{}\t{}", image.filename, image.shooting_date.as_deref().unwrap_or("-"))?;
    }
    Ok(())
}

fn write_json<T: serde::Serialize + ?Sized>(out: &mut impl Write, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(write: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        write(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_folders_as_text() {
        let folders = [FolderDescriptor::new("2023", 2), FolderDescriptor::new("2023/winter", 0)];
        let text = render(|out| write_folders(out, &folders, false));
        assert_eq!(text, "2023\t2\n2023/winter\t0\n");
    }

    #[test]
    fn test_folders_as_json() {
        let folders = [FolderDescriptor::new("2023", 2)];
        let text = render(|out| write_folders(out, &folders, true));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, serde_json::json!([{"path": "2023", "image_count": 2}]));
    }

    #[test]
    fn test_empty_output() {
        assert_eq!(render(|out| write_folders(out, &[], false)), "");
        assert_eq!(render(|out| write_images(out, &[], true)), "[]\n");
    }

    #[test]
    fn test_images() {
        let images = [
            ImageRecord { filename: "a.jpg".to_string(), shooting_date: Some("2023:01:02 03:04:05".to_string()) },
            ImageRecord { filename: "b.png".to_string(), shooting_date: None },
        ];
        assert_eq!(render(|out| write_images(out, &images, false)), "a.jpg\t2023:01:02 03:04:05\nb.png\t-\n");
        let value: serde_json::Value = serde_json::from_str(&render(|out| write_images(out, &images, true))).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"filename": "a.jpg", "shooting_date": "2023:01:02 03:04:05"},
                {"filename": "b.png", "shooting_date": null},
            ])
        );
    }
}
