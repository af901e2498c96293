#![allow(dead_code)]

use gallery_share::MockShare;
use std::sync::Arc;

/// Smallest JPEG carrying a `DateTimeOriginal` tag: an APP1 segment with a
/// big-endian TIFF structure whose IFD0 points at an Exif IFD holding the tag.
pub fn jpeg_with_capture_time(capture_time: &str) -> Vec<u8> {
    assert_eq!(capture_time.len(), 19);
    let mut tiff = b"MM\x00\x2a\x00\x00\x00\x08".to_vec();
    tiff.extend_from_slice(&[0x00, 0x01, 0x87, 0x69, 0x00, 0x04, 0x00, 0x00, 0x00, 0x01]);
    tiff.extend_from_slice(&26u32.to_be_bytes());
    tiff.extend_from_slice(&0u32.to_be_bytes());
    tiff.extend_from_slice(&[0x00, 0x01, 0x90, 0x03, 0x00, 0x02, 0x00, 0x00, 0x00, 0x14]);
    tiff.extend_from_slice(&44u32.to_be_bytes());
    tiff.extend_from_slice(&0u32.to_be_bytes());
    tiff.extend_from_slice(capture_time.as_bytes());
    tiff.push(0);

    let mut jpeg = vec![0xff, 0xd8, 0xff, 0xe1];
    jpeg.extend_from_slice(&u16::try_from(8 + tiff.len()).unwrap().to_be_bytes());
    jpeg.extend_from_slice(b"Exif\x00\x00");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xff, 0xd9]);
    jpeg
}

/// `PHOTO/{2023/{a.jpg, b.png, .trash/x.jpg}, notes.txt}`
pub fn scenario() -> Arc<MockShare> {
    Arc::new(MockShare::with_files([
        ("PHOTO/2023/a.jpg", b"a".to_vec()),
        ("PHOTO/2023/b.png", b"b".to_vec()),
        ("PHOTO/2023/.trash/x.jpg", b"x".to_vec()),
        ("PHOTO/notes.txt", b"n".to_vec()),
    ]))
}

/// A deeper tree, four levels below the base folder, with hidden folders at
/// several levels and listings deliberately out of alphabetical order.
pub fn deep_tree() -> MockShare {
    MockShare::with_files([
        ("PHOTO/2024/spring/a.jpg", b"a".to_vec()),
        ("PHOTO/2024/spring/day1/b.JPG", b"b".to_vec()),
        ("PHOTO/2024/spring/day1/raw/c.jpeg", b"c".to_vec()),
        ("PHOTO/2024/.thumbs/d.jpg", b"d".to_vec()),
        ("PHOTO/2024/.thumbs/nested/e.jpg", b"e".to_vec()),
        ("PHOTO/2023/f.png", b"f".to_vec()),
        ("PHOTO/2023/g.txt", b"g".to_vec()),
        ("PHOTO/2023/._f.png", b"h".to_vec()),
        ("PHOTO/2023/winter/i.jpg", b"i".to_vec()),
        ("PHOTO/.Trash/j.jpg", b"j".to_vec()),
    ])
}
