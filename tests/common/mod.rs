//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::Path;

/// Encode a small gradient as JPEG bytes.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
    });
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img).write_to(&mut buf, image::ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

/// Write a JPEG fixture named `name` into `dir`.
pub fn write_jpeg(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), jpeg_bytes(64, 48)).unwrap();
}
