//! Fixtures shared by the conversion tests.

use image::{ImageBuffer, Luma, Rgba};
use std::fs;
use std::path::Path;

/// Write an 8x8 single-channel 16-bit TIFF filled with `value`
pub fn write_gray16_tiff(path: &Path, value: u16) {
    let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_pixel(8, 8, Luma([value]));
    img.save(path).unwrap();
}

/// Write an 8x8 RGBA 16-bit TIFF filled with `value` in every channel
pub fn write_rgba16_tiff(path: &Path, value: u16) {
    let img: ImageBuffer<Rgba<u16>, Vec<u16>> =
        ImageBuffer::from_pixel(8, 8, Rgba([value, value, value, value]));
    img.save(path).unwrap();
}

/// Count files in `dir` with the given extension; 0 when `dir` does not exist
pub fn count_with_extension(dir: &Path, extension: &str) -> usize {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|ext| ext.to_str()) == Some(extension))
            .count(),
        Err(_) => 0,
    }
}
