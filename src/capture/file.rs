// src/capture/file.rs
use anyhow::{Context, Result};
use image::ImageOutputFormat;
use log::info;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use super::source::{ImagePayload, ImageSource};

const JPEG_QUALITY: u8 = 90;

/// Decode a user-selected raster image and normalize it to a base64 JPEG
/// payload, whatever format it was saved in.
pub fn load_image(path: &Path) -> Result<ImagePayload> {
    let image = image::open(path)
        .with_context(|| format!("failed to read image file: {}", path.display()))?;

    info!(
        "Loaded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );

    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    image.write_to(&mut cursor, ImageOutputFormat::Jpeg(JPEG_QUALITY))?;

    ImagePayload::from_jpeg_bytes(&buffer)
}

/// File-picker backed source: re-reads its path on every acquire so the
/// user can overwrite the file between scans.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ImageSource for FileSource {
    fn acquire(&mut self) -> Result<ImagePayload> {
        load_image(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose, Engine as _};

    #[test]
    fn encodes_png_file_as_jpeg_payload() {
        let dir = std::env::temp_dir().join("ecoscan_file_source_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dot.png");

        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([10, 200, 60]));
        img.save(&path).unwrap();

        let payload = load_image(&path).unwrap();
        assert_eq!(payload.mime_type, "image/jpeg");

        // JPEG magic bytes survive the round trip
        let bytes = general_purpose::STANDARD.decode(&payload.data).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut source = FileSource::new(PathBuf::from("/nonexistent/waste.jpg"));
        assert!(source.acquire().is_err());
    }
}
