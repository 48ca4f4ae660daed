//! Image I/O operations service
//!
//! This module separates file I/O operations from the removal logic. Inputs
//! may be any supported raster format; outputs are always PNG so the alpha
//! channel survives.

use crate::error::{BgRemovalError, Result};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// Input extensions accepted by the single-file and batch entry points,
/// compared case-insensitively
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "webp", "gif"];

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image from a file path
    ///
    /// # Errors
    /// - `InputNotFound` when the path does not exist
    /// - `UnsupportedFormat` when the extension is outside the supported set
    ///   or the contents cannot be decoded
    ///
    /// # Examples
    /// ```rust,no_run
    /// use bgremove_chain::services::ImageIOService;
    ///
    /// let image = ImageIOService::load_image("input.jpg")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(BgRemovalError::input_not_found(path_ref));
        }
        if !Self::is_supported_extension(path_ref) {
            return Err(BgRemovalError::unsupported_format(format!(
                "'{}' does not have a supported extension ({})",
                path_ref.display(),
                SUPPORTED_EXTENSIONS.join(", ")
            )));
        }

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(e) => {
                // Extensions lie; fall back to content sniffing before giving up
                log::debug!(
                    "Extension-based loading failed for {}: {}. Attempting content-based detection.",
                    path_ref.display(),
                    e
                );
                let data = std::fs::read(path_ref)?;
                image::load_from_memory(&data)
                    .map_err(|_| BgRemovalError::decode_error(path_ref, &e))
            },
        }
    }

    /// Decode an image from encoded bytes of any supported format
    pub fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes).map_err(|e| {
            BgRemovalError::unsupported_format(format!("Failed to decode image from bytes: {e}"))
        })
    }

    /// Encode an RGBA image as PNG bytes
    pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
        Ok(buffer)
    }

    /// Save an RGBA image as PNG, creating parent directories as needed
    ///
    /// # Errors
    /// `WriteFailure` when the directory or the file cannot be written.
    pub fn save_png<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| BgRemovalError::write_failure(parent, e))?;
        }

        let bytes = Self::encode_png(image)?;
        std::fs::write(path_ref, bytes).map_err(|e| BgRemovalError::write_failure(path_ref, e))?;
        log::debug!("Saved PNG to {}", path_ref.display());
        Ok(())
    }

    /// Whether the path's extension is in [`SUPPORTED_EXTENSIONS`]
    pub fn is_supported_extension<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|supported| ext.eq_ignore_ascii_case(supported))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    #[test]
    fn test_is_supported_extension() {
        for name in ["a.png", "a.jpg", "a.JPEG", "a.bmp", "a.WebP", "a.gif"] {
            assert!(ImageIOService::is_supported_extension(name), "{name}");
        }
        for name in ["a.txt", "a.tiff", "a", "png", ".png.bak"] {
            assert!(!ImageIOService::is_supported_extension(name), "{name}");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let err = ImageIOService::load_image("nonexistent.jpg").unwrap_err();
        assert!(matches!(err, BgRemovalError::InputNotFound(_)));
    }

    #[test]
    fn test_load_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let err = ImageIOService::load_image(&path).unwrap_err();
        assert!(matches!(err, BgRemovalError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_load_corrupt_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = ImageIOService::load_image(&path).unwrap_err();
        assert!(matches!(err, BgRemovalError::UnsupportedFormat(_)));
        assert!(err.to_string().contains("broken.png"));
    }

    #[test]
    fn test_save_and_reload_preserves_alpha() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out.png");
        let mut image = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        image.put_pixel(0, 0, Rgba([10, 20, 30, 0]));

        ImageIOService::save_png(&image, &path).unwrap();
        let loaded = ImageIOService::load_image(&path).unwrap().to_rgba8();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_decode_bytes_rejects_garbage() {
        let err = ImageIOService::decode_bytes(b"garbage").unwrap_err();
        assert!(matches!(err, BgRemovalError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_save_into_file_parent_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let image = RgbaImage::new(1, 1);
        let err = ImageIOService::save_png(&image, blocker.join("out.png")).unwrap_err();
        assert!(matches!(err, BgRemovalError::WriteFailure { .. }));
    }
}
