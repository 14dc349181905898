//! Accepting user-supplied image files.

use std::path::Path;

use image::{DynamicImage, ImageFormat};

use crate::error::ImageError;

/// File extensions offered by the upload widgets.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Whether `path` carries one of [`SUPPORTED_EXTENSIONS`] (case-insensitive).
pub fn is_supported_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

/// Decode raw image bytes.
///
/// The format is detected from the magic bytes, not from any file name, and
/// only JPEG and PNG are accepted.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::Empty);
    }

    let format = image::guess_format(bytes).map_err(|_| ImageError::UnsupportedFormat)?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        return Err(ImageError::UnsupportedFormat);
    }

    Ok(image::load_from_memory_with_format(bytes, format)?)
}

/// Read and decode the image at `path`.
pub fn open_image(path: &Path) -> Result<DynamicImage, ImageError> {
    if !is_supported_path(path) {
        return Err(ImageError::UnsupportedExtension(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| ImageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_image(&bytes)
}
