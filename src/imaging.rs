//! JPEG decode, encode, and square-thumbnail resize.
//!
//! Pure pixel work shared by the thumbnail service and the full-image
//! route. The gallery speaks exactly one format: the `image` crate is
//! compiled with only its JPEG codec, so anything else fails decode
//! instead of half-working.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode | `image::load_from_memory_with_format` (JPEG) |
//! | Square thumbnail | `image::DynamicImage::resize_to_fill` (Triangle) |
//! | Encode | `image::codecs::jpeg::JpegEncoder`, quality 90 |

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};
use std::path::Path;
use thiserror::Error;

/// Quality for every JPEG this process emits, thumbnails and full images
/// alike.
const JPEG_QUALITY: u8 = 90;

/// What went wrong while producing pixels or bytes.
///
/// `Io` and `Decode` stay distinct so the HTTP layer can answer "no such
/// image" and "broken image" differently.
#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("JPEG decode failed: {0}")]
    Decode(image::ImageError),
    #[error("JPEG encode failed: {0}")]
    Encode(image::ImageError),
}

/// Decode JPEG bytes into a pixel image.
pub fn decode_jpeg(bytes: &[u8]) -> Result<DynamicImage, ImagingError> {
    image::load_from_memory_with_format(bytes, ImageFormat::Jpeg).map_err(ImagingError::Decode)
}

/// Read and decode the JPEG file at `path`.
pub fn load_jpeg(path: &Path) -> Result<DynamicImage, ImagingError> {
    let bytes = std::fs::read(path)?;
    decode_jpeg(&bytes)
}

/// Encode a pixel image as JPEG bytes ready for an HTTP body.
///
/// The image is flattened to RGB first; the JPEG encoder has no notion
/// of an alpha channel.
pub fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>, ImagingError> {
    let rgb = img.to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(ImagingError::Encode)?;
    Ok(bytes)
}

/// Scale-and-crop `img` to an exact `size`x`size` square.
///
/// The short edge is scaled to `size` and the long edge center-cropped,
/// so thumbnails never letterbox. Triangle filtering is plenty at
/// thumbnail scale and noticeably cheaper than Lanczos on large sources.
pub fn square_thumb(img: &DynamicImage, size: u32) -> DynamicImage {
    img.resize_to_fill(size, size, FilterType::Triangle)
}
