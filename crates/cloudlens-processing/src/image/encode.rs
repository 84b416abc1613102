//! Decode/encode helpers shared by the transforms.

use crate::error::TransformError;
use cloudlens_core::constants::JPEG_QUALITY;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// Decode image bytes, guessing the format from content.
pub fn decode(data: &[u8]) -> Result<DynamicImage, TransformError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| TransformError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| TransformError::Decode(e.to_string()))
}

/// Detect the encoded format of image bytes, if recognizable.
pub fn detect_format(data: &[u8]) -> Option<ImageFormat> {
    image::guess_format(data).ok()
}

/// Encode an image in the given format.
///
/// JPEG output is flattened to RGB (no alpha channel exists in JPEG) and
/// written at the fixed high quality setting. WebP and GIF are normalized to
/// RGBA before encoding; PNG keeps the image's own color type.
pub fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, TransformError> {
    let mut buffer = Vec::new();

    match format {
        ImageFormat::Jpeg => {
            let rgb = img.to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
            rgb.write_with_encoder(encoder)
                .map_err(|e| TransformError::Encode(e.to_string()))?;
        }
        ImageFormat::Png => {
            img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
                .map_err(|e| TransformError::Encode(e.to_string()))?;
        }
        ImageFormat::WebP | ImageFormat::Gif => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_to(&mut Cursor::new(&mut buffer), format)
                .map_err(|e| TransformError::Encode(e.to_string()))?;
        }
        other => {
            img.write_to(&mut Cursor::new(&mut buffer), other)
                .map_err(|e| TransformError::Encode(e.to_string()))?;
        }
    }

    Ok(buffer)
}
