//! Bounding-size thumbnails.

use crate::error::TransformError;
use crate::image::encode;
use cloudlens_core::constants::{MAX_THUMBNAIL_SIZE, MIN_THUMBNAIL_SIZE};
use image::{GenericImageView, ImageFormat};

pub struct Thumbnail;

impl Thumbnail {
    /// Produce a thumbnail whose longer edge is at most `requested_size`.
    ///
    /// The size is clamped to the accepted range before use; out-of-range
    /// requests are not an error. Aspect ratio is preserved and images
    /// already within bounds are never upscaled. Output keeps the source's
    /// encoded format when it is recognizable, defaulting to JPEG.
    pub fn create(data: &[u8], requested_size: u32) -> Result<Vec<u8>, TransformError> {
        let size = requested_size.clamp(MIN_THUMBNAIL_SIZE, MAX_THUMBNAIL_SIZE);
        let format = encode::detect_format(data).unwrap_or(ImageFormat::Jpeg);

        let img = encode::decode(data)?;
        let (orig_width, orig_height) = img.dimensions();

        let resized = if orig_width <= size && orig_height <= size {
            img
        } else {
            let scale = (size as f32 / orig_width as f32).min(size as f32 / orig_height as f32);
            let new_width = ((orig_width as f32 * scale).round() as u32).max(1);
            let new_height = ((orig_height as f32 * scale).round() as u32).max(1);
            let filter = Self::select_filter(orig_width, orig_height, new_width, new_height);
            img.resize(size, size, filter)
        };

        tracing::debug!(
            requested_size = requested_size,
            effective_size = size,
            width = resized.width(),
            height = resized.height(),
            "Thumbnail created"
        );

        encode::encode(&resized, format)
    }

    /// Select filter type based on resize ratio. Heavier downscales use
    /// cheaper filters whose box-averaging behavior suits large ratios.
    fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> image::imageops::FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            image::imageops::FilterType::Triangle
        } else if max_ratio > 1.5 {
            image::imageops::FilterType::CatmullRom
        } else {
            image::imageops::FilterType::Lanczos3
        }
    }
}
