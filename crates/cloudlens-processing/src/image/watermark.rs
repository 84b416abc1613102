//! Diagonal text watermarks.

use crate::error::TransformError;
use crate::image::encode;
use crate::text;
use cloudlens_core::constants::DEFAULT_WATERMARK_TEXT;
use image::{imageops, DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};

/// Alpha for both watermark passes (~45% opacity).
const WATERMARK_ALPHA: u8 = 115;

/// Shadow offset in pixels, applied on both axes.
const SHADOW_OFFSET: i32 = 5;

/// Font size as a fraction of the source image width.
const FONT_SIZE_RATIO: f32 = 0.15;

pub struct Watermark;

impl Watermark {
    /// Composite a diagonal semi-transparent text mark over the image.
    ///
    /// The mark is rendered twice onto a transparent square canvas sized to
    /// the diagonal of the text's bounding box (so a 45° rotation cannot
    /// clip it): a near-black drop shadow offset by (+5,+5), then a
    /// near-white face at the center. The canvas is rotated 45° and
    /// centered over the image; a mark larger than the image clips at the
    /// edges. PNG input keeps its alpha channel and stays PNG; anything
    /// else is flattened to RGB and written as JPEG.
    pub fn apply(data: &[u8], content_type: &str, watermark_text: &str) -> Result<Vec<u8>, TransformError> {
        let watermark_text = match watermark_text.trim() {
            "" => DEFAULT_WATERMARK_TEXT,
            trimmed => trimmed,
        };

        let img = encode::decode(data)?;
        let (width, height) = img.dimensions();
        let mut base = img.to_rgba8();

        // Font scales with the source so the mark stays legible at any size
        let font_size = (width as f32 * FONT_SIZE_RATIO).max(4.0);
        let (text_width, text_height) = text::measure_text(watermark_text, font_size)?;

        let diagonal = f64::from(text_width)
            .hypot(f64::from(text_height))
            .ceil() as u32;
        let diagonal = diagonal.max(1);

        let mut layer = RgbaImage::new(diagonal, diagonal);
        let text_x = ((diagonal - text_width) / 2) as i32;
        let text_y = ((diagonal - text_height) / 2) as i32;

        text::draw_text(
            &mut layer,
            text_x + SHADOW_OFFSET,
            text_y + SHADOW_OFFSET,
            font_size,
            Rgba([0, 0, 0, WATERMARK_ALPHA]),
            watermark_text,
        )?;
        text::draw_text(
            &mut layer,
            text_x,
            text_y,
            font_size,
            Rgba([255, 255, 255, WATERMARK_ALPHA]),
            watermark_text,
        )?;

        let rotated = rotate_expand(&layer, 45.0);

        let offset_x = (i64::from(width) - i64::from(rotated.width())) / 2;
        let offset_y = (i64::from(height) - i64::from(rotated.height())) / 2;
        imageops::overlay(&mut base, &rotated, offset_x, offset_y);

        tracing::debug!(
            width = width,
            height = height,
            text = %watermark_text,
            font_size = font_size,
            "Watermark applied"
        );

        if content_type == "image/png" {
            encode::encode(&DynamicImage::ImageRgba8(base), ImageFormat::Png)
        } else {
            encode::encode(&DynamicImage::ImageRgba8(base), ImageFormat::Jpeg)
        }
    }
}

/// Rotate an RGBA image by `degrees` clockwise, expanding the output to the
/// rotated bounding box (nothing is cropped). Bilinear sampling; uncovered
/// pixels stay fully transparent.
fn rotate_expand(image: &RgbaImage, degrees: f32) -> RgbaImage {
    let radians = -degrees.to_radians();
    let cos = radians.cos();
    let sin = radians.sin();

    let src_w = image.width() as f32;
    let src_h = image.height() as f32;
    let cx = src_w / 2.0;
    let cy = src_h / 2.0;

    let corners = [
        (-cx, -cy),
        (src_w - cx, -cy),
        (-cx, src_h - cy),
        (src_w - cx, src_h - cy),
    ];

    let rotated_corners: Vec<(f32, f32)> = corners
        .iter()
        .map(|(x, y)| (x * cos - y * sin, x * sin + y * cos))
        .collect();

    let min_x = rotated_corners
        .iter()
        .map(|(x, _)| *x)
        .fold(f32::INFINITY, f32::min);
    let max_x = rotated_corners
        .iter()
        .map(|(x, _)| *x)
        .fold(f32::NEG_INFINITY, f32::max);
    let min_y = rotated_corners
        .iter()
        .map(|(_, y)| *y)
        .fold(f32::INFINITY, f32::min);
    let max_y = rotated_corners
        .iter()
        .map(|(_, y)| *y)
        .fold(f32::NEG_INFINITY, f32::max);

    let dst_w = (max_x - min_x).ceil() as u32;
    let dst_h = (max_y - min_y).ceil() as u32;

    let mut rotated = RgbaImage::new(dst_w.max(1), dst_h.max(1));

    let dst_cx = dst_w as f32 / 2.0;
    let dst_cy = dst_h as f32 / 2.0;

    // Inverse rotation for sampling
    let inv_cos = (-radians).cos();
    let inv_sin = (-radians).sin();

    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let rx = dx as f32 - dst_cx;
            let ry = dy as f32 - dst_cy;

            let sx = rx * inv_cos - ry * inv_sin + cx;
            let sy = rx * inv_sin + ry * inv_cos + cy;

            if sx >= 0.0 && sx < src_w - 1.0 && sy >= 0.0 && sy < src_h - 1.0 {
                let x0 = sx.floor() as u32;
                let y0 = sy.floor() as u32;
                let x1 = x0 + 1;
                let y1 = y0 + 1;

                let fx = sx - x0 as f32;
                let fy = sy - y0 as f32;

                let p00 = image.get_pixel(x0, y0);
                let p10 = image.get_pixel(x1, y0);
                let p01 = image.get_pixel(x0, y1);
                let p11 = image.get_pixel(x1, y1);

                let interpolate = |c: usize| -> u8 {
                    let v = p00[c] as f32 * (1.0 - fx) * (1.0 - fy)
                        + p10[c] as f32 * fx * (1.0 - fy)
                        + p01[c] as f32 * (1.0 - fx) * fy
                        + p11[c] as f32 * fx * fy;
                    v.clamp(0.0, 255.0) as u8
                };

                rotated.put_pixel(
                    dx,
                    dy,
                    Rgba([
                        interpolate(0),
                        interpolate(1),
                        interpolate(2),
                        interpolate(3),
                    ]),
                );
            }
        }
    }

    rotated
}
