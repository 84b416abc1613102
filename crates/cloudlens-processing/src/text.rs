//! Text rendering onto transparent RGBA canvases.
//!
//! Uses an embedded font so rendering needs no system font lookup and is
//! identical across hosts.

use crate::error::TransformError;
use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use std::sync::OnceLock;

static DEFAULT_FONT: OnceLock<FontRef<'static>> = OnceLock::new();

/// Embedded font data (DejaVu Sans Bold - free license, commonly available).
const EMBEDDED_FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");

/// Get the default font, initializing it lazily.
fn default_font() -> Result<&'static FontRef<'static>, TransformError> {
    DEFAULT_FONT.get_or_init(|| {
        FontRef::try_from_slice(EMBEDDED_FONT_DATA)
            .expect("Failed to load embedded font - this is a bug")
    });

    DEFAULT_FONT
        .get()
        .ok_or_else(|| TransformError::TextRender("Failed to initialize font".to_string()))
}

/// Calculate the rendered bounding box of `text` at `font_size` pixels.
///
/// Returns (width, height) in pixels, including a small anti-aliasing pad.
pub fn measure_text(text: &str, font_size: f32) -> Result<(u32, u32), TransformError> {
    let font = default_font()?;
    let scale = PxScale::from(font_size);
    let scaled_font = font.as_scaled(scale);

    let mut width = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);

        if let Some(prev) = prev_glyph {
            width += scaled_font.kern(prev, glyph_id);
        }

        width += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    let height = scaled_font.height();

    let padding = 2;
    Ok((
        width.ceil() as u32 + padding,
        height.ceil() as u32 + padding,
    ))
}

/// Render `text` onto `canvas` with its top-left corner at (x, y).
///
/// Glyph coverage is multiplied into the color's alpha and composited over
/// whatever the canvas already holds, so overlapping draws (e.g. a drop
/// shadow under the face text) blend instead of overwriting.
pub fn draw_text(
    canvas: &mut RgbaImage,
    x: i32,
    y: i32,
    font_size: f32,
    color: Rgba<u8>,
    text: &str,
) -> Result<(), TransformError> {
    let font = default_font()?;
    let scale = PxScale::from(font_size);
    let scaled_font = font.as_scaled(scale);

    let canvas_width = canvas.width() as i32;
    let canvas_height = canvas.height() as i32;

    let baseline_y = y as f32 + scaled_font.ascent();
    let mut cursor_x = x as f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);

        if let Some(prev) = prev_glyph {
            cursor_x += scaled_font.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();

            outlined.draw(|px, py, coverage| {
                let cx = px as i32 + bounds.min.x as i32;
                let cy = py as i32 + bounds.min.y as i32;

                if cx >= 0 && cy >= 0 && cx < canvas_width && cy < canvas_height {
                    let pixel_alpha = (coverage * color[3] as f32) as u8;
                    let pixel = Rgba([color[0], color[1], color[2], pixel_alpha]);

                    let existing = canvas.get_pixel(cx as u32, cy as u32);
                    let blended = blend_pixels(*existing, pixel);
                    canvas.put_pixel(cx as u32, cy as u32, blended);
                }
            });
        }

        cursor_x += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    Ok(())
}

/// Blend two RGBA pixels with the Porter-Duff "over" operator.
pub(crate) fn blend_pixels(bottom: Rgba<u8>, top: Rgba<u8>) -> Rgba<u8> {
    let top_alpha = top[3] as f32 / 255.0;
    let bottom_alpha = bottom[3] as f32 / 255.0;

    let out_alpha = top_alpha + bottom_alpha * (1.0 - top_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |t: u8, b: u8| -> u8 {
        let t = t as f32 / 255.0;
        let b = b as f32 / 255.0;
        let result = (t * top_alpha + b * bottom_alpha * (1.0 - top_alpha)) / out_alpha;
        (result * 255.0) as u8
    };

    Rgba([
        blend(top[0], bottom[0]),
        blend(top[1], bottom[1]),
        blend(top[2], bottom[2]),
        (out_alpha * 255.0) as u8,
    ])
}
