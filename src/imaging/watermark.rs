//! Watermark stamping: translucent text in the bottom-right corner.
//!
//! The stamp never fails the pipeline. The configured TrueType face is
//! rasterized through `ab_glyph`; if the font file is missing or invalid the
//! stamper silently falls back to the built-in 5x7 bitmap face
//! ([`builtin_font`](super::builtin_font)).
//!
//! Output is always a fully-opaque RGB buffer of the same dimensions as the
//! input, whatever the input color mode, so repeated stamping starts from a
//! consistent base.

use super::builtin_font;
use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use image::{DynamicImage, RgbImage, RgbaImage};
use std::path::Path;

/// Pixel multiplier for the fallback bitmap face.
const BUILTIN_SCALE: u32 = 2;
/// Column gap between bitmap glyph cells, in source pixels.
const BUILTIN_GAP: u32 = 1;

enum Face {
    Ttf(FontVec),
    Builtin,
}

/// Text stamper bound to a glyph face and a pixel size.
pub struct Stamper {
    face: Face,
    size: f32,
}

impl Stamper {
    /// Load the face at `font_path`, falling back to the built-in bitmap
    /// face when the file is absent or not a parseable font.
    pub fn new(font_path: &Path, size: f32) -> Self {
        let face = match std::fs::read(font_path) {
            Ok(bytes) => match FontVec::try_from_vec(bytes) {
                Ok(font) => Face::Ttf(font),
                Err(_) => {
                    tracing::debug!(path = %font_path.display(), "font not parseable, using builtin face");
                    Face::Builtin
                }
            },
            Err(_) => {
                tracing::debug!(path = %font_path.display(), "font not found, using builtin face");
                Face::Builtin
            }
        };
        Self { face, size }
    }

    /// Stamper that always uses the built-in bitmap face.
    pub fn builtin(size: f32) -> Self {
        Self {
            face: Face::Builtin,
            size,
        }
    }

    /// Whether the TrueType face loaded (the builtin face is in use otherwise).
    pub fn has_truetype(&self) -> bool {
        matches!(self.face, Face::Ttf(_))
    }

    /// Draw `text` translucent white, bottom-right, inset by `margin` from
    /// the corner. `opacity` runs 0 (invisible) to 255 (opaque).
    ///
    /// The text block clamps to the top-left edge when it is larger than the
    /// image.
    pub fn stamp(
        &self,
        image: &DynamicImage,
        text: &str,
        opacity: u8,
        margin: (u32, u32),
    ) -> RgbImage {
        let mut layer = image.to_rgba8();
        let (text_w, text_h) = self.measure(text);

        let x = (layer.width() as i64 - text_w as i64 - margin.0 as i64).max(0);
        let y = (layer.height() as i64 - text_h as i64 - margin.1 as i64).max(0);

        match &self.face {
            Face::Ttf(font) => self.draw_ttf(&mut layer, font, text, opacity, x as f32, y as f32),
            Face::Builtin => draw_builtin(&mut layer, text, opacity, x as u32, y as u32),
        }

        DynamicImage::ImageRgba8(layer).to_rgb8()
    }

    /// Bounding box of `text` in pixels for the active face.
    fn measure(&self, text: &str) -> (u32, u32) {
        match &self.face {
            Face::Ttf(font) => {
                let scaled = font.as_scaled(PxScale::from(self.size));
                let width: f32 = text
                    .chars()
                    .map(|c| scaled.h_advance(scaled.glyph_id(c)))
                    .sum();
                let height = scaled.ascent() - scaled.descent();
                (width.ceil() as u32, height.ceil() as u32)
            }
            Face::Builtin => {
                let cell = (builtin_font::GLYPH_WIDTH + BUILTIN_GAP) * BUILTIN_SCALE;
                let count = text.chars().count() as u32;
                (count * cell, builtin_font::GLYPH_HEIGHT * BUILTIN_SCALE)
            }
        }
    }

    fn draw_ttf(
        &self,
        layer: &mut RgbaImage,
        font: &FontVec,
        text: &str,
        opacity: u8,
        x: f32,
        y: f32,
    ) {
        let scaled = font.as_scaled(PxScale::from(self.size));
        let mut caret = x;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            let glyph = id.with_scale_and_position(scaled.scale(), point(caret, y + scaled.ascent()));
            caret += scaled.h_advance(id);
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let px = bounds.min.x as i64 + gx as i64;
                    let py = bounds.min.y as i64 + gy as i64;
                    blend_white(layer, px, py, coverage * opacity as f32 / 255.0);
                });
            }
        }
    }
}

/// Render with the 5x7 bitmap face: binary coverage, `BUILTIN_SCALE`-sized
/// pixels.
fn draw_builtin(layer: &mut RgbaImage, text: &str, opacity: u8, x: u32, y: u32) {
    let alpha = opacity as f32 / 255.0;
    let cell = (builtin_font::GLYPH_WIDTH + BUILTIN_GAP) * BUILTIN_SCALE;
    for (i, c) in text.chars().enumerate() {
        let glyph_x = x as i64 + (i as u32 * cell) as i64;
        let rows = builtin_font::rows(c);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..builtin_font::GLYPH_WIDTH {
                if bits & (1 << (builtin_font::GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                for dy in 0..BUILTIN_SCALE {
                    for dx in 0..BUILTIN_SCALE {
                        blend_white(
                            layer,
                            glyph_x + (col * BUILTIN_SCALE + dx) as i64,
                            y as i64 + (row as u32 * BUILTIN_SCALE + dy) as i64,
                            alpha,
                        );
                    }
                }
            }
        }
    }
}

/// Source-over blend of white at `alpha` into the color channels. Pixels
/// outside the buffer are ignored.
fn blend_white(layer: &mut RgbaImage, x: i64, y: i64, alpha: f32) {
    if x < 0 || y < 0 || x >= layer.width() as i64 || y >= layer.height() as i64 {
        return;
    }
    let a = alpha.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let px = layer.get_pixel_mut(x as u32, y as u32);
    for channel in px.0.iter_mut().take(3) {
        *channel = (*channel as f32 * (1.0 - a) + 255.0 * a).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
    }

    #[test]
    fn missing_font_falls_back_to_builtin() {
        let stamper = Stamper::new(Path::new("/nonexistent/face.ttf"), 15.0);
        assert!(!stamper.has_truetype());
    }

    #[test]
    fn garbage_font_file_falls_back_to_builtin() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("face.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        let stamper = Stamper::new(&path, 15.0);
        assert!(!stamper.has_truetype());
    }

    #[test]
    fn stamp_preserves_dimensions() {
        let stamper = Stamper::builtin(15.0);
        let out = stamper.stamp(&solid(300, 200, [0, 0, 0]), "watermark", 128, (20, 20));
        assert_eq!((out.width(), out.height()), (300, 200));
    }

    #[test]
    fn stamp_lightens_bottom_right_region() {
        let stamper = Stamper::builtin(15.0);
        let out = stamper.stamp(&solid(300, 200, [0, 0, 0]), "MARK", 255, (20, 20));
        // Some pixel inside the text block must now be white.
        let lit = out
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 == [255, 255, 255])
            .count();
        assert!(lit > 0, "no watermark pixels drawn");
        // Top-left corner untouched.
        assert_eq!(*out.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn stamp_text_sits_inside_margin() {
        let stamper = Stamper::builtin(15.0);
        let out = stamper.stamp(&solid(300, 200, [0, 0, 0]), "M", 255, (20, 20));
        // Nothing drawn inside the 20px band at the right and bottom edges.
        for x in 281..300 {
            for y in 0..200 {
                assert_eq!(*out.get_pixel(x, y), Rgb([0, 0, 0]), "pixel {x},{y}");
            }
        }
        for y in 181..200 {
            for x in 0..300 {
                assert_eq!(*out.get_pixel(x, y), Rgb([0, 0, 0]), "pixel {x},{y}");
            }
        }
    }

    #[test]
    fn zero_opacity_is_invisible() {
        let stamper = Stamper::builtin(15.0);
        let src = solid(100, 80, [7, 7, 7]);
        let out = stamper.stamp(&src, "MARK", 0, (5, 5));
        assert!(out.pixels().all(|p| p.0 == [7, 7, 7]));
    }

    #[test]
    fn half_opacity_blends() {
        let stamper = Stamper::builtin(15.0);
        let out = stamper.stamp(&solid(100, 80, [0, 0, 0]), "H", 128, (5, 5));
        // Drawn pixels are mid-gray, not full white.
        let max = out.pixels().map(|p| p.0[0]).max().unwrap();
        assert!(max > 100 && max < 200, "max channel {max}");
    }

    #[test]
    fn output_is_opaque_rgb_for_rgba_input() {
        let rgba = RgbaImage::from_pixel(64, 64, Rgba([10, 20, 30, 40]));
        let stamper = Stamper::builtin(15.0);
        let out = stamper.stamp(&DynamicImage::ImageRgba8(rgba), "X", 200, (4, 4));
        assert_eq!((out.width(), out.height()), (64, 64));
    }

    #[test]
    fn oversized_text_clamps_to_origin() {
        let stamper = Stamper::builtin(15.0);
        // 12px per cell * 30 chars is far wider than the image.
        let out = stamper.stamp(&solid(40, 20, [0, 0, 0]), &"W".repeat(30), 255, (20, 20));
        assert_eq!((out.width(), out.height()), (40, 20));
    }
}
