//! Canvas composition: scale a decoded image onto a platform canvas.
//!
//! The geometry lives in [`geometry`](super::geometry); this module does the
//! pixel work with the `image` crate (Lanczos3 resampling, white canvas,
//! centered overlay).

use super::geometry::{Orientation, canvas_for, centered_offsets, classify, scaled_dimensions};
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage, imageops};

/// Classify `image` and fit it onto the matching platform canvas.
///
/// The result always has exactly the canvas dimensions for the computed
/// orientation. Square sources are stretched to 1:1; landscape and portrait
/// sources are scaled uniformly and centered on a white canvas, clipped
/// symmetrically if the free dimension overhangs.
pub fn normalize(image: &DynamicImage) -> RgbImage {
    let orientation = classify(image.width(), image.height());
    normalize_as(image, orientation)
}

/// Fit `image` onto the canvas for a caller-chosen orientation.
pub fn normalize_as(image: &DynamicImage, orientation: Orientation) -> RgbImage {
    let canvas_dims = canvas_for(orientation);
    let scaled = scaled_dimensions(orientation, image.width(), image.height());
    let resized = image
        .resize_exact(scaled.0, scaled.1, FilterType::Lanczos3)
        .to_rgb8();

    // Square fills the canvas edge to edge; no backdrop needed.
    if orientation == Orientation::Square {
        return resized;
    }

    let mut canvas = RgbImage::from_pixel(canvas_dims.0, canvas_dims.1, Rgb([255, 255, 255]));
    let (dx, dy) = centered_offsets(canvas_dims, scaled);
    imageops::overlay(&mut canvas, &resized, dx, dy);
    canvas
}
