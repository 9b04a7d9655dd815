//! Pure calculation functions for canvas geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! The platform accepts exactly three post resolutions; every source image
//! is classified by aspect ratio and mapped onto one of them.

/// Aspect-ratio class of a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Square,
    Landscape,
    Portrait,
}

/// Canvas size for square posts.
pub const CANVAS_SQUARE: (u32, u32) = (1080, 1080);
/// Canvas size for landscape posts.
pub const CANVAS_LANDSCAPE: (u32, u32) = (1080, 608);
/// Canvas size for portrait posts.
pub const CANVAS_PORTRAIT: (u32, u32) = (1080, 1350);

/// Ratio band treated as square. Boundaries are inclusive, so a 0.95 or
/// 1.05 image distorts to 1:1 rather than getting letterboxed.
const SQUARE_RATIO_MIN: f64 = 0.95;
const SQUARE_RATIO_MAX: f64 = 1.05;

/// Classify an image by its width/height ratio.
///
/// Zero dimensions are a caller error; classification of such input is
/// unspecified.
pub fn classify(width: u32, height: u32) -> Orientation {
    debug_assert!(width > 0 && height > 0, "image dimensions must be positive");
    let ratio = width as f64 / height as f64;
    if (SQUARE_RATIO_MIN..=SQUARE_RATIO_MAX).contains(&ratio) {
        Orientation::Square
    } else if width > height {
        Orientation::Landscape
    } else {
        Orientation::Portrait
    }
}

/// Target canvas dimensions for an orientation.
pub fn canvas_for(orientation: Orientation) -> (u32, u32) {
    match orientation {
        Orientation::Square => CANVAS_SQUARE,
        Orientation::Landscape => CANVAS_LANDSCAPE,
        Orientation::Portrait => CANVAS_PORTRAIT,
    }
}

/// Dimensions the source is scaled to before being placed on the canvas.
///
/// - Square: the canvas itself. Aspect ratio is *not* preserved; a
///   near-square image is stretched to 1:1 instead of letterboxed.
/// - Landscape: width pinned to the canvas width, height scaled
///   proportionally and truncated.
/// - Portrait: height pinned to the canvas height, width scaled
///   proportionally and truncated.
///
/// Truncation (not rounding) matches the placement arithmetic: the square
/// ratio band guarantees the free dimension never exceeds the canvas.
pub fn scaled_dimensions(orientation: Orientation, width: u32, height: u32) -> (u32, u32) {
    let (target_w, target_h) = canvas_for(orientation);
    match orientation {
        Orientation::Square => (target_w, target_h),
        Orientation::Landscape => {
            let scaled_h = (target_w as f64 / width as f64 * height as f64) as u32;
            (target_w, scaled_h)
        }
        Orientation::Portrait => {
            let scaled_w = (target_h as f64 / height as f64 * width as f64) as u32;
            (scaled_w, target_h)
        }
    }
}

/// Top-left offsets that center `scaled` on `canvas`.
///
/// Integer division truncates toward zero, so an odd pixel remainder lands
/// on the trailing (right/bottom) edge. Offsets go negative when the scaled
/// image overhangs the canvas (a mildly-landscape image pinned to the full
/// canvas width, for example). The placement step clips the overhang
/// symmetrically.
pub fn centered_offsets(canvas: (u32, u32), scaled: (u32, u32)) -> (i64, i64) {
    (
        (canvas.0 as i64 - scaled.0 as i64) / 2,
        (canvas.1 as i64 - scaled.1 as i64) / 2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // classify tests
    // =========================================================================

    #[test]
    fn classify_exact_square() {
        assert_eq!(classify(1000, 1000), Orientation::Square);
    }

    #[test]
    fn classify_square_band_boundaries_inclusive() {
        // ratio exactly 0.95 and 1.05
        assert_eq!(classify(95, 100), Orientation::Square);
        assert_eq!(classify(105, 100), Orientation::Square);
    }

    #[test]
    fn classify_just_outside_square_band() {
        assert_eq!(classify(949, 1000), Orientation::Portrait);
        assert_eq!(classify(1051, 1000), Orientation::Landscape);
    }

    #[test]
    fn classify_landscape() {
        assert_eq!(classify(1920, 1080), Orientation::Landscape);
        assert_eq!(classify(3000, 2000), Orientation::Landscape);
    }

    #[test]
    fn classify_portrait() {
        assert_eq!(classify(1080, 1920), Orientation::Portrait);
        assert_eq!(classify(2000, 3000), Orientation::Portrait);
    }

    #[test]
    fn classify_near_square_sweep() {
        // Every ratio inside [0.95, 1.05] must land in Square.
        for w in 950..=1050 {
            assert_eq!(classify(w, 1000), Orientation::Square, "width {w}");
        }
    }

    // =========================================================================
    // canvas_for tests
    // =========================================================================

    #[test]
    fn canvas_sizes_are_fixed() {
        assert_eq!(canvas_for(Orientation::Square), (1080, 1080));
        assert_eq!(canvas_for(Orientation::Landscape), (1080, 608));
        assert_eq!(canvas_for(Orientation::Portrait), (1080, 1350));
    }

    // =========================================================================
    // scaled_dimensions tests
    // =========================================================================

    #[test]
    fn scaled_square_distorts_to_canvas() {
        // 1040x1000 is inside the square band; it stretches to 1080x1080.
        assert_eq!(classify(1040, 1000), Orientation::Square);
        assert_eq!(
            scaled_dimensions(Orientation::Square, 1040, 1000),
            (1080, 1080)
        );
    }

    #[test]
    fn scaled_landscape_pins_width() {
        // 1920x1080 → width 1080, height trunc(1080/1920*1080) = 607
        assert_eq!(
            scaled_dimensions(Orientation::Landscape, 1920, 1080),
            (1080, 607)
        );
    }

    #[test]
    fn scaled_portrait_pins_height() {
        // 1080x1920 → height 1350, width trunc(1350/1920*1080) = 759
        assert_eq!(
            scaled_dimensions(Orientation::Portrait, 1080, 1920),
            (759, 1350)
        );
    }

    #[test]
    fn scaled_truncates_not_rounds() {
        // 1500x1000 → height = 1080/1500*1000 = 720.0 exactly; perturb:
        // 1499x1000 → 1080/1499*1000 = 720.48... → 720 (truncated)
        assert_eq!(
            scaled_dimensions(Orientation::Landscape, 1499, 1000),
            (1080, 720)
        );
        // 1501x1000 → 719.52... → 719, not 720
        assert_eq!(
            scaled_dimensions(Orientation::Landscape, 1501, 1000),
            (1080, 719)
        );
    }

    #[test]
    fn scaled_fits_canvas_beyond_canvas_ratio() {
        // Once the source is at least as wide as the canvas ratio (1080:608),
        // the free dimension fits inside the canvas.
        for w in 1776..4000u32 {
            let (sw, sh) = scaled_dimensions(Orientation::Landscape, w, 1000);
            let (cw, ch) = CANVAS_LANDSCAPE;
            assert!(sw <= cw && sh <= ch, "{w}x1000 scaled to {sw}x{sh}");
        }
        for h in 1250..4000u32 {
            let (sw, sh) = scaled_dimensions(Orientation::Portrait, 1000, h);
            let (cw, ch) = CANVAS_PORTRAIT;
            assert!(sw <= cw && sh <= ch, "1000x{h} scaled to {sw}x{sh}");
        }
    }

    #[test]
    fn scaled_mild_landscape_overhangs_canvas_height() {
        // Ratio between 1.05 and 1080:608 pins the width but overhangs the
        // short canvas; placement clips it top and bottom.
        let (sw, sh) = scaled_dimensions(Orientation::Landscape, 1200, 1000);
        assert_eq!(sw, 1080);
        assert!(sh > CANVAS_LANDSCAPE.1);
    }

    // =========================================================================
    // centered_offsets tests
    // =========================================================================

    #[test]
    fn offsets_center_evenly() {
        assert_eq!(centered_offsets((1080, 608), (1080, 400)), (0, 104));
        assert_eq!(centered_offsets((1080, 1350), (800, 1350)), (140, 0));
    }

    #[test]
    fn offsets_odd_remainder_lands_on_trailing_edge() {
        // 608 - 607 = 1 → offset 0, the spare pixel sits at the bottom.
        assert_eq!(centered_offsets((1080, 608), (1080, 607)), (0, 0));
        assert_eq!(centered_offsets((1080, 1350), (759, 1350)), (160, 0));
    }

    #[test]
    fn offsets_zero_when_exact_fit() {
        assert_eq!(centered_offsets((1080, 1080), (1080, 1080)), (0, 0));
    }

    #[test]
    fn offsets_negative_when_scaled_overhangs() {
        // 1200x1000 landscape scales to 1080x900; the canvas is 608 tall,
        // so the image is clipped 146 pixels top and bottom.
        let scaled = scaled_dimensions(Orientation::Landscape, 1200, 1000);
        assert_eq!(scaled, (1080, 900));
        assert_eq!(centered_offsets(CANVAS_LANDSCAPE, scaled), (0, -146));
    }
}
