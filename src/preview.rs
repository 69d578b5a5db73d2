//! Live preview of the cut-out.
//!
//! A preview is only the brightness/contrast filter applied to the displayed
//! image: no backdrop fill and no redraw at natural size. It is recomputed
//! from scratch whenever the adjustments change.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::adjust::AdjustmentState;
use crate::error::{Error, Result};
use crate::media::ProcessedImage;

/// Size that fits `natural` inside `bounds` while keeping the aspect ratio.
///
/// Images already inside the bounds are never enlarged. Each side is at least
/// one pixel.
#[must_use]
pub fn fit_within(natural: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (w, h) = natural;
    let (max_w, max_h) = bounds;
    if w <= max_w && h <= max_h {
        return natural;
    }

    let scale = (f64::from(max_w) / f64::from(w)).min(f64::from(max_h) / f64::from(h));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scaled = |v: u32| ((f64::from(v) * scale).round() as u32).max(1);
    (scaled(w), scaled(h))
}

/// Render the displayed preview.
///
/// With `display_bounds` the image is first scaled down to fit, mimicking an
/// on-screen element smaller than the image.
///
/// # Errors
///
/// Returns [`Error::ImageNotLoaded`] if the image has zero width or height.
pub fn render(
    image: &ProcessedImage,
    adjustments: AdjustmentState,
    display_bounds: Option<(u32, u32)>,
) -> Result<RgbaImage> {
    let natural = image.natural_dimensions();
    if !image.is_loaded() {
        return Err(Error::ImageNotLoaded {
            width: natural.0,
            height: natural.1,
        });
    }

    let mut shown = match display_bounds.map(|b| fit_within(natural, b)) {
        Some((w, h)) if (w, h) != natural => {
            imageops::resize(image.pixels(), w, h, FilterType::Triangle)
        }
        _ => image.pixels().clone(),
    };
    adjustments.apply(&mut shown);
    Ok(shown)
}
