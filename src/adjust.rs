//! Brightness and contrast adjustment.
//!
//! Mirrors the CSS `brightness()` and `contrast()` filter functions, applied in
//! that order to each color channel of unpremultiplied pixels:
//!
//! `x' = clamp(x * b)` followed by `x'' = clamp((x' - 0.5) * c + 0.5)`
//!
//! where `x` is the channel normalized to `[0, 1]` and `b`, `c` are the
//! percentages divided by 100. Alpha is never touched.

use image::RgbaImage;

use crate::error::{Error, Result};

/// Lowest percentage accepted by either slider.
pub const MIN_PERCENT: u16 = 0;

/// Highest percentage accepted by either slider.
pub const MAX_PERCENT: u16 = 200;

/// Percentage meaning "unmodified".
pub const IDENTITY_PERCENT: u16 = 100;

/// Brightness and contrast percentages, 100 meaning unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdjustmentState {
    brightness: u16,
    contrast: u16,
}

impl Default for AdjustmentState {
    fn default() -> Self {
        Self {
            brightness: IDENTITY_PERCENT,
            contrast: IDENTITY_PERCENT,
        }
    }
}

impl AdjustmentState {
    /// Create an adjustment pair, rejecting values outside the slider range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AdjustmentOutOfRange`] if either percentage exceeds
    /// [`MAX_PERCENT`].
    pub fn new(brightness: u16, contrast: u16) -> Result<Self> {
        Ok(Self {
            brightness: check_range("brightness", brightness)?,
            contrast: check_range("contrast", contrast)?,
        })
    }

    /// Create an adjustment pair, clamping each value into the slider range.
    #[must_use]
    pub fn clamped(brightness: u16, contrast: u16) -> Self {
        Self {
            brightness: brightness.clamp(MIN_PERCENT, MAX_PERCENT),
            contrast: contrast.clamp(MIN_PERCENT, MAX_PERCENT),
        }
    }

    /// Brightness percentage.
    #[must_use]
    pub fn brightness(&self) -> u16 {
        self.brightness
    }

    /// Contrast percentage.
    #[must_use]
    pub fn contrast(&self) -> u16 {
        self.contrast
    }

    /// Returns a copy with a new brightness, clamped into the slider range.
    #[must_use]
    pub fn with_brightness(self, brightness: u16) -> Self {
        Self::clamped(brightness, self.contrast)
    }

    /// Returns a copy with a new contrast, clamped into the slider range.
    #[must_use]
    pub fn with_contrast(self, contrast: u16) -> Self {
        Self::clamped(self.brightness, contrast)
    }

    /// Whether both values are 100%.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.brightness == IDENTITY_PERCENT && self.contrast == IDENTITY_PERCENT
    }

    /// The equivalent CSS `filter` property value.
    #[must_use]
    pub fn css_filter(&self) -> String {
        format!(
            "brightness({}%) contrast({}%)",
            self.brightness, self.contrast
        )
    }

    /// Transform a single 8-bit color channel.
    #[must_use]
    pub fn apply_channel(&self, value: u8) -> u8 {
        let b = f32::from(self.brightness) / 100.0;
        let c = f32::from(self.contrast) / 100.0;

        let x = f32::from(value) / 255.0;
        let x = (x * b).clamp(0.0, 1.0);
        let x = ((x - 0.5) * c + 0.5).clamp(0.0, 1.0);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (x * 255.0).round() as u8
        }
    }

    /// Precompute the channel transform for every 8-bit input.
    #[must_use]
    pub fn lookup_table(&self) -> [u8; 256] {
        let mut lut = [0u8; 256];
        for (value, slot) in (0..=u8::MAX).zip(lut.iter_mut()) {
            *slot = self.apply_channel(value);
        }
        lut
    }

    /// Apply the transform in-place to the color channels of an RGBA image.
    pub fn apply(&self, image: &mut RgbaImage) {
        if self.is_identity() {
            return;
        }

        let lut = self.lookup_table();
        for px in image.pixels_mut() {
            for ch in 0..3 {
                px[ch] = lut[usize::from(px[ch])];
            }
        }
    }
}

fn check_range(name: &'static str, value: u16) -> Result<u16> {
    if (MIN_PERCENT..=MAX_PERCENT).contains(&value) {
        Ok(value)
    } else {
        Err(Error::AdjustmentOutOfRange {
            name,
            value,
            min: MIN_PERCENT,
            max: MAX_PERCENT,
        })
    }
}
