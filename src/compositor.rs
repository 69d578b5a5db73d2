//! Flattening a cut-out against its backdrop for export.
//!
//! The order of operations is fixed: allocate at natural size, fill the
//! background, filter the cut-out, then draw it source-over at the origin.
//! The fill never passes through the brightness/contrast filter.

use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use image::codecs::png::PngEncoder;
use image::{imageops, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

use crate::adjust::AdjustmentState;
use crate::background::BackgroundChoice;
use crate::error::{Error, Result};
use crate::media::ProcessedImage;

/// File name used when exporting a session result.
pub const EXPORT_FILE_NAME: &str = "vision_result.png";

/// Composite `image` over `background` with `adjustments` applied to it.
///
/// The result has the image's natural dimensions regardless of how it was
/// previewed.
///
/// # Errors
///
/// Returns [`Error::ImageNotLoaded`] if the image has zero width or height.
pub fn composite(
    image: &ProcessedImage,
    background: BackgroundChoice,
    adjustments: AdjustmentState,
) -> Result<RgbaImage> {
    let (width, height) = image.natural_dimensions();
    if !image.is_loaded() {
        return Err(Error::ImageNotLoaded { width, height });
    }

    let mut surface = match background.fill() {
        Some(fill) => RgbaImage::from_pixel(width, height, fill),
        None => RgbaImage::new(width, height),
    };

    let mut layer = image.pixels().clone();
    adjustments.apply(&mut layer);

    for (dst, src) in surface.pixels_mut().zip(layer.pixels()) {
        source_over(dst, *src);
    }

    log::debug!(
        "composited {width}x{height} over {background} with {}",
        adjustments.css_filter()
    );
    Ok(surface)
}

/// Crop a flattened export to the subject's bounding box.
///
/// `subject` is the image the export was composited from; its alpha mask
/// decides the box, so the crop works even against an opaque backdrop. An
/// image with no visible subject is returned unchanged.
#[must_use]
pub fn crop_to_subject(flattened: RgbaImage, subject: &ProcessedImage) -> RgbaImage {
    match subject.subject_bounds() {
        Some((x, y, w, h)) if (w, h) != flattened.dimensions() => {
            imageops::crop_imm(&flattened, x, y, w, h).to_image()
        }
        _ => flattened,
    }
}

/// Blend `src` onto `dst` with the Porter-Duff source-over operator.
///
/// Color is unpremultiplied on both sides.
fn source_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let src_a = src[3];
    if src_a == u8::MAX || dst[3] == 0 {
        *dst = src;
        return;
    }
    if src_a == 0 {
        return;
    }

    let sa = f32::from(src_a) / 255.0;
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);

    for ch in 0..3 {
        let sc = f32::from(src[ch]);
        let dc = f32::from(dst[ch]);
        let out = (sc * sa + dc * da * (1.0 - sa)) / out_a;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            dst[ch] = out.round().clamp(0.0, 255.0) as u8;
        }
    }

    dst[3] = if dst[3] == u8::MAX {
        u8::MAX
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (out_a * 255.0).round().clamp(0.0, 255.0) as u8
        }
    };
}

/// Encode an RGBA image as PNG bytes.
///
/// # Errors
///
/// Returns [`Error::Image`] if encoding fails.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    PngEncoder::new(&mut buf).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(buf.into_inner())
}

/// Encode an RGBA image as a `data:image/png;base64,...` URL.
///
/// # Errors
///
/// Returns [`Error::Image`] if encoding fails.
pub fn encode_data_url(image: &RgbaImage) -> Result<String> {
    let png = encode_png(image)?;
    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png)
    ))
}

/// Write an RGBA image to `path` as PNG, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or writing fails.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, encode_png(image)?)?;
    Ok(())
}
