//! The two images a session handles: the upload and the service's result.

use std::path::Path;

use image::{ImageFormat, RgbaImage};

use crate::error::{Error, Result};

/// Raw bytes of a file chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    file_name: String,
    bytes: Vec<u8>,
}

impl SourceImage {
    /// Wrap bytes already in memory.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |f| f.to_string_lossy().into_owned());
        Ok(Self { file_name, bytes })
    }

    /// File name sent alongside the bytes.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The unmodified file contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume and return the file contents.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// MIME type guessed from the file name, falling back to octet-stream.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        ImageFormat::from_path(&self.file_name)
            .map_or("application/octet-stream", |f| f.to_mime_type())
    }

    /// Decode the upload itself, for showing it while the request is pending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if the bytes are not a supported image.
    pub fn decode(&self) -> Result<ProcessedImage> {
        let pixels = image::load_from_memory(&self.bytes)?.to_rgba8();
        Ok(ProcessedImage { pixels })
    }

    /// Check format and size before upload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for non-image extensions and
    /// [`Error::UploadTooLarge`] when the file exceeds `max_bytes`.
    pub fn validate(&self, max_bytes: u64) -> Result<()> {
        if !is_supported_image(Path::new(&self.file_name)) {
            return Err(Error::UnsupportedFormat(self.file_name.clone()));
        }
        let size = self.bytes.len() as u64;
        if size > max_bytes {
            return Err(Error::UploadTooLarge {
                size,
                limit: max_bytes,
            });
        }
        Ok(())
    }
}

/// The background-removed image returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    pixels: RgbaImage,
}

impl ProcessedImage {
    /// Decode a service response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the bytes are not a supported image.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let pixels = image::load_from_memory(bytes)
            .map_err(Error::Decode)?
            .to_rgba8();
        Ok(Self { pixels })
    }

    /// Natural (intrinsic) width and height in pixels.
    #[must_use]
    pub fn natural_dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Whether the image has usable, non-zero dimensions.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.pixels.width() > 0 && self.pixels.height() > 0
    }

    /// Share of pixels belonging to the subject (alpha above zero), in percent.
    #[must_use]
    pub fn coverage(&self) -> f32 {
        let total = u64::from(self.pixels.width()) * u64::from(self.pixels.height());
        if total == 0 {
            return 0.0;
        }
        let subject = self.pixels.pixels().filter(|p| p[3] > 0).count() as u64;
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        {
            (subject as f64 / total as f64 * 100.0) as f32
        }
    }

    /// Smallest rectangle holding every subject pixel, as `(x, y, width, height)`.
    ///
    /// `None` when no pixel has alpha above zero.
    #[must_use]
    pub fn subject_bounds(&self) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y, px) in self.pixels.enumerate_pixels() {
            if px[3] == 0 {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
        bounds.map(|(x0, y0, x1, y1)| (x0, y0, x1 - x0 + 1, y1 - y0 + 1))
    }

    /// Borrow the decoded pixels.
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl From<RgbaImage> for ProcessedImage {
    fn from(pixels: RgbaImage) -> Self {
        Self { pixels }
    }
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp"
        ),
        None => false,
    }
}
