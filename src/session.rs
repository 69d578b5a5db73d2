//! A single editing session: one upload, its result, and the user's edits.
//!
//! Phases move `Idle -> Uploading -> Ready | Failed`. Only one request may be
//! in flight; a new file arriving while uploading is rejected with
//! [`Error::Busy`]. Starting a new upload from any other phase discards the
//! previous result and restores default adjustments and a transparent
//! background. [`Session::reset`] returns to `Idle` without touching anything
//! outside the session.

use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::adjust::AdjustmentState;
use crate::background::BackgroundChoice;
use crate::client::BackgroundRemover;
use crate::compositor::{self, EXPORT_FILE_NAME};
use crate::error::{Error, Result};
use crate::media::{ProcessedImage, SourceImage};
use crate::preview;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing selected yet.
    Idle,
    /// The source is with the service.
    Uploading,
    /// A processed image is available.
    Ready,
    /// The last request failed; reset before continuing.
    Failed,
}

/// Status label shown next to the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    /// Label text.
    pub text: &'static str,
    /// Foreground color as CSS.
    pub color: &'static str,
    /// Background color as CSS.
    pub background: &'static str,
}

impl Phase {
    /// The status badge for this phase.
    #[must_use]
    pub fn badge(self) -> StatusBadge {
        match self {
            Self::Idle => StatusBadge {
                text: "Waiting for image",
                color: "#9ca3af",
                background: "rgba(156, 163, 175, 0.1)",
            },
            Self::Uploading => StatusBadge {
                text: "Neural Network Active...",
                color: "#fbbf24",
                background: "rgba(251, 191, 36, 0.1)",
            },
            Self::Ready => StatusBadge {
                text: "Extraction Complete",
                color: "#34d399",
                background: "rgba(16, 185, 129, 0.2)",
            },
            Self::Failed => StatusBadge {
                text: "Extraction Failed",
                color: "#f87171",
                background: "rgba(248, 113, 113, 0.1)",
            },
        }
    }
}

/// State of one editing session.
#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    adjustments: AdjustmentState,
    background: BackgroundChoice,
    source: Option<SourceImage>,
    processed: Option<ProcessedImage>,
    auto_crop: bool,
    last_error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// An idle session with default edits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            adjustments: AdjustmentState::default(),
            background: BackgroundChoice::default(),
            source: None,
            processed: None,
            auto_crop: false,
            last_error: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current status badge.
    #[must_use]
    pub fn badge(&self) -> StatusBadge {
        self.phase.badge()
    }

    /// Current brightness/contrast.
    #[must_use]
    pub fn adjustments(&self) -> AdjustmentState {
        self.adjustments
    }

    /// Current backdrop.
    #[must_use]
    pub fn background(&self) -> BackgroundChoice {
        self.background
    }

    /// The file being or last processed.
    #[must_use]
    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    /// The service's result, once ready.
    #[must_use]
    pub fn processed(&self) -> Option<&ProcessedImage> {
        self.processed.as_ref()
    }

    /// Whether exports are cropped to the subject's bounding box.
    #[must_use]
    pub fn auto_crop(&self) -> bool {
        self.auto_crop
    }

    /// Message of the failure that put the session in [`Phase::Failed`].
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Accept a new file and start waiting for its result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] while a previous request is still in flight.
    pub fn begin(&mut self, source: SourceImage) -> Result<()> {
        if self.phase == Phase::Uploading {
            log::warn!("rejecting {}: request already in flight", source.file_name());
            return Err(Error::Busy);
        }

        self.reset();
        log::debug!("session uploading {}", source.file_name());
        self.source = Some(source);
        self.phase = Phase::Uploading;
        Ok(())
    }

    /// Accept the service's response body.
    ///
    /// An undecodable body fails the session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotUploading`] if no request is pending, or
    /// [`Error::Decode`] if the body is not an image.
    pub fn complete(&mut self, body: &[u8]) -> Result<()> {
        if self.phase != Phase::Uploading {
            return Err(Error::NotUploading);
        }

        match ProcessedImage::decode(body) {
            Ok(processed) => {
                let (w, h) = processed.natural_dimensions();
                log::debug!("session ready with {w}x{h} result");
                self.processed = Some(processed);
                self.phase = Phase::Ready;
                Ok(())
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Record a failed request.
    ///
    /// A failure is fatal for the session: the source, result and all edits
    /// are discarded, only the error message survives. Edits are ignored
    /// until the next [`Session::begin`] or [`Session::reset`].
    pub fn fail(&mut self, error: &Error) {
        log::warn!("session failed: {error}");
        *self = Self::new();
        self.last_error = Some(error.to_string());
        self.phase = Phase::Failed;
    }

    /// Upload `source` through `remover` and wait for the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if a request is already pending, otherwise any
    /// error from the remover or from decoding its output. On remover or
    /// decode failure the session is left in [`Phase::Failed`].
    pub fn process<R: BackgroundRemover + ?Sized>(
        &mut self,
        remover: &R,
        source: SourceImage,
    ) -> Result<()> {
        self.begin(source)?;
        let source = self.source.as_ref().ok_or(Error::NotUploading)?;

        match remover.remove_background(source) {
            Ok(body) => self.complete(&body),
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Set brightness, clamped into the slider range.
    pub fn set_brightness(&mut self, percent: u16) {
        if self.accepts_edits() {
            self.adjustments = self.adjustments.with_brightness(percent);
        }
    }

    /// Set contrast, clamped into the slider range.
    pub fn set_contrast(&mut self, percent: u16) {
        if self.accepts_edits() {
            self.adjustments = self.adjustments.with_contrast(percent);
        }
    }

    /// Replace both adjustments at once.
    pub fn set_adjustments(&mut self, adjustments: AdjustmentState) {
        if self.accepts_edits() {
            self.adjustments = adjustments;
        }
    }

    /// Choose the backdrop.
    pub fn select_background(&mut self, background: BackgroundChoice) {
        if self.accepts_edits() {
            self.background = background;
        }
    }

    /// Choose the backdrop by palette swatch id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBackground`] for an unknown swatch; the current
    /// backdrop is kept.
    pub fn select_swatch(&mut self, id: &str) -> Result<()> {
        let background = BackgroundChoice::from_swatch(id)?;
        self.select_background(background);
        Ok(())
    }

    /// Crop exports to the subject's bounding box.
    ///
    /// Off by default; when on, exports are no longer at natural size.
    pub fn set_auto_crop(&mut self, enabled: bool) {
        if self.accepts_edits() {
            self.auto_crop = enabled;
        }
    }

    /// CSS filter matching the current adjustments.
    #[must_use]
    pub fn css_filter(&self) -> String {
        self.adjustments.css_filter()
    }

    /// Render the live preview, optionally scaled into `display_bounds`.
    ///
    /// While uploading, the preview shows the source file itself so there is
    /// something on screen until the result arrives.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoResult`] when there is neither a result nor a pending
    /// upload, or [`Error::Image`] if a pending source cannot be decoded.
    pub fn preview(&self, display_bounds: Option<(u32, u32)>) -> Result<RgbaImage> {
        if let (Phase::Uploading, Some(source)) = (self.phase, &self.source) {
            let pending = source.decode()?;
            return preview::render(&pending, self.adjustments, display_bounds);
        }
        let processed = self.ready_image()?;
        preview::render(processed, self.adjustments, display_bounds)
    }

    /// Flatten the result with the current backdrop and adjustments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoResult`] before a result is available, or
    /// [`Error::ImageNotLoaded`] for a zero-sized result.
    pub fn export(&self) -> Result<RgbaImage> {
        let processed = self.ready_image()?;
        let flattened = compositor::composite(processed, self.background, self.adjustments)?;
        if self.auto_crop {
            Ok(compositor::crop_to_subject(flattened, processed))
        } else {
            Ok(flattened)
        }
    }

    /// [`Session::export`] encoded as PNG.
    ///
    /// # Errors
    ///
    /// See [`Session::export`]; also fails if encoding fails.
    pub fn export_png(&self) -> Result<Vec<u8>> {
        compositor::encode_png(&self.export()?)
    }

    /// Write the export into `dir` under the fixed export file name.
    ///
    /// # Errors
    ///
    /// See [`Session::export`]; also fails if writing fails.
    pub fn save_export(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(EXPORT_FILE_NAME);
        compositor::save_png(&self.export()?, &path)?;
        log::info!("exported {}", path.display());
        Ok(path)
    }

    /// Discard everything and return to [`Phase::Idle`].
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn accepts_edits(&self) -> bool {
        if self.phase == Phase::Failed {
            log::debug!("ignoring edit on failed session");
            return false;
        }
        true
    }

    fn ready_image(&self) -> Result<&ProcessedImage> {
        match (&self.phase, &self.processed) {
            (Phase::Ready, Some(p)) => Ok(p),
            _ => Err(Error::NoResult),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};

    struct Failing;

    impl BackgroundRemover for Failing {
        fn remove_background(&self, _source: &SourceImage) -> Result<Vec<u8>> {
            Err(Error::Service {
                status: 500,
                message: "model not loaded".to_string(),
            })
        }
    }

    fn png_source(name: &str, w: u32, h: u32) -> SourceImage {
        let img = RgbaImage::from_pixel(w, h, Rgba([40, 80, 120, 255]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        SourceImage::new(name, buf.into_inner())
    }

    #[test]
    fn new_session_is_idle_with_defaults() {
        let session = Session::new();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.adjustments().is_identity());
        assert_eq!(session.background(), BackgroundChoice::Transparent);
        assert!(matches!(session.export(), Err(Error::NoResult)));
    }

    #[test]
    fn second_upload_while_in_flight_is_rejected() {
        let mut session = Session::new();
        session.begin(png_source("a.png", 2, 2)).unwrap();
        assert!(matches!(
            session.begin(png_source("b.png", 2, 2)),
            Err(Error::Busy)
        ));
        assert_eq!(session.source().unwrap().file_name(), "a.png");
        assert_eq!(session.badge().text, "Neural Network Active...");
    }

    #[test]
    fn complete_without_upload_is_rejected() {
        let mut session = Session::new();
        assert!(matches!(session.complete(&[]), Err(Error::NotUploading)));
    }

    #[test]
    fn new_file_resets_edits() {
        let mut session = Session::new();
        session.process(&crate::client::Passthrough, png_source("a.png", 3, 3)).unwrap();
        session.set_brightness(150);
        session.set_contrast(40);
        session.select_swatch("red").unwrap();

        session.begin(png_source("b.png", 3, 3)).unwrap();
        assert!(session.adjustments().is_identity());
        assert_eq!(session.background(), BackgroundChoice::Transparent);
        assert!(session.processed().is_none());
    }

    #[test]
    fn remover_failure_marks_session_failed() {
        let mut session = Session::new();
        session.set_brightness(160);
        let err = session.process(&Failing, png_source("a.png", 2, 2)).unwrap_err();
        assert!(err.is_service_failure());
        assert_eq!(session.phase(), Phase::Failed);
        assert!(session.last_error().unwrap().contains("model not loaded"));
        assert!(session.source().is_none());
        assert!(session.processed().is_none());
        assert!(session.adjustments().is_identity());

        session.set_contrast(30);
        session.select_background(BackgroundChoice::Color([1, 2, 3]));
        session.set_auto_crop(true);
        assert!(session.adjustments().is_identity());
        assert_eq!(session.background(), BackgroundChoice::Transparent);
        assert!(!session.auto_crop());

        session.reset();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.last_error().is_none());
        assert!(session.source().is_none());
    }

    #[test]
    fn pending_upload_previews_the_source() {
        let mut session = Session::new();
        assert!(matches!(session.preview(None), Err(Error::NoResult)));

        session.begin(png_source("a.png", 40, 20)).unwrap();
        let shown = session.preview(Some((10, 10))).unwrap();
        assert_eq!(shown.dimensions(), (10, 5));
        assert!(matches!(session.export(), Err(Error::NoResult)));
    }

    #[test]
    fn auto_crop_trims_export_to_subject() {
        let mut img = RgbaImage::new(12, 9);
        for x in 4..8 {
            for y in 2..5 {
                img.put_pixel(x, y, Rgba([200, 100, 0, 255]));
            }
        }
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();

        let mut session = Session::new();
        session
            .process(&crate::client::Passthrough, SourceImage::new("s.png", buf.into_inner()))
            .unwrap();
        session.select_swatch("studio-gray").unwrap();
        assert_eq!(session.export().unwrap().dimensions(), (12, 9));

        session.set_auto_crop(true);
        let cropped = session.export().unwrap();
        assert_eq!(cropped.dimensions(), (4, 3));
        assert_eq!(*cropped.get_pixel(0, 0), Rgba([200, 100, 0, 255]));
    }

    #[test]
    fn undecodable_response_fails_session() {
        let mut session = Session::new();
        session.begin(png_source("a.png", 2, 2)).unwrap();
        assert!(matches!(session.complete(b"oops"), Err(Error::Decode(_))));
        assert_eq!(session.phase(), Phase::Failed);
    }

    #[test]
    fn unknown_swatch_keeps_current_background() {
        let mut session = Session::new();
        session.select_swatch("blue").unwrap();
        assert!(session.select_swatch("plaid").is_err());
        assert_eq!(session.background(), BackgroundChoice::Color([59, 130, 246]));
    }

    #[test]
    fn sliders_clamp_to_range() {
        let mut session = Session::new();
        session.set_brightness(900);
        assert_eq!(session.adjustments().brightness(), 200);
        assert_eq!(session.css_filter(), "brightness(200%) contrast(100%)");
    }

    #[test]
    fn export_uses_natural_size_not_preview_size() {
        let mut session = Session::new();
        session.process(&crate::client::Passthrough, png_source("a.png", 640, 480)).unwrap();
        assert_eq!(session.preview(Some((64, 64))).unwrap().dimensions(), (64, 48));
        assert_eq!(session.export().unwrap().dimensions(), (640, 480));
    }

    #[test]
    fn save_export_uses_fixed_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new();
        session.process(&crate::client::Passthrough, png_source("a.png", 4, 4)).unwrap();
        let path = session.save_export(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), EXPORT_FILE_NAME);
        assert!(path.exists());
    }
}
