//! Error types for the bg-cutout crate.

/// Errors that can occur while uploading, compositing, or exporting an image.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred during image processing (load, save, encode).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// The service responded successfully but the body is not a decodable image.
    #[error("failed to decode processed image: {0}")]
    Decode(#[source] image::ImageError),

    /// The input file format is not accepted for upload.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The input file exceeds the configured upload limit.
    #[error("file is {size} bytes, upload limit is {limit} bytes")]
    UploadTooLarge {
        /// File size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// The configured service URL cannot be parsed.
    #[error("invalid service URL: {0}")]
    InvalidUrl(String),

    /// The request could not be sent or the response could not be read.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}: {message}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// A background value is neither a swatch, a hex color, nor "transparent".
    #[error("invalid background: {0}")]
    InvalidBackground(String),

    /// An adjustment percentage lies outside its slider range.
    #[error("{name} {value}% is outside {min}..={max}")]
    AdjustmentOutOfRange {
        /// Adjustment name ("brightness" or "contrast").
        name: &'static str,
        /// Requested percentage.
        value: u16,
        /// Lowest accepted percentage.
        min: u16,
        /// Highest accepted percentage.
        max: u16,
    },

    /// The image has zero natural width or height.
    #[error("image not loaded ({width}x{height})")]
    ImageNotLoaded {
        /// Natural width in pixels.
        width: u32,
        /// Natural height in pixels.
        height: u32,
    },

    /// A request is already in flight for this session.
    #[error("a background-removal request is already in progress")]
    Busy,

    /// No processed image is available yet.
    #[error("no processed image to export")]
    NoResult,

    /// A response arrived while the session was not waiting for one.
    #[error("session is not waiting for an upload result")]
    NotUploading,
}

impl Error {
    /// Whether this error is a network or service failure.
    ///
    /// These are the failures that end a session: the caller reports them and
    /// resets all session state.
    #[must_use]
    pub fn is_service_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Service { .. } | Self::Decode(_)
        )
    }

    /// A short user-facing hint naming the likely cause, if one applies.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        if self.is_service_failure() {
            Some("is the background-removal service (or its tunnel) running?")
        } else {
            None
        }
    }
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let unsupported = Error::UnsupportedFormat("tiff".to_string());
        assert!(unsupported.to_string().contains("tiff"));

        let not_loaded = Error::ImageNotLoaded {
            width: 0,
            height: 20,
        };
        assert!(not_loaded.to_string().contains("0x20"));

        let range = Error::AdjustmentOutOfRange {
            name: "contrast",
            value: 250,
            min: 0,
            max: 200,
        };
        let msg = range.to_string();
        assert!(msg.contains("contrast 250%"));
        assert!(msg.contains("0..=200"));
    }

    #[test]
    fn service_failures_carry_a_hint() {
        let err = Error::Service {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert!(err.is_service_failure());
        assert!(err.hint().is_some());
        assert!(err.to_string().contains("502"));

        assert!(!Error::Busy.is_service_failure());

        let garbage = image::load_from_memory(b"not an image").unwrap_err();
        let decode = Error::Decode(garbage);
        assert!(std::error::Error::source(&decode).is_some());
        assert!(Error::NoResult.hint().is_none());
    }
}
