//! Runtime configuration for the remote service and for export.

use std::time::Duration;

use crate::adjust::AdjustmentState;
use crate::background::BackgroundChoice;
use crate::error::{Error, Result};

/// Default address of a locally running background-removal service.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Path of the background-removal endpoint.
pub const DEFAULT_ENDPOINT: &str = "/remove-bg/";

/// Default upload limit: 20 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// Where and how to reach the background-removal service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Scheme, host and port of the service.
    pub base_url: String,
    /// Endpoint path, joined onto `base_url`.
    pub endpoint: String,
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Largest file accepted for upload.
    pub max_upload_bytes: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServiceConfig {
    /// Config pointing at a different service, other fields default.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Full URL of the background-removal endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `base_url` cannot be parsed or the
    /// endpoint cannot be joined onto it.
    pub fn endpoint_url(&self) -> Result<reqwest::Url> {
        let mut base = self.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base = reqwest::Url::parse(&base)
            .map_err(|e| Error::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        base.join(self.endpoint.trim_start_matches('/'))
            .map_err(|e| Error::InvalidUrl(format!("{}: {e}", self.endpoint)))
    }
}

/// Options controlling how each processed image is exported.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Backdrop to flatten against.
    pub background: BackgroundChoice,
    /// Brightness/contrast applied to the cut-out.
    pub adjustments: AdjustmentState,
    /// Crop each export to the subject's bounding box.
    pub crop: bool,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint_is_local_service() {
        let url = ServiceConfig::default().endpoint_url().unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/remove-bg/");
    }

    #[test]
    fn endpoint_joins_onto_base_path() {
        let cfg = ServiceConfig::with_base_url("https://example.ngrok.app/api/");
        assert_eq!(
            cfg.endpoint_url().unwrap().as_str(),
            "https://example.ngrok.app/api/remove-bg/"
        );
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let cfg = ServiceConfig::with_base_url("not a url");
        assert!(matches!(cfg.endpoint_url(), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn default_has_no_timeout() {
        assert_eq!(ServiceConfig::default().timeout, None);
    }
}
