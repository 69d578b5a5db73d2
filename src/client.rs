//! Talking to the background-removal service.
//!
//! The service is an opaque collaborator: the file is posted unmodified as
//! the multipart field `file`, and a 2xx response body is taken to be the
//! cut-out image. Anything else fails the request. There is no retry.

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::media::SourceImage;

/// Name of the multipart field carrying the upload.
pub const UPLOAD_FIELD: &str = "file";

/// Anything that can turn an uploaded image into a cut-out.
pub trait BackgroundRemover {
    /// Return the encoded background-removed image for `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the image could not be processed.
    fn remove_background(&self, source: &SourceImage) -> Result<Vec<u8>>;
}

/// HTTP client for a `POST /remove-bg/` service.
pub struct RemoveBgClient {
    config: ServiceConfig,
    endpoint: reqwest::Url,
    http_client: Client,
}

impl RemoveBgClient {
    /// Build a client for the configured service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for an unusable service URL, or
    /// [`Error::Network`] if the HTTP client cannot be created.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let endpoint = config.endpoint_url()?;
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            endpoint,
            http_client,
        })
    }

    /// The resolved endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }
}

impl BackgroundRemover for RemoveBgClient {
    fn remove_background(&self, source: &SourceImage) -> Result<Vec<u8>> {
        source.validate(self.config.max_upload_bytes)?;

        log::info!(
            "uploading {} ({} bytes) to {}",
            source.file_name(),
            source.bytes().len(),
            self.endpoint
        );

        let part = Part::bytes(source.bytes().to_vec())
            .file_name(source.file_name().to_string())
            .mime_str(source.mime_type())?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("unknown status");
            let body = response.text().unwrap_or_default();
            let message = if body.trim().is_empty() {
                reason.to_string()
            } else {
                body.trim().to_string()
            };
            log::warn!("service rejected {}: HTTP {}", source.file_name(), status.as_u16());
            return Err(Error::Service {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes()?.to_vec();
        log::info!(
            "received {} bytes for {}",
            bytes.len(),
            source.file_name()
        );
        Ok(bytes)
    }
}

/// A remover for inputs that already have their background removed.
///
/// Returns the uploaded bytes unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl BackgroundRemover for Passthrough {
    fn remove_background(&self, source: &SourceImage) -> Result<Vec<u8>> {
        log::debug!("passing {} through unchanged", source.file_name());
        Ok(source.bytes().to_vec())
    }
}

impl<R: BackgroundRemover + ?Sized> BackgroundRemover for &R {
    fn remove_background(&self, source: &SourceImage) -> Result<Vec<u8>> {
        (**self).remove_background(source)
    }
}
